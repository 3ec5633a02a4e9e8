use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

// Single counter shared by every session in the process
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

pub fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::SeqCst)
}

/// Identifies the session state an asynchronous request was issued for.
///
/// A completion is only applied if its tag still equals the session's
/// current tag for that kind of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AsyncTag {
    pub session: Uuid,
    pub generation: u64,
}

impl AsyncTag {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            generation: next_generation(),
        }
    }
}
