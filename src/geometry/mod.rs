pub mod hit_testing;

pub use hit_testing::{HandleMetrics, handle_at, handle_positions};
