use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use base64::{Engine as _, engine::general_purpose};
use creative_editor::export::EXPORT_SCALE;
use creative_editor::{
    CanvasSize, Command, EditorSession, ExportArtifact, ExportError, ExportMode, SessionOptions,
    TextId,
};
use egui::{Color32, vec2};

fn session_in(dir: &std::path::Path) -> EditorSession {
    EditorSession::open(SessionOptions {
        canvas: CanvasSize::new(320.0, 240.0),
        tagline: "Sale".into(),
        offer: "20% Off".into(),
        export_dir: dir.to_path_buf(),
        ..Default::default()
    })
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("{name}_{}", uuid::Uuid::new_v4()))
}

/// Starts an export and polls the session until the worker reports back.
fn export_and_wait(
    session: &mut EditorSession,
    mode: ExportMode,
) -> Result<ExportArtifact, ExportError> {
    session.export(mode)?;
    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        session.poll();
        if let Some(outcome) = session.take_export_outcome() {
            return outcome;
        }
        assert!(Instant::now() < deadline, "export never finished");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_download_matches_render_at_double_scale() {
    let dir = temp_dir("creative_download");
    let mut session = session_in(&dir);
    session.apply(Command::SetBackground(Color32::from_rgb(0xff, 0x99, 0x00)));

    let artifact = export_and_wait(&mut session, ExportMode::Download).unwrap();
    let ExportArtifact::Saved(path) = artifact else {
        panic!("download should save a file");
    };
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("creative_") && name.ends_with(".png"), "{name}");

    let saved = image::open(&path).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (640, 480));
    assert_eq!(saved, session.render(EXPORT_SCALE));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_embed_and_download_render_the_same_pixels() {
    let dir = temp_dir("creative_embed");
    let mut session = session_in(&dir);
    session.apply(Command::SetText {
        target: TextId::Tagline,
        content: "A much longer tagline that has to wrap inside its box".into(),
    });

    let ExportArtifact::Embedded(url) = export_and_wait(&mut session, ExportMode::Embed).unwrap() else {
        panic!("embed should return a data url");
    };
    let payload = url.strip_prefix("data:image/png;base64,").unwrap();
    let png = general_purpose::STANDARD.decode(payload).unwrap();
    let embedded = image::load_from_memory(&png).unwrap().to_rgba8();

    let ExportArtifact::Saved(path) = export_and_wait(&mut session, ExportMode::Download).unwrap()
    else {
        panic!("download should save a file");
    };
    let saved = image::open(&path).unwrap().to_rgba8();
    assert_eq!(embedded, saved);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_preview_and_render_share_one_path() {
    let dir = temp_dir("creative_preview");
    let session = session_in(&dir);
    assert_eq!(session.render_preview(), session.render(1.0));
}

#[test]
fn test_export_ignores_gesture_in_progress() {
    let dir = temp_dir("creative_gesture");
    let mut session = session_in(&dir);
    let committed = session.render(EXPORT_SCALE);

    // Inside the offer badge.
    let grab = egui::pos2(100.0, 120.0);
    session.pointer_down(grab);
    session.pointer_move(grab + vec2(0.0, 40.0));
    assert_ne!(session.render_preview(), session.render(1.0));

    let ExportArtifact::Embedded(url) = export_and_wait(&mut session, ExportMode::Embed).unwrap()
    else {
        panic!("embed should return a data url");
    };
    let png = general_purpose::STANDARD
        .decode(url.trim_start_matches("data:image/png;base64,"))
        .unwrap();
    assert_eq!(image::load_from_memory(&png).unwrap().to_rgba8(), committed);
}

#[test]
fn test_download_into_regular_file_reports_write_error() {
    let blocker = temp_dir("creative_blocker");
    fs::write(&blocker, b"not a directory").unwrap();
    let mut session = session_in(&blocker);
    let before = session.model().clone();

    let outcome = export_and_wait(&mut session, ExportMode::Download);
    assert!(matches!(outcome, Err(ExportError::Write { .. })), "{outcome:?}");
    assert!(session.model().same_content(&before));
    assert!(!session.has_pending_work());

    // The session stays usable after a failed save.
    assert!(export_and_wait(&mut session, ExportMode::Embed).is_ok());

    let _ = fs::remove_file(blocker);
}
