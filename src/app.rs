use crate::config::EditorConfig;
use crate::error::ExportError;
use crate::export::ExportArtifact;
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels::{central_panel, controls_panel};
use crate::session::EditorSession;
use crate::texture_manager::TextureManager;
use crate::util::time::current_time_secs;

/// How long a status line stays visible.
const STATUS_SECONDS: f64 = 6.0;

/// Status line text for an export result, and whether it is an error.
pub(crate) fn export_status(result: Result<ExportArtifact, ExportError>) -> (String, bool) {
    match result {
        Ok(ExportArtifact::Saved(path)) => (format!("Saved {}", path.display()), false),
        Ok(ExportArtifact::Embedded(url)) => (format!("Copied data URL ({} chars)", url.len()), false),
        Err(err) => {
            log::error!("Export failed: {err}");
            (format!("Export failed: {err}"), true)
        }
    }
}

struct StatusMessage {
    text: String,
    is_error: bool,
    shown_at: f64,
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct CreativeEditorApp {
    config: EditorConfig,
    pub(crate) image_path_input: String,

    #[serde(skip)]
    pub(crate) session: Option<EditorSession>,
    #[serde(skip)]
    pub(crate) textures: TextureManager,
    #[serde(skip)]
    pub(crate) input: InputHandler,
    #[serde(skip)]
    files: FileHandler,
    #[serde(skip)]
    status: Option<StatusMessage>,
    /// Set by the closed-session screen; handled at the start of the next frame.
    #[serde(skip)]
    pub(crate) reopen: bool,
    #[serde(skip)]
    egui_ctx: Option<egui::Context>,
}

impl Default for CreativeEditorApp {
    fn default() -> Self {
        Self {
            config: EditorConfig::default(),
            image_path_input: String::new(),
            session: None,
            textures: TextureManager::new(),
            input: InputHandler::new(),
            files: FileHandler::new(),
            status: None,
            reopen: false,
            egui_ctx: None,
        }
    }
}

impl CreativeEditorApp {
    /// Called once before the first frame.
    ///
    /// An explicit `config` wins over whatever was persisted last time.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Option<EditorConfig>) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        if let Some(config) = config {
            app.config = config;
        }
        app.egui_ctx = Some(cc.egui_ctx.clone());
        app.open_session();
        app
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    /// Replaces any current session with a fresh one built from the config.
    pub fn open_session(&mut self) {
        if let Some(old) = self.session.as_mut() {
            old.close();
        }
        if self.image_path_input.is_empty() {
            if let Some(path) = &self.config.image_path {
                self.image_path_input = path.display().to_string();
            }
        }
        let mut session = EditorSession::open(self.config.session_options());
        if let Some(ctx) = self.egui_ctx.clone() {
            // Embedding hosts read the export from the clipboard.
            session.set_export_callback(move |url| ctx.copy_text(url.to_owned()));
        }
        self.session = Some(session);
        self.textures.invalidate();
        self.files.clear_processed_files();
        self.reopen = false;
    }

    pub(crate) fn set_status(&mut self, text: String, is_error: bool) {
        self.status = Some(StatusMessage {
            text,
            is_error,
            shown_at: current_time_secs(),
        });
    }

    pub(crate) fn show_status(&self, ui: &mut egui::Ui) {
        let Some(status) = &self.status else {
            return;
        };
        if current_time_secs() - status.shown_at > STATUS_SECONDS {
            return;
        }
        if status.is_error {
            ui.colored_label(egui::Color32::LIGHT_RED, &status.text);
        } else {
            ui.label(&status.text);
        }
    }
}

impl eframe::App for CreativeEditorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.reopen {
            self.open_session();
        }

        let mut exported = None;
        if let Some(session) = self.session.as_mut() {
            session.poll();
            exported = session.take_export_outcome();
            for dropped in self.files.take_dropped_images(ctx) {
                session.upload_auxiliary(dropped.name, dropped.bytes);
            }
            if session.has_pending_work() {
                ctx.request_repaint_after(std::time::Duration::from_millis(50));
            }
        }
        if let Some(outcome) = exported {
            let (text, is_error) = export_status(outcome);
            self.set_status(text, is_error);
        }
        self.files.preview_files_being_dropped(ctx);

        controls_panel(self, ctx);
        central_panel(self, ctx);

        if let Some(status) = &self.status {
            if current_time_secs() - status.shown_at <= STATUS_SECONDS {
                ctx.request_repaint_after(std::time::Duration::from_secs(1));
            }
        }
    }
}
