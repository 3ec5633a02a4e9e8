#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod components;
pub mod config;
pub mod element;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod geometry;
pub mod gizmo;
pub mod id_generator;
pub mod input;
pub mod layer;
pub mod palette;
pub mod panels;
pub mod renderer;
pub mod selection;
pub mod session;
pub mod suggestions;
pub mod texture_manager;
pub mod util;
pub mod widgets;

pub use app::CreativeEditorApp;
pub use command::Command;
pub use config::EditorConfig;
pub use error::{ConfigError, ExportError, ImageLoadError, SuggestionError};
pub use export::{ExportArtifact, ExportMode};
pub use gizmo::{GizmoHandle, TransformGizmo};
pub use input::{InputEvent, InputLocation};
pub use layer::{CanvasSize, ImageGeometry, LayerId, LayerModel, TextId};
pub use renderer::CompositeRenderer;
pub use selection::SelectionController;
pub use session::{EditorSession, ImageSource, SessionOptions, SuggestionState};
