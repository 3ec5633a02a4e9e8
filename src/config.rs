use std::fs;
use std::path::{Path, PathBuf};

use egui::Color32;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layer::CanvasSize;
use crate::palette::{DEFAULT_SWATCHES, parse_hex};
use crate::session::{ImageSource, SessionOptions};
use crate::suggestions::DEFAULT_ENDPOINT;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "CREATIVE_EDITOR_CONFIG";

pub const DEFAULT_TAGLINE: &str = "Your Tagline Here";
pub const DEFAULT_OFFER: &str = "Special Offer";

/// Everything the caller supplies when opening a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub tagline: String,
    pub offer: String,
    pub image_path: Option<PathBuf>,
    /// Hex strings; entries that fail to parse are skipped.
    pub palette: Vec<String>,
    pub export_dir: PathBuf,
    pub suggestion_endpoint: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let canvas = CanvasSize::default();
        Self {
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            tagline: DEFAULT_TAGLINE.to_owned(),
            offer: DEFAULT_OFFER.to_owned(),
            image_path: None,
            palette: DEFAULT_SWATCHES.iter().map(|s| s.to_string()).collect(),
            export_dir: PathBuf::from("exports"),
            suggestion_endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Looks at the first command-line argument, then [`CONFIG_ENV`].
    /// Returns `None` when neither names a file; a broken file is logged and
    /// also yields `None`.
    pub fn from_args_or_env() -> Option<Self> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .map(PathBuf::from)?;
        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(err) => {
                warn!("Ignoring config: {err}");
                None
            }
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }

    pub fn swatches(&self) -> Vec<Color32> {
        self.palette
            .iter()
            .filter_map(|hex| {
                let parsed = parse_hex(hex);
                if parsed.is_none() {
                    warn!("Skipping invalid swatch {hex:?}");
                }
                parsed
            })
            .collect()
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            canvas: self.canvas(),
            tagline: self.tagline.clone(),
            offer: self.offer.clone(),
            image: self.image_path.clone().map(ImageSource::Path),
            swatches: self.swatches(),
            export_dir: self.export_dir.clone(),
            suggestion_endpoint: self.suggestion_endpoint.clone(),
        }
    }
}
