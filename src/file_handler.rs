use std::collections::HashSet;

use eframe::egui;

/// An image file dropped onto the window, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Collects image files dropped onto the window. They are forwarded to the
/// layout suggestion service as auxiliary uploads.
#[derive(Debug, Default)]
pub struct FileHandler {
    processed_files: HashSet<String>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes newly dropped image files from the UI context.
    pub fn take_dropped_images(&mut self, ctx: &egui::Context) -> Vec<DroppedImage> {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let mut images = Vec::new();

        for file in &dropped {
            let file_name = display_name(file);

            // Skip if we've already processed this file
            if self.processed_files.contains(&file_name) {
                continue;
            }
            if !is_image_file(file) {
                log::warn!("Dropped file is not a supported type: {}", file_name);
                continue;
            }
            if let Some(bytes) = read_bytes(file) {
                log::info!("Accepted dropped image {} ({} bytes)", file_name, bytes.len());
                images.push(DroppedImage {
                    name: file_name.clone(),
                    bytes,
                });
                self.processed_files.insert(file_name);
            }
        }
        images
    }

    /// Dims the window while files are dragged over it.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order};

        let hovered = ctx.input(|i| {
            i.raw
                .hovered_files
                .iter()
                .map(|f| {
                    f.path
                        .as_ref()
                        .map_or_else(|| "(path not available)".to_owned(), |p| p.display().to_string())
                })
                .collect::<Vec<_>>()
        });
        if hovered.is_empty() {
            return;
        }

        let text = format!("Drop to request layout suggestions:\n\n{}", hovered.join("\n"));
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            egui::TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }

    /// Forget which files were already handled so they can be dropped again.
    pub fn clear_processed_files(&mut self) {
        self.processed_files.clear();
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_ref()
        .and_then(|p| p.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| file.name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()));
    matches!(
        name.as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    )
}

fn read_bytes(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }
    let path = file.path.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            log::error!("Failed to read dropped file {}: {}", path.display(), err);
            None
        }
    }
}
