use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use log::trace;
use thiserror::Error;

use crate::session::PreviewKey;

/// Errors that can occur while turning a preview render into a texture
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TextureGenerationError {
    #[error("Invalid texture dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// Holds the GPU copy of the preview render.
///
/// The texture is re-uploaded only when the [`PreviewKey`] changes, so idle
/// frames cost nothing beyond drawing the cached handle.
#[derive(Default)]
pub struct TextureManager {
    preview: Option<(PreviewKey, TextureHandle)>,
    uploads: u64,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the preview texture for `key`, calling `render` only on a miss.
    pub fn preview_texture<F>(
        &mut self,
        ctx: &Context,
        key: PreviewKey,
        render: F,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> RgbaImage,
    {
        if let Some((cached, handle)) = &self.preview {
            if *cached == key {
                return Ok(handle.id());
            }
        }

        let image = to_color_image(&render())?;
        self.uploads += 1;
        trace!("Uploading preview texture for {key:?}");
        match &mut self.preview {
            Some((cached, handle)) => {
                handle.set(image, TextureOptions::LINEAR);
                *cached = key;
                Ok(handle.id())
            }
            None => {
                let handle = ctx.load_texture("creative_preview", image, TextureOptions::LINEAR);
                let id = handle.id();
                self.preview = Some((key, handle));
                Ok(id)
            }
        }
    }

    /// Forgets the cached texture, e.g. when the session is replaced.
    pub fn invalidate(&mut self) {
        self.preview = None;
    }

    /// Number of uploads so far
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

pub fn to_color_image(image: &RgbaImage) -> Result<ColorImage, TextureGenerationError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(TextureGenerationError::InvalidDimensions(w, h));
    }
    Ok(ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        image.as_raw(),
    ))
}
