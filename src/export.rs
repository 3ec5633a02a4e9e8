use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, RgbaImage};
use log::info;

use crate::error::ExportError;

/// Exports are rendered at twice the logical canvas size.
pub const EXPORT_SCALE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Save a PNG file into the export directory.
    Download,
    /// Hand a `data:` URL back to the caller.
    Embed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportArtifact {
    Saved(PathBuf),
    Embedded(String),
}

pub fn export_filename(timestamp_millis: u64) -> String {
    format!("creative_{timestamp_millis}.png")
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}

/// Encodes an already rendered composite and delivers it per [`ExportMode`].
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn deliver(
        &self,
        mode: ExportMode,
        rendered: &RgbaImage,
        timestamp_millis: u64,
    ) -> Result<ExportArtifact, ExportError> {
        let png = encode_png(rendered)?;
        match mode {
            ExportMode::Download => {
                let path = self.output_dir.join(export_filename(timestamp_millis));
                fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Write {
                    path: self.output_dir.clone(),
                    source,
                })?;
                fs::write(&path, &png).map_err(|source| ExportError::Write {
                    path: path.clone(),
                    source,
                })?;
                info!("Exported {} ({} bytes)", path.display(), png.len());
                Ok(ExportArtifact::Saved(path))
            }
            ExportMode::Embed => {
                let url = to_data_url(&png);
                info!("Exported data URL ({} chars)", url.len());
                Ok(ExportArtifact::Embedded(url))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_filename_contains_timestamp() {
        assert_eq!(export_filename(1_700_000_000_123), "creative_1700000000123.png");
    }

    #[test]
    fn test_encode_png_decodes_back() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255]));
        let png = encode_png(&img).expect("encode");
        let decoded = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_data_url_prefix() {
        let url = to_data_url(&[1, 2, 3]);
        assert_eq!(url, "data:image/png;base64,AQID");
    }

    #[test]
    fn test_download_writes_file() {
        let dir = std::env::temp_dir().join(format!("creative_export_{}", uuid::Uuid::new_v4()));
        let exporter = Exporter::new(&dir);
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let artifact = exporter.deliver(ExportMode::Download, &img, 42).expect("export");
        let expected = dir.join("creative_42.png");
        assert_eq!(artifact, ExportArtifact::Saved(expected.clone()));
        assert!(expected.exists());
        let _ = fs::remove_dir_all(dir);
    }
}
