//! PNG Exporter Module
//! Encodes a rendered plot as PNG in memory and writes it atomically.
//!
//! The bytes go to a hidden `.tmp` sibling first and are renamed over the
//! target, so a failed run never leaves a truncated image behind.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::charts::RenderedImage;
use crate::error::ErrorKind;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] ImageError),
    #[error("output path {} has no file name", .0.display())]
    InvalidPath(PathBuf),
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Write
    }
}

/// Writes rendered images to disk as PNG.
pub struct PngExporter;

impl PngExporter {
    /// Encode `image` as an 8-bit RGB PNG.
    pub fn encode(image: &RenderedImage) -> Result<Vec<u8>, ExportError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes).write_image(
            image.pixels(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(bytes)
    }

    /// Write `image` to `path`, replacing any existing file. Returns the byte count.
    ///
    /// The containing directory must already exist.
    pub fn export(image: &RenderedImage, path: &Path) -> Result<u64, ExportError> {
        let bytes = Self::encode(image)?;
        Self::atomic_write(path, &bytes)?;
        log::info!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(bytes.len() as u64)
    }

    fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ExportError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ExportError::InvalidPath(path.to_path_buf()))?;
        let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

        let result = fs::write(&tmp, data).and_then(|()| fs::rename(&tmp, path));
        if let Err(source) = result {
            // The temporary may not exist if the first write failed.
            let _ = fs::remove_file(&tmp);
            return Err(ExportError::Write {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(())
    }
}
