//! Image format and dimension probing.

use crate::error::{MediaError, Result};
use image::{ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Detect the format from magic bytes and read the dimensions from the header.
///
/// Runs on the blocking pool; the pixel data is never decoded.
pub async fn inspect(path: &Path) -> Result<ImageInfo> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || inspect_blocking(&path))
        .await
        .map_err(|e| MediaError::Task(e.to_string()))?
}

/// Like [`inspect`], but only JPEG is accepted.
pub async fn inspect_jpeg(path: &Path) -> Result<ImageInfo> {
    let info = inspect(path).await?;
    if info.format != ImageFormat::Jpeg {
        return Err(MediaError::UnsupportedFormat(format!(
            "{} is {:?}, expected JPEG",
            path.display(),
            info.format
        )));
    }
    Ok(info)
}

fn inspect_blocking(path: &Path) -> Result<ImageInfo> {
    let reader = ImageReader::open(path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::NotFound(path.display().to_string())
            } else {
                MediaError::Io(e)
            }
        })?
        .with_guessed_format()?;

    let format = reader.format().ok_or_else(|| {
        MediaError::UnsupportedFormat(format!("{} is not a recognized image", path.display()))
    })?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| MediaError::ImageError(e.to_string()))?;

    debug!(?format, width, height, "Inspected image");
    Ok(ImageInfo {
        format,
        width,
        height,
    })
}
