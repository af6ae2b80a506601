use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use crate::consts::SCRATCH_PREFIX;
use crate::crop::CropRect;
use crate::error::{Result, TopoError};

/// Opaque handle to an encoded image.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageUri(PathBuf);

impl ImageUri {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Read the encoded bytes, e.g. for upload.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.0)?)
    }
}

impl fmt::Display for ImageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Decode/resize/encode collaborator. Every operation that produces an image
/// writes a new one and leaves its input untouched.
pub trait ImageProcessor: Send + Sync {
    fn measure(&self, uri: &ImageUri) -> Result<(u32, u32)>;
    fn file_size(&self, uri: &ImageUri) -> Result<u64>;
    fn resize(&self, uri: &ImageUri, width: u32, height: u32) -> Result<ImageUri>;
    fn crop(&self, uri: &ImageUri, rect: &CropRect) -> Result<ImageUri>;
    /// Delete an image this processor produced. Missing files are not an error.
    fn remove(&self, uri: &ImageUri) -> Result<()>;
}

/// [`ImageProcessor`] backed by the `image` crate, writing results into a
/// scratch directory.
pub struct FsImageProcessor {
    scratch_dir: PathBuf,
    filter: FilterType,
    counter: AtomicU64,
}

impl FsImageProcessor {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Result<Self> {
        let scratch_dir = scratch_dir.into();
        std::fs::create_dir_all(&scratch_dir)?;
        Ok(Self {
            scratch_dir,
            filter: FilterType::Triangle,
            counter: AtomicU64::new(0),
        })
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Fresh output path, keeping the input's format when it is one we can write.
    fn next_path(&self, input: &ImageUri, tag: &str) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let ext = match ImageFormat::from_path(input.path()) {
            Ok(ImageFormat::Jpeg) => "jpg",
            Ok(ImageFormat::Tiff) => "tiff",
            Ok(ImageFormat::WebP) => "webp",
            _ => "png",
        };
        self.scratch_dir.join(format!(
            "{SCRATCH_PREFIX}{}-{n}-{tag}.{ext}",
            std::process::id()
        ))
    }
}

impl ImageProcessor for FsImageProcessor {
    fn measure(&self, uri: &ImageUri) -> Result<(u32, u32)> {
        Ok(image::image_dimensions(uri.path())?)
    }

    fn file_size(&self, uri: &ImageUri) -> Result<u64> {
        Ok(std::fs::metadata(uri.path())?.len())
    }

    fn resize(&self, uri: &ImageUri, width: u32, height: u32) -> Result<ImageUri> {
        if width == 0 || height == 0 {
            return Err(TopoError::ResizeFailure(format!(
                "cannot resize to {width}x{height}"
            )));
        }
        let img = image::open(uri.path())?;
        let resized = img.resize_exact(width, height, self.filter);
        let out = self.next_path(uri, "resized");
        save(&resized, &out)?;
        debug!(from = %uri, to = %out.display(), width, height, "Wrote resized image");
        Ok(ImageUri::new(out))
    }

    fn crop(&self, uri: &ImageUri, rect: &CropRect) -> Result<ImageUri> {
        let img = image::open(uri.path())?;
        let rect = rect.validated(img.width(), img.height())?;
        let cropped = img.crop_imm(rect.origin_x, rect.origin_y, rect.width, rect.height);
        let out = self.next_path(uri, "crop");
        save(&cropped, &out)?;
        debug!(from = %uri, to = %out.display(), %rect, "Wrote cropped image");
        Ok(ImageUri::new(out))
    }

    fn remove(&self, uri: &ImageUri) -> Result<()> {
        match std::fs::remove_file(uri.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Encode `img` to `path`. A failed write leaves nothing behind.
fn save(img: &DynamicImage, path: &Path) -> Result<()> {
    // JPEG has no alpha channel.
    let is_jpeg = ImageFormat::from_path(path).ok() == Some(ImageFormat::Jpeg);
    let written = if is_jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8()).save(path)
    } else {
        img.save(path)
    };
    if let Err(e) = written {
        if let Err(rm) = std::fs::remove_file(path) {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %rm, "Failed to remove partial image");
            }
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_failed_save_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("topo-partial.jpg");
        std::fs::write(&out, b"half an image").unwrap();

        // Wider than a JPEG can encode.
        let img = DynamicImage::ImageLuma8(GrayImage::new(70_000, 1));
        assert!(save(&img, &out).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_save_drops_alpha_for_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("topo-alpha.jpg");
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(8, 8));
        save(&img, &out).unwrap();
        assert_eq!(image::image_dimensions(&out).unwrap(), (8, 8));
    }
}
