use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopoError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Invalid selection: {0}")]
    CropOutOfBounds(String),

    #[error("Point ({x:.4}, {y:.4}) lies outside the image")]
    OutsideImage { x: f64, y: f64 },

    #[error("Resize failed: {0}")]
    ResizeFailure(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),
}

impl TopoError {
    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResizeFailure(_) | Self::Io(_) | Self::Image(_))
    }

    /// Superseded work. Callers clean up without reporting anything.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, TopoError>;
