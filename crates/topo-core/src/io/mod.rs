pub mod processor;

pub use processor::{FsImageProcessor, ImageProcessor, ImageUri};
