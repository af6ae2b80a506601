pub mod config;
pub mod consts;
pub mod crop;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod io;
pub mod marker;
pub mod transform;
