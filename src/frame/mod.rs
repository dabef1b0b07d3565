// Frame preparation — colour conversion, aspect cropping, and model-input scaling.

pub mod convert;
pub mod crop;
pub mod error;
pub mod scale;
pub mod types;

pub use types::{Plane, Raster, RawFrame};
