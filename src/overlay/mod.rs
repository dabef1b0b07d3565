// Overlay — model-to-display mapping, display surfaces, and skeleton drawing.

pub mod canvas;
pub mod raster_surface;
pub mod skeleton;
pub mod transform;

pub use canvas::{Canvas, DisplaySurface, Paint, SurfaceError, SurfaceLock};
pub use raster_surface::{RasterSurface, TextLabel};
pub use skeleton::{RenderSummary, SkeletonRenderer};
pub use transform::{Rect, RenderTransform};
