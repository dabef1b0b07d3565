use fast_image_resize as fr;
use fr::images::{Image, ImageRef};

use super::error::{FrameError, Result};
use super::types::Raster;

/// Resizes rasters to the fixed model input size.
///
/// Wraps a `fast_image_resize` resizer so its internal buffers are reused
/// across frames of the same pipeline. Uses bilinear convolution, which
/// widens its support when downscaling and so behaves like an area filter.
pub struct Scaler {
    resizer: fr::Resizer,
    options: fr::ResizeOptions,
}

impl Scaler {
    pub fn new() -> Self {
        Self {
            resizer: fr::Resizer::new(),
            // Pixels are opaque ARGB; skip alpha premultiplication.
            options: fr::ResizeOptions::new()
                .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear))
                .use_alpha(false),
        }
    }

    /// Resize `src` into a new raster of exactly `width` x `height`.
    pub fn scale(&mut self, src: &Raster, width: u32, height: u32) -> Result<Raster> {
        let mut out = Raster::filled(width, height, 0);
        self.scale_into(src, &mut out)?;
        Ok(out)
    }

    /// Resize `src` to the current dimensions of `out`, overwriting it.
    pub fn scale_into(&mut self, src: &Raster, out: &mut Raster) -> Result<()> {
        let (width, height) = (out.width(), out.height());
        if width == 0 || height == 0 || src.width() == 0 || src.height() == 0 {
            return Err(FrameError::Resize(format!(
                "cannot resize {}x{} to {width}x{height}",
                src.width(),
                src.height()
            )));
        }
        if (src.width(), src.height()) == (width, height) {
            out.pixels_mut().copy_from_slice(src.pixels());
            return Ok(());
        }

        let src_image = ImageRef::new(
            src.width(),
            src.height(),
            src.as_bytes(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| FrameError::Resize(e.to_string()))?;
        let mut dst_image = Image::from_slice_u8(
            width,
            height,
            bytemuck::cast_slice_mut(out.pixels_mut()),
            fr::PixelType::U8x4,
        )
        .map_err(|e| FrameError::Resize(e.to_string()))?;

        self.resizer
            .resize(&src_image, &mut dst_image, &self.options)
            .map_err(|e| FrameError::Resize(e.to_string()))
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new()
    }
}
