use super::error::{FrameError, Result};

/// One plane of a YUV 4:2:0 sensor frame.
///
/// `row_stride` is the byte distance between the starts of two consecutive
/// rows and may exceed the logical row width because of alignment padding.
/// `pixel_stride` is the byte distance between two samples within a row
/// (1 for planar chroma, 2 for interleaved/semi-planar chroma).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    pub data: Vec<u8>,
    pub row_stride: usize,
    pub pixel_stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Check that `cols` x `rows` samples can be read without leaving the
    /// declared `row_stride * rows` region, and that the buffer covers it.
    pub(crate) fn validate(&self, name: &str, cols: usize, rows: usize) -> Result<()> {
        if self.pixel_stride == 0 {
            return Err(FrameError::MalformedFrame(format!(
                "{name} plane has zero pixel stride"
            )));
        }
        let overflow = || {
            FrameError::MalformedFrame(format!(
                "{name} plane strides overflow ({} x {rows} rows, pixel stride {})",
                self.row_stride, self.pixel_stride
            ))
        };
        let row_bytes = cols
            .saturating_sub(1)
            .checked_mul(self.pixel_stride)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(overflow)?;
        if self.row_stride < row_bytes {
            return Err(FrameError::MalformedFrame(format!(
                "{name} plane row stride {} is shorter than a {cols}-sample row ({row_bytes} bytes)",
                self.row_stride
            )));
        }
        let required = self.row_stride.checked_mul(rows).ok_or_else(overflow)?;
        if self.data.len() < required {
            return Err(FrameError::MalformedFrame(format!(
                "{name} plane holds {} bytes, expected at least {required} ({} x {rows})",
                self.data.len(),
                self.row_stride
            )));
        }
        Ok(())
    }
}

/// A raw YUV 4:2:0 frame as delivered by the frame source.
///
/// The frame owns copies of its plane buffers, so the source may reclaim its
/// own memory as soon as the frame has been built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub y: Plane,
    pub u: Plane,
    pub v: Plane,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
}

impl RawFrame {
    /// Width and height of the chroma planes (half resolution, rounded up).
    pub fn chroma_size(&self) -> (usize, usize) {
        (
            (self.width as usize).div_ceil(2),
            (self.height as usize).div_ceil(2),
        )
    }
}

/// Packed 32-bit ARGB raster, row-major, `width * height` pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Raster {
    /// Create a raster filled with a single ARGB value.
    pub fn filled(width: u32, height: u32, argb: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![argb; width as usize * height as usize],
        }
    }

    /// Wrap an existing pixel buffer. Fails if the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(FrameError::MalformedFrame(format!(
                "raster buffer holds {} pixels, expected {expected} ({width}x{height})",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw bytes of the pixel buffer in native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// ARGB value at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Resize the raster in place, reusing the allocation when possible.
    /// Pixel contents are unspecified afterwards.
    pub(crate) fn reshape(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width as usize * height as usize, 0);
    }

    /// Copy out the `width` x `height` region starting at `(x, y)`.
    ///
    /// The region must lie within the raster.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Raster {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let stride = self.width as usize;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in y as usize..(y + height) as usize {
            let start = row * stride + x as usize;
            pixels.extend_from_slice(&self.pixels[start..start + width as usize]);
        }
        Raster {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an `image` RGBA buffer.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut img = image::RgbaImage::new(self.width, self.height);
        for (dst, &argb) in img.pixels_mut().zip(self.pixels.iter()) {
            *dst = argb_to_rgba(argb);
        }
        img
    }
}

/// Split a packed ARGB value into an `image` RGBA pixel.
pub fn argb_to_rgba(argb: u32) -> image::Rgba<u8> {
    let [a, r, g, b] = argb.to_be_bytes();
    image::Rgba([r, g, b, a])
}

/// Extract `(r, g, b)` from a packed ARGB value.
pub fn argb_channels(argb: u32) -> (u8, u8, u8) {
    let [_, r, g, b] = argb.to_be_bytes();
    (r, g, b)
}
