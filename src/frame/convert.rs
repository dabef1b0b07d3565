use super::error::{FrameError, Result};
use super::types::{Raster, RawFrame};

/// Upper bound of the 18-bit fixed-point channel value (2^18 - 1).
const MAX_CHANNEL_VALUE: i32 = 262_143;

/// Convert one limited-range BT.601 sample to opaque packed ARGB.
///
/// Coefficients are scaled by 1024 (<<10) so the whole conversion stays in
/// integer arithmetic; each channel is clamped before being packed.
#[inline]
fn yuv_to_argb(y: u8, u: u8, v: u8) -> u32 {
    let y = (i32::from(y) - 16).max(0);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;

    let y1192 = 1192 * y;
    let r = (y1192 + 1634 * v).clamp(0, MAX_CHANNEL_VALUE);
    let g = (y1192 - 833 * v - 400 * u).clamp(0, MAX_CHANNEL_VALUE);
    let b = (y1192 + 2066 * u).clamp(0, MAX_CHANNEL_VALUE);

    0xFF00_0000 | (((r << 6) & 0x00FF_0000) | ((g >> 2) & 0x0000_FF00) | ((b >> 10) & 0xFF)) as u32
}

/// Convert a YUV 4:2:0 frame into a newly allocated ARGB raster.
pub fn convert_yuv420_to_argb(frame: &RawFrame) -> Result<Raster> {
    let mut raster = Raster::filled(0, 0, 0);
    convert_yuv420_into(frame, &mut raster)?;
    Ok(raster)
}

/// Convert a YUV 4:2:0 frame into `out`, reusing its allocation.
///
/// Rows are addressed through each plane's row stride, so padded buffers are
/// handled without assuming tight packing. Chroma may be planar (pixel
/// stride 1) or interleaved (pixel stride 2). Every plane is bounds-checked
/// against `row_stride * rows` up front; on failure `out` is left untouched.
pub fn convert_yuv420_into(frame: &RawFrame, out: &mut Raster) -> Result<()> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    if width == 0 || height == 0 {
        return Err(FrameError::MalformedFrame(format!(
            "zero-sized frame ({}x{})",
            frame.width, frame.height
        )));
    }

    let (chroma_width, chroma_height) = frame.chroma_size();
    frame.y.validate("Y", width, height)?;
    frame.u.validate("U", chroma_width, chroma_height)?;
    frame.v.validate("V", chroma_width, chroma_height)?;

    out.reshape(frame.width, frame.height);
    let (y_plane, u_plane, v_plane) = (&frame.y, &frame.u, &frame.v);

    for (row, out_row) in out.pixels_mut().chunks_exact_mut(width).enumerate() {
        let y_base = row * y_plane.row_stride;
        let u_base = (row >> 1) * u_plane.row_stride;
        let v_base = (row >> 1) * v_plane.row_stride;

        for (col, dst) in out_row.iter_mut().enumerate() {
            let y = y_plane.data[y_base + col * y_plane.pixel_stride];
            let u = u_plane.data[u_base + (col >> 1) * u_plane.pixel_stride];
            let v = v_plane.data[v_base + (col >> 1) * v_plane.pixel_stride];
            *dst = yuv_to_argb(y, u, v);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::types::{argb_channels, Plane};

    /// Build a planar frame with every sample set to the given values and
    /// `padding` extra bytes per row filled with 0xEE.
    fn uniform_frame(width: u32, height: u32, yuv: (u8, u8, u8), padding: usize) -> RawFrame {
        let w = width as usize;
        let h = height as usize;
        let cw = w.div_ceil(2);
        let ch = h.div_ceil(2);
        let plane = |value: u8, cols: usize, rows: usize| {
            let stride = cols + padding;
            let mut data = vec![0xEE; stride * rows];
            for row in 0..rows {
                data[row * stride..row * stride + cols].fill(value);
            }
            Plane::new(data, stride, 1)
        };
        RawFrame {
            width,
            height,
            y: plane(yuv.0, w, h),
            u: plane(yuv.1, cw, ch),
            v: plane(yuv.2, cw, ch),
            timestamp_us: 0,
        }
    }

    fn assert_close(actual: u8, expected: u8, tolerance: u8) {
        assert!(
            actual.abs_diff(expected) <= tolerance,
            "channel {actual} not within {tolerance} of {expected}"
        );
    }

    #[test]
    fn flat_field_converts_to_uniform_grey() {
        let frame = uniform_frame(640, 480, (128, 128, 128), 0);
        let raster = convert_yuv420_to_argb(&frame).unwrap();
        assert_eq!(raster.width(), 640);
        assert_eq!(raster.height(), 480);
        for &argb in raster.pixels() {
            assert_eq!(argb >> 24, 0xFF);
            let (r, g, b) = argb_channels(argb);
            assert_close(r, 128, 2);
            assert_close(g, 128, 2);
            assert_close(b, 128, 2);
        }
    }

    #[test]
    fn converts_black_and_white_extremes() {
        let black = convert_yuv420_to_argb(&uniform_frame(2, 2, (16, 128, 128), 0)).unwrap();
        assert_eq!(black.pixel(0, 0), Some(0xFF00_0000));

        let white = convert_yuv420_to_argb(&uniform_frame(2, 2, (235, 128, 128), 0)).unwrap();
        let (r, g, b) = argb_channels(white.pixel(1, 1).unwrap());
        assert_close(r, 255, 1);
        assert_close(g, 255, 1);
        assert_close(b, 255, 1);
    }

    #[test]
    fn luma_below_black_level_clamps_to_zero() {
        let raster = convert_yuv420_to_argb(&uniform_frame(2, 2, (0, 128, 128), 0)).unwrap();
        assert_eq!(raster.pixel(0, 0), Some(0xFF00_0000));
    }

    #[test]
    fn strong_red_chroma_saturates_red_channel() {
        let raster = convert_yuv420_to_argb(&uniform_frame(2, 2, (128, 128, 255), 0)).unwrap();
        let (r, g, b) = argb_channels(raster.pixel(0, 0).unwrap());
        assert_eq!(r, 255);
        assert!(g < 128, "green should drop, got {g}");
        assert_close(b, 130, 2);
    }

    #[test]
    fn row_padding_is_never_read_as_pixels() {
        let tight = convert_yuv420_to_argb(&uniform_frame(6, 4, (90, 100, 160), 0)).unwrap();
        let padded = convert_yuv420_to_argb(&uniform_frame(6, 4, (90, 100, 160), 10)).unwrap();
        assert_eq!(tight, padded);
    }

    #[test]
    fn odd_dimensions_use_rounded_up_chroma() {
        let raster = convert_yuv420_to_argb(&uniform_frame(3, 3, (128, 128, 128), 0)).unwrap();
        assert_eq!(raster.pixels().len(), 9);
    }

    #[test]
    fn semi_planar_chroma_with_pixel_stride_two() {
        // 4x2 frame, one chroma row of two interleaved V/U pairs (NV21 layout).
        // The U plane view starts one byte into the shared buffer.
        let interleaved = [200u8, 60, 100, 180, 0];
        let frame = RawFrame {
            width: 4,
            height: 2,
            y: Plane::new(vec![128; 8], 4, 1),
            u: Plane::new(interleaved[1..].to_vec(), 4, 2),
            v: Plane::new(interleaved[..4].to_vec(), 4, 2),
            timestamp_us: 0,
        };

        let raster = convert_yuv420_to_argb(&frame).unwrap();
        assert_eq!(raster.pixel(0, 0), Some(yuv_to_argb(128, 60, 200)));
        assert_eq!(raster.pixel(1, 1), Some(yuv_to_argb(128, 60, 200)));
        assert_eq!(raster.pixel(2, 0), Some(yuv_to_argb(128, 180, 100)));
        assert_eq!(raster.pixel(3, 1), Some(yuv_to_argb(128, 180, 100)));
    }

    #[test]
    fn undersized_luma_plane_is_malformed() {
        let mut frame = uniform_frame(4, 4, (128, 128, 128), 0);
        frame.y.data.truncate(15);
        let err = convert_yuv420_to_argb(&frame).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFrame(_)));
    }

    #[test]
    fn overflowing_row_stride_is_malformed() {
        let mut frame = uniform_frame(4, 4, (128, 128, 128), 0);
        frame.y.row_stride = 1 << 62;
        assert!(matches!(
            convert_yuv420_to_argb(&frame),
            Err(FrameError::MalformedFrame(_))
        ));

        frame.y.row_stride = usize::MAX / 2;
        assert!(matches!(
            convert_yuv420_to_argb(&frame),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn overflowing_pixel_stride_is_malformed() {
        let mut frame = uniform_frame(4, 4, (128, 128, 128), 0);
        frame.u.pixel_stride = usize::MAX;
        assert!(matches!(
            convert_yuv420_to_argb(&frame),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn undersized_chroma_plane_is_malformed() {
        let mut frame = uniform_frame(4, 4, (128, 128, 128), 2);
        frame.v.data.truncate(frame.v.data.len() - 1);
        assert!(matches!(
            convert_yuv420_to_argb(&frame),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn zero_dimensions_are_malformed() {
        let frame = uniform_frame(0, 0, (128, 128, 128), 0);
        assert!(convert_yuv420_to_argb(&frame).is_err());
    }

    #[test]
    fn failed_conversion_leaves_output_untouched() {
        let mut out = Raster::filled(2, 2, 0xFF12_3456);
        let mut frame = uniform_frame(4, 4, (128, 128, 128), 0);
        frame.u.data.clear();
        assert!(convert_yuv420_into(&frame, &mut out).is_err());
        assert_eq!(out, Raster::filled(2, 2, 0xFF12_3456));
    }

    #[test]
    fn convert_into_reuses_output_buffer() {
        let mut out = Raster::filled(1, 1, 0);
        convert_yuv420_into(&uniform_frame(8, 6, (128, 128, 128), 0), &mut out).unwrap();
        assert_eq!((out.width(), out.height()), (8, 6));
        assert_eq!(out.pixels().len(), 48);
    }
}
