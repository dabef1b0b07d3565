use super::types::Raster;

/// Ratios closer than this are treated as already matching.
pub const MAX_RATIO_DIFFERENCE: f64 = 1e-5;

/// A centred crop window within a source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the centred crop that gives `width` x `height` the aspect ratio of
/// `target_width` x `target_height`.
///
/// Returns `None` when no crop is needed: the ratios already match within
/// [`MAX_RATIO_DIFFERENCE`], any dimension is zero, or the trimmed amount
/// rounds to zero. The kept dimension is never smaller than one pixel.
pub fn crop_region(
    width: u32,
    height: u32,
    target_width: u32,
    target_height: u32,
) -> Option<CropRegion> {
    if width == 0 || height == 0 || target_width == 0 || target_height == 0 {
        return None;
    }

    let bitmap_ratio = f64::from(height) / f64::from(width);
    let model_ratio = f64::from(target_height) / f64::from(target_width);
    if (model_ratio - bitmap_ratio).abs() < MAX_RATIO_DIFFERENCE {
        return None;
    }

    if model_ratio < bitmap_ratio {
        // Taller than needed: keep a centred horizontal band, full width.
        let keep = (f64::from(width) * model_ratio).round() as u32;
        let trim = height.checked_sub(keep.max(1))?;
        if trim == 0 {
            return None;
        }
        Some(CropRegion {
            x: 0,
            y: trim / 2,
            width,
            height: height - trim,
        })
    } else {
        // Wider than needed: keep a centred vertical band, full height.
        let keep = (f64::from(height) / model_ratio).round() as u32;
        let trim = width.checked_sub(keep.max(1))?;
        if trim == 0 {
            return None;
        }
        Some(CropRegion {
            x: trim / 2,
            y: 0,
            width: width - trim,
            height,
        })
    }
}

/// Centre-crop `raster` to the aspect ratio of the model input.
///
/// Takes ownership so the matching-ratio fast path hands the same buffer
/// straight back; otherwise the kept region is copied into a new raster.
pub fn crop_to_aspect(raster: Raster, target_width: u32, target_height: u32) -> Raster {
    match crop_region(raster.width(), raster.height(), target_width, target_height) {
        Some(region) => raster.crop(region.x, region.y, region.width, region.height),
        None => raster,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn indexed(width: u32, height: u32) -> Raster {
        let pixels = (0..width * height).collect();
        Raster::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn matching_ratio_returns_input_unchanged() {
        let raster = indexed(257, 257);
        let before = raster.clone();
        let ptr = raster.pixels().as_ptr();
        let out = crop_to_aspect(raster, 257, 257);
        assert_eq!(out, before);
        // Same allocation, no copy on the fast path.
        assert_eq!(out.pixels().as_ptr(), ptr);
    }

    #[test]
    fn cropping_twice_is_idempotent() {
        let once = crop_to_aspect(indexed(640, 480), 257, 257);
        let twice = crop_to_aspect(once.clone(), 257, 257);
        assert_eq!(once, twice);
    }

    #[test]
    fn landscape_frame_is_cropped_to_centred_square() {
        let region = crop_region(640, 480, 257, 257).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 80,
                y: 0,
                width: 480,
                height: 480
            }
        );
    }

    #[test]
    fn portrait_frame_is_cropped_to_centred_square() {
        let region = crop_region(480, 640, 257, 257).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 0,
                y: 80,
                width: 480,
                height: 480
            }
        );
    }

    #[test]
    fn cropped_pixels_come_from_the_centre() {
        let out = crop_to_aspect(indexed(4, 2), 1, 1);
        assert_eq!((out.width(), out.height()), (2, 2));
        // Columns 1..3 of a 4-wide raster.
        assert_eq!(out.pixels(), &[1, 2, 5, 6]);
    }

    #[test]
    fn non_square_target_uses_width_for_height() {
        // 100x100 to a 2:1 (w:h) model keeps a 100x50 band.
        let region = crop_region(100, 100, 200, 100).unwrap();
        assert_eq!((region.width, region.height), (100, 50));
        assert_eq!(region.y, 25);
    }

    #[test]
    fn degenerate_inputs_are_returned_unchanged() {
        assert_eq!(crop_region(0, 10, 257, 257), None);
        assert_eq!(crop_region(10, 10, 0, 257), None);
        // A 1-pixel-wide strip cannot be trimmed below one pixel of height.
        let region = crop_region(1, 1000, 1000, 1).unwrap();
        assert_eq!(region.height, 1);
        // Trim that rounds to zero is a no-op.
        assert_eq!(crop_region(10, 10, 100, 99), None);
    }

    proptest! {
        #[test]
        fn square_targets_always_produce_exact_ratio(w in 1u32..2000, h in 1u32..2000) {
            let out = crop_region(w, h, 257, 257)
                .map(|r| (r.width, r.height))
                .unwrap_or((w, h));
            prop_assert!((f64::from(out.1) / f64::from(out.0) - 1.0).abs() < MAX_RATIO_DIFFERENCE);
        }

        #[test]
        fn any_target_ratio_is_met_within_a_pixel(
            w in 1u32..2000,
            h in 1u32..2000,
            tw in 1u32..1000,
            th in 1u32..1000,
        ) {
            if let Some(r) = crop_region(w, h, tw, th) {
                let model_ratio = f64::from(th) / f64::from(tw);
                let ideal_height = f64::from(r.width) * model_ratio;
                let ideal_width = f64::from(r.height) / model_ratio;
                prop_assert!(r.width >= 1 && r.height >= 1);
                prop_assert!(r.width <= w && r.height <= h);
                prop_assert!(
                    (f64::from(r.height) - ideal_height).abs() <= 0.5
                        || (f64::from(r.width) - ideal_width).abs() <= 0.5
                        || r.width == 1
                        || r.height == 1
                );
            }
        }

        #[test]
        fn crop_offset_is_half_the_trimmed_amount(
            w in 1u32..2000,
            h in 1u32..2000,
            tw in 1u32..1000,
            th in 1u32..1000,
        ) {
            if let Some(r) = crop_region(w, h, tw, th) {
                let trimmed_x = w - r.width;
                let trimmed_y = h - r.height;
                prop_assert_eq!(r.x, trimmed_x / 2);
                prop_assert_eq!(r.y, trimmed_y / 2);
                prop_assert!(trimmed_x == 0 || trimmed_y == 0);
            }
        }
    }
}
