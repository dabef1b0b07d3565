use crate::pose::Position;

/// Axis-aligned integer rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }
}

/// Maps model-input coordinates onto the display canvas.
///
/// Model content is letterboxed into the largest square that fits the
/// canvas, centred along the longer axis. Rebuild it every frame from the
/// live canvas size; canvases can change size between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    pub width_ratio: f32,
    pub height_ratio: f32,
    pub left: i32,
    pub top: i32,
    square_size: u32,
}

impl RenderTransform {
    /// Fit a `model_width` x `model_height` input into a
    /// `canvas_width` x `canvas_height` canvas.
    pub fn fit(canvas_width: u32, canvas_height: u32, model_width: u32, model_height: u32) -> Self {
        let (square_size, left, top) = if canvas_height > canvas_width {
            (canvas_width, 0, (canvas_height - canvas_width) / 2)
        } else {
            (canvas_height, (canvas_width - canvas_height) / 2, 0)
        };
        Self {
            width_ratio: ratio(square_size, model_width),
            height_ratio: ratio(square_size, model_height),
            left: left as i32,
            top: top as i32,
            square_size,
        }
    }

    /// Transform that leaves model coordinates as they are, for drawing
    /// straight onto a model-sized raster.
    pub fn identity(model_width: u32, model_height: u32) -> Self {
        Self {
            width_ratio: 1.0,
            height_ratio: 1.0,
            left: 0,
            top: 0,
            square_size: model_width.min(model_height),
        }
    }

    /// Side length of the letterbox square in display pixels.
    pub fn square_size(&self) -> u32 {
        self.square_size
    }

    /// The canvas region the model input is drawn into.
    pub fn dest_rect(&self) -> Rect {
        Rect {
            left: self.left,
            top: self.top,
            width: self.square_size,
            height: self.square_size,
        }
    }

    /// Model space to display space.
    pub fn map_point(&self, point: Position) -> (f32, f32) {
        (
            point.x * self.width_ratio + self.left as f32,
            point.y * self.height_ratio + self.top as f32,
        )
    }

    /// Display space back to model space. `None` for a degenerate transform
    /// (zero-sized canvas).
    pub fn unmap_point(&self, x: f32, y: f32) -> Option<Position> {
        if self.width_ratio == 0.0 || self.height_ratio == 0.0 {
            return None;
        }
        Some(Position::new(
            (x - self.left as f32) / self.width_ratio,
            (y - self.top as f32) / self.height_ratio,
        ))
    }

    /// Scale a model-relative offset into display space without the
    /// letterbox origin, as used for the diagnostic text.
    pub fn scale_offset(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx * self.width_ratio, dy * self.height_ratio)
    }
}

fn ratio(square_size: u32, model_size: u32) -> f32 {
    if model_size == 0 {
        return 0.0;
    }
    square_size as f32 / model_size as f32
}
