//! Normalized → pixel coordinate mapping.
//!
//! Rounding is half-away-from-zero (`f64::round`). Results are clamped into the
//! canvas: scraped boxes can overshoot `[0, 1]` by a little due to rendering
//! jitter and downstream layout is pixel-exact.

use crate::models::{CanvasSize, NormalizedBox, PixelBox};

/// Map a normalized box onto `canvas`.
///
/// The returned box always satisfies `x + width <= canvas.width` and
/// `y + height <= canvas.height`.
pub fn to_pixels(bbox: &NormalizedBox, canvas: CanvasSize) -> PixelBox {
    let x = scale(bbox.x, canvas.width);
    let y = scale(bbox.y, canvas.height);
    let width = scale(bbox.width, canvas.width).min(canvas.width - x);
    let height = scale(bbox.height, canvas.height).min(canvas.height - y);
    PixelBox { x, y, width, height }
}

/// Box covering the entire canvas.
pub fn full_canvas(canvas: CanvasSize) -> PixelBox {
    PixelBox {
        x: 0,
        y: 0,
        width: canvas.width,
        height: canvas.height,
    }
}

/// Smallest normalized box enclosing every box in `boxes`. `None` when empty.
pub fn union_box<'a, I>(boxes: I) -> Option<NormalizedBox>
where
    I: IntoIterator<Item = &'a NormalizedBox>,
{
    let mut iter = boxes.into_iter();
    let first = iter.next()?;
    let (mut left, mut top) = (first.x, first.y);
    let (mut right, mut bottom) = (first.x + first.width, first.y + first.height);

    for b in iter {
        left = left.min(b.x);
        top = top.min(b.y);
        right = right.max(b.x + b.width);
        bottom = bottom.max(b.y + b.height);
    }

    Some(NormalizedBox {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}

fn scale(value: f64, extent: u32) -> u32 {
    let px = (value * f64::from(extent)).round();
    if px.is_nan() {
        return 0;
    }
    px.clamp(0.0, f64::from(extent)) as u32
}
