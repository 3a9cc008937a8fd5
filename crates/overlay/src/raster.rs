//! Software rasteriser for draw ops, fault panels and the standby screen.

use {
    crate::{DrawOp, glyphs},
    base::{Rect, Vec2},
    image::Surface,
};

pub const FAULT_TITLE: &str = "CAMERA FAULT";
pub const STANDBY_TEXT: &str = "SYSTEM STANDBY";

const FAULT_RED: [u8; 3] = [0xef, 0x44, 0x44];
const FAULT_BACKDROP: [u8; 3] = [0x02, 0x06, 0x17];
const STANDBY_BACKGROUND: [u8; 3] = [0x02, 0x06, 0x17];
const STANDBY_TEXT_COLOR: [u8; 3] = [0x47, 0x55, 0x69];

/// Colour, opacity and stroke width of one kind of primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: [u8; 3],
    pub alpha: f32,
    pub width: i32,
}

impl Paint {
    pub const fn new(color: [u8; 3], alpha: f32, width: i32) -> Self {
        Self {
            color,
            alpha,
            width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub bbox: Paint,
    pub corner: Paint,
    pub label: Paint,
    pub joint: Paint,
    pub bone: Paint,
    /// Glyph scale for labels.
    pub label_scale: i32,
}

impl Default for Style {
    fn default() -> Self {
        let blue = [0x60, 0xa5, 0xfa];
        let cyan = [0x00, 0xe5, 0xff];
        Self {
            bbox: Paint::new(blue, 0.4, 1),
            corner: Paint::new(blue, 1.0, 2),
            label: Paint::new(blue, 1.0, 1),
            joint: Paint::new(cyan, 0.8, 1),
            bone: Paint::new(cyan, 0.7, 2),
            label_scale: 1,
        }
    }
}

/// Rasterise `ops`, already in surface coordinates, in order.
pub fn draw_ops(surface: &mut Surface, ops: &[DrawOp], style: &Style) {
    for op in ops {
        match op {
            DrawOp::Box { rect, .. } => draw_rect_outline(surface, *rect, &style.bbox),
            DrawOp::Corner { points, .. } => {
                draw_line(surface, points[0], points[1], &style.corner);
                draw_line(surface, points[1], points[2], &style.corner);
            }
            DrawOp::Label { anchor, text, .. } => {
                let anchor = anchor.to_pixel();
                glyphs::draw_text(
                    surface,
                    anchor.x,
                    anchor.y,
                    text,
                    style.label_scale,
                    style.label.color,
                );
            }
            DrawOp::Joint { center, radius, .. } => {
                draw_filled_circle(surface, *center, *radius, &style.joint)
            }
            DrawOp::Bone { from, to, .. } => draw_line(surface, *from, *to, &style.bone),
        }
    }
}

/// Dim the whole surface and put a red fault panel carrying `status` in the
/// middle.
pub fn draw_fault(surface: &mut Surface, status: &str) {
    fill_blend(surface, FAULT_BACKDROP, 0.8);

    let size = surface.size().to_f32();
    let scale = 2;
    let inner = glyphs::text_width(FAULT_TITLE, scale).max(glyphs::text_width(status, 1));
    let panel_size = Vec2::new(inner as f32 + 48.0, 72.0);
    let panel = Rect::new((size - panel_size) / 2.0, panel_size);
    let stroke = Paint::new(FAULT_RED, 1.0, 2);
    draw_rect_outline(surface, panel, &stroke);

    let center = panel.origin.to_pixel().x + panel_size.to_pixel().x / 2;
    let top = panel.origin.to_pixel().y;
    let title_x = center - glyphs::text_width(FAULT_TITLE, scale) / 2;
    glyphs::draw_text(surface, title_x, top + 30, FAULT_TITLE, scale, FAULT_RED);
    let status_x = center - glyphs::text_width(status, 1) / 2;
    glyphs::draw_text(surface, status_x, top + 54, status, 1, FAULT_RED);
}

/// Clear the surface to the standby background with a centred notice.
pub fn draw_standby(surface: &mut Surface) {
    surface.fill(STANDBY_BACKGROUND);
    let scale = 2;
    let x = (surface.width() as i32 - glyphs::text_width(STANDBY_TEXT, scale)) / 2;
    let baseline = surface.height() as i32 / 2 + glyphs::GLYPH_HEIGHT * scale / 2;
    glyphs::draw_text(surface, x, baseline, STANDBY_TEXT, scale, STANDBY_TEXT_COLOR);
}

fn fill_blend(surface: &mut Surface, color: [u8; 3], alpha: f32) {
    let (width, height) = (surface.width() as i32, surface.height() as i32);
    for y in 0..height {
        for x in 0..width {
            surface.blend_pixel(x, y, color, alpha);
        }
    }
}

pub fn draw_rect_outline(surface: &mut Surface, rect: Rect<f32>, paint: &Paint) {
    let [a, b, c, d] = rect.corners();
    if paint.width <= 1 {
        // Thin edges share their end pixels; draw each pixel once so the
        // blend stays uniform. Only the visible span is walked.
        let (min, max) = (a.to_pixel(), c.to_pixel());
        let width = surface.width() as i32;
        let height = surface.height() as i32;
        let on_x = |x: i32| (0..width).contains(&x);
        let on_y = |y: i32| (0..height).contains(&y);
        for x in min.x.max(0)..=max.x.min(width - 1) {
            if on_y(min.y) {
                surface.blend_pixel(x, min.y, paint.color, paint.alpha);
            }
            if max.y != min.y && on_y(max.y) {
                surface.blend_pixel(x, max.y, paint.color, paint.alpha);
            }
        }
        for y in min.y.saturating_add(1).max(0)..=max.y.saturating_sub(1).min(height - 1) {
            if on_x(min.x) {
                surface.blend_pixel(min.x, y, paint.color, paint.alpha);
            }
            if max.x != min.x && on_x(max.x) {
                surface.blend_pixel(max.x, y, paint.color, paint.alpha);
            }
        }
        return;
    }
    for (from, to) in [(a, b), (b, c), (c, d), (d, a)] {
        draw_line(surface, from, to, paint);
    }
}

/// Stroke a segment. Width 1 uses clipped Bresenham; wider strokes cover
/// every pixel within half the width of the segment.
pub fn draw_line(surface: &mut Surface, from: Vec2<f32>, to: Vec2<f32>, paint: &Paint) {
    if paint.width <= 1 {
        let (from, to) = (from.to_pixel(), to.to_pixel());
        draw_thin_line(surface, from.x, from.y, to.x, to.y, paint);
        return;
    }

    let half = paint.width as f32 / 2.0;
    let width = surface.width() as i32;
    let height = surface.height() as i32;
    let x_min = ((from.x.min(to.x) - half).floor() as i32).max(0);
    let x_max = ((from.x.max(to.x) + half).ceil() as i32).min(width - 1);
    let y_min = ((from.y.min(to.y) - half).floor() as i32).max(0);
    let y_max = ((from.y.max(to.y) + half).ceil() as i32).min(height - 1);

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let p = Vec2::new(x as f32, y as f32);
            if distance_to_segment(p, from, to) <= half {
                surface.blend_pixel(x, y, paint.color, paint.alpha);
            }
        }
    }
}

pub fn draw_filled_circle(surface: &mut Surface, center: Vec2<f32>, radius: f32, paint: &Paint) {
    let c = center.to_pixel();
    let r = radius.round().max(0.0) as i32;
    let r2 = r.saturating_mul(r);
    let width = surface.width() as i32;
    let height = surface.height() as i32;
    for dy in (-r).max(c.y.saturating_neg())..=r.min((height - 1).saturating_sub(c.y)) {
        for dx in (-r).max(c.x.saturating_neg())..=r.min((width - 1).saturating_sub(c.x)) {
            if dx * dx + dy * dy <= r2 {
                surface.blend_pixel(c.x + dx, c.y + dy, paint.color, paint.alpha);
            }
        }
    }
}

fn distance_to_segment(p: Vec2<f32>, a: Vec2<f32>, b: Vec2<f32>) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    let t = if len2 == 0.0 {
        0.0
    } else {
        ((ap.x * ab.x + ap.y * ab.y) / len2).clamp(0.0, 1.0)
    };
    let closest = a + ab * t;
    let d = p - closest;
    (d.x * d.x + d.y * d.y).sqrt()
}

fn draw_thin_line(
    surface: &mut Surface,
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    paint: &Paint,
) {
    let width = surface.width() as i32;
    let height = surface.height() as i32;
    if width == 0 || height == 0 {
        return;
    }

    // Cohen-Sutherland
    loop {
        let outcode0 = outcode(x0, y0, width, height);
        let outcode1 = outcode(x1, y1, width, height);
        if (outcode0 | outcode1) == 0 {
            break;
        }
        if (outcode0 & outcode1) != 0 {
            return;
        }
        let code = if outcode0 != 0 { outcode0 } else { outcode1 };
        let (x, y) = clip_point(x0, y0, x1, y1, code, width, height);
        if code == outcode0 {
            x0 = x;
            y0 = y;
        } else {
            x1 = x;
            y1 = y;
        }
    }

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        surface.blend_pixel(x0, y0, paint.color, paint.alpha);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn outcode(x: i32, y: i32, width: i32, height: i32) -> u8 {
    let mut code = 0;
    if x < 0 {
        code |= LEFT;
    } else if x >= width {
        code |= RIGHT;
    }
    if y < 0 {
        code |= TOP;
    } else if y >= height {
        code |= BOTTOM;
    }
    code
}

fn clip_point(x0: i32, y0: i32, x1: i32, y1: i32, code: u8, width: i32, height: i32) -> (i32, i32) {
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let (width, height) = (width as i64, height as i64);
    let dx = x1 - x0;
    let dy = y1 - y0;
    let (x, y) = if code & TOP != 0 {
        (x0 + dx * (0 - y0) / dy, 0)
    } else if code & BOTTOM != 0 {
        (x0 + dx * (height - 1 - y0) / dy, height - 1)
    } else if code & LEFT != 0 {
        (0, y0 + dy * (0 - x0) / dx)
    } else {
        (width - 1, y0 + dy * (width - 1 - x0) / dx)
    };
    (x as i32, y as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Paint = Paint::new([255, 255, 255], 1.0, 1);

    fn lit(surface: &Surface) -> usize {
        surface
            .as_rgb()
            .chunks_exact(3)
            .filter(|p| p.iter().any(|&c| c != 0))
            .count()
    }

    #[test]
    fn test_thin_line_clipped() {
        let mut surface = Surface::new(Vec2::new(10, 10));
        draw_line(
            &mut surface,
            Vec2::new(-20.0, 5.0),
            Vec2::new(40.0, 5.0),
            &WHITE,
        );
        assert_eq!(lit(&surface), 10);
        assert_eq!(surface.pixel(0, 5), Some([255, 255, 255]));
        assert_eq!(surface.pixel(9, 5), Some([255, 255, 255]));
    }

    #[test]
    fn test_line_outside_draws_nothing() {
        let mut surface = Surface::new(Vec2::new(10, 10));
        draw_line(
            &mut surface,
            Vec2::new(-5.0, -5.0),
            Vec2::new(-1.0, 20.0),
            &WHITE,
        );
        assert_eq!(lit(&surface), 0);
    }

    #[test]
    fn test_thick_line_width() {
        let mut surface = Surface::new(Vec2::new(20, 20));
        let paint = Paint::new([255, 255, 255], 1.0, 2);
        draw_line(&mut surface, Vec2::new(5.0, 10.0), Vec2::new(15.0, 10.0), &paint);
        assert_eq!(surface.pixel(10, 9), Some([255, 255, 255]));
        assert_eq!(surface.pixel(10, 10), Some([255, 255, 255]));
        assert_eq!(surface.pixel(10, 11), Some([255, 255, 255]));
        assert_eq!(surface.pixel(10, 13), Some([0, 0, 0]));
    }

    #[test]
    fn test_translucent_outline_blends_once() {
        let mut surface = Surface::new(Vec2::new(10, 10));
        let paint = Paint::new([200, 200, 200], 0.5, 1);
        let rect = Rect::new(Vec2::new(1.0, 1.0), Vec2::new(5.0, 5.0));
        draw_rect_outline(&mut surface, rect, &paint);
        assert_eq!(surface.pixel(1, 1), Some([100, 100, 100]));
        assert_eq!(surface.pixel(6, 6), Some([100, 100, 100]));
        assert_eq!(surface.pixel(3, 3), Some([0, 0, 0]));
        assert_eq!(lit(&surface), 20);
    }

    #[test]
    fn test_huge_outline_clipped_to_surface() {
        let mut surface = Surface::new(Vec2::new(1280, 720));
        let rect = Rect::from_min_max(Vec2::new(10.0, 10.0), Vec2::new(1.0e12, 100.0));
        draw_rect_outline(&mut surface, rect, &WHITE);
        assert_eq!(surface.pixel(10, 10), Some([255, 255, 255]));
        assert_eq!(surface.pixel(1279, 10), Some([255, 255, 255]));
        assert_eq!(surface.pixel(10, 50), Some([255, 255, 255]));
        assert_eq!(surface.pixel(1279, 100), Some([255, 255, 255]));
        assert_eq!(surface.pixel(1279, 50), Some([0, 0, 0]));
        // top and bottom edges across the surface, plus the left edge between
        assert_eq!(lit(&surface), 2 * 1270 + 89);
    }

    #[test]
    fn test_filled_circle_off_surface() {
        let mut surface = Surface::new(Vec2::new(10, 10));
        draw_filled_circle(&mut surface, Vec2::new(0.0, 0.0), 1.0, &WHITE);
        assert_eq!(lit(&surface), 3);
        draw_filled_circle(&mut surface, Vec2::new(-1.0e9, 4.0), 2.0, &WHITE);
        assert_eq!(lit(&surface), 3);
    }

    #[test]
    fn test_filled_circle() {
        let mut surface = Surface::new(Vec2::new(10, 10));
        draw_filled_circle(&mut surface, Vec2::new(5.0, 5.0), 1.0, &WHITE);
        assert_eq!(lit(&surface), 5);
    }

    #[test]
    fn test_standby_fills_background() {
        let mut surface = Surface::new(Vec2::new(200, 40));
        draw_standby(&mut surface);
        assert_eq!(surface.pixel(0, 0), Some(STANDBY_BACKGROUND));
        let text_pixels = surface
            .as_rgb()
            .chunks_exact(3)
            .filter(|p| *p == STANDBY_TEXT_COLOR)
            .count();
        assert!(text_pixels > 0);
    }

    #[test]
    fn test_fault_panel_is_red() {
        let mut surface = Surface::new(Vec2::new(320, 180));
        surface.fill([255, 255, 255]);
        draw_fault(&mut surface, "CAMERA_ERROR: DEVICE BUSY");
        let red = surface
            .as_rgb()
            .chunks_exact(3)
            .filter(|p| *p == FAULT_RED)
            .count();
        assert!(red > 0);
        // Everything outside the panel is dimmed.
        let corner = surface.pixel(0, 0).expect("pixel");
        assert!(corner[0] < 60);
    }
}
