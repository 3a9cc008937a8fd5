use base::{Rect, Vec2};

/// Uniform scale plus offset from the logical frame to a screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub offset: Vec2<f32>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

impl Viewport {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::zero(),
        }
    }

    /// Cover fit: scale until the logical frame covers the whole screen, keep
    /// it centred, and crop whatever overhangs.
    pub fn slice(logical: Vec2<f32>, screen: Vec2<f32>) -> Self {
        if logical.x <= 0.0 || logical.y <= 0.0 {
            return Self::identity();
        }
        let scale = (screen.x / logical.x).max(screen.y / logical.y);
        Self {
            scale,
            offset: (screen - logical * scale) / 2.0,
        }
    }

    pub fn map_point(&self, point: Vec2<f32>) -> Vec2<f32> {
        point * self.scale + self.offset
    }

    pub fn map_length(&self, length: f32) -> f32 {
        length * self.scale
    }

    pub fn map_rect(&self, rect: Rect<f32>) -> Rect<f32> {
        rect.transform(self.scale, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_is_identity() {
        let vp = Viewport::slice(Vec2::new(1280.0, 720.0), Vec2::new(1280.0, 720.0));
        assert_eq!(vp, Viewport::identity());
    }

    #[test]
    fn test_uniform_scale() {
        let vp = Viewport::slice(Vec2::new(1280.0, 720.0), Vec2::new(640.0, 360.0));
        assert_eq!(vp.scale, 0.5);
        assert_eq!(vp.map_point(Vec2::new(100.0, 100.0)), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_taller_screen_crops_sides() {
        // 4:3 screen, 16:9 frame: height decides, sides overhang.
        let vp = Viewport::slice(Vec2::new(1280.0, 720.0), Vec2::new(960.0, 720.0));
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.offset, Vec2::new(-160.0, 0.0));
        assert_eq!(vp.map_point(Vec2::new(640.0, 360.0)), Vec2::new(480.0, 360.0));
    }

    #[test]
    fn test_wider_screen_crops_top_and_bottom() {
        let vp = Viewport::slice(Vec2::new(1280.0, 720.0), Vec2::new(2560.0, 1080.0));
        assert_eq!(vp.scale, 2.0);
        assert_eq!(vp.offset, Vec2::new(0.0, -180.0));
    }
}
