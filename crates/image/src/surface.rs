use {
    crate::ImageError,
    base::{Stamped, Vec2},
    std::sync::{Arc, Mutex, MutexGuard},
};

/// Fixed-size RGB8 pixel buffer, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    size: Vec2<usize>,
    data: Vec<u8>,
}

impl Surface {
    /// A black surface.
    pub fn new(size: Vec2<usize>) -> Self {
        Self {
            size,
            data: vec![0; size.area() * 3],
        }
    }

    pub fn from_rgb(size: Vec2<usize>, data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() != size.area() * 3 {
            return Err(ImageError::Decode(format!(
                "expected {} RGB bytes for {}x{}, got {}",
                size.area() * 3,
                size.x,
                size.y,
                data.len()
            )));
        }
        Ok(Self { size, data })
    }

    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.x
    }

    pub fn height(&self) -> usize {
        self.size.y
    }

    pub fn as_rgb(&self) -> &[u8] {
        &self.data
    }

    pub fn fill(&mut self, color: [u8; 3]) {
        for pixel in self.data.chunks_exact_mut(3) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        let idx = (y * self.size.x + x) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Set one pixel. Positions outside the surface are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if x < 0 || y < 0 || x as usize >= self.size.x || y as usize >= self.size.y {
            return;
        }
        let idx = (y as usize * self.size.x + x as usize) * 3;
        self.data[idx..idx + 3].copy_from_slice(&color);
    }

    /// Mix `color` into one pixel with weight `alpha` in [0, 1].
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 3], alpha: f32) {
        let Some(current) = self.pixel_i32(x, y) else {
            return;
        };
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |c: u8, n: u8| (c as f32 * (1.0 - alpha) + n as f32 * alpha).round() as u8;
        self.set_pixel(
            x,
            y,
            [
                mix(current[0], color[0]),
                mix(current[1], color[1]),
                mix(current[2], color[2]),
            ],
        );
    }

    fn pixel_i32(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        if x < 0 || y < 0 {
            return None;
        }
        self.pixel(x as usize, y as usize)
    }

    /// Copy `src` onto this surface with its top-left corner at the origin.
    /// Whatever does not fit is clipped.
    pub fn blit(&mut self, src: &Surface) {
        let width = self.size.x.min(src.size.x);
        let height = self.size.y.min(src.size.y);
        for y in 0..height {
            let dst = y * self.size.x * 3;
            let from = y * src.size.x * 3;
            self.data[dst..dst + width * 3].copy_from_slice(&src.data[from..from + width * 3]);
        }
    }

    /// Packed `0x00RRGGBB` pixels, the layout minifb expects.
    pub fn to_argb(&self) -> Vec<u32> {
        self.data
            .chunks_exact(3)
            .map(|c| ((c[0] as u32) << 16) | ((c[1] as u32) << 8) | c[2] as u32)
            .collect()
    }
}

#[derive(Debug)]
struct Canvas {
    surface: Surface,
    stamp: u64,
    released: bool,
}

/// A surface shared between the frame source, which paints it, and the
/// presenter, which reads it.
///
/// Paints are stamped; a paint older than the last one applied is discarded.
#[derive(Debug, Clone)]
pub struct SharedSurface {
    inner: Arc<Mutex<Canvas>>,
}

impl SharedSurface {
    pub fn new(size: Vec2<usize>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Canvas {
                surface: Surface::new(size),
                stamp: 0,
                released: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Canvas> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn downgrade(&self) -> WeakSurface {
        WeakSurface {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Stamp of the last applied paint, 0 before the first one.
    pub fn stamp(&self) -> u64 {
        self.lock().stamp
    }

    pub fn is_painted(&self) -> bool {
        self.stamp() > 0
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// Run `f` against the current contents.
    pub fn read<R>(&self, f: impl FnOnce(&Surface) -> R) -> R {
        f(&self.lock().surface)
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Surface {
        self.lock().surface.clone()
    }

    /// Replace the contents with `frame` if it is newer than the last paint.
    /// Returns whether it was applied.
    pub fn paint(&self, frame: Stamped<Surface>) -> Result<bool, ImageError> {
        let mut canvas = self.lock();
        if canvas.released {
            return Err(ImageError::Closed);
        }
        if !frame.is_newer_than(canvas.stamp) {
            return Ok(false);
        }
        canvas.surface.blit(&frame.inner);
        canvas.stamp = frame.stamp;
        Ok(true)
    }

    pub(crate) fn release(&self) {
        self.lock().released = true;
    }
}

pub(crate) struct WeakSurface {
    inner: std::sync::Weak<Mutex<Canvas>>,
}

impl WeakSurface {
    pub(crate) fn upgrade(&self) -> Option<SharedSurface> {
        self.inner.upgrade().map(|inner| SharedSurface { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pixel_clips() {
        let mut surface = Surface::new(Vec2::new(4, 2));
        surface.set_pixel(-1, 0, [255, 0, 0]);
        surface.set_pixel(4, 1, [255, 0, 0]);
        surface.set_pixel(3, 1, [1, 2, 3]);
        assert_eq!(surface.pixel(3, 1), Some([1, 2, 3]));
        assert_eq!(surface.pixel(4, 1), None);
        assert_eq!(surface.as_rgb().iter().filter(|&&b| b != 0).count(), 3);
    }

    #[test]
    fn test_blit_clips_to_destination() {
        let mut dst = Surface::new(Vec2::new(2, 2));
        let mut src = Surface::new(Vec2::new(3, 1));
        src.fill([9, 9, 9]);
        dst.blit(&src);
        assert_eq!(dst.pixel(0, 0), Some([9, 9, 9]));
        assert_eq!(dst.pixel(1, 0), Some([9, 9, 9]));
        assert_eq!(dst.pixel(0, 1), Some([0, 0, 0]));
    }

    #[test]
    fn test_to_argb() {
        let mut surface = Surface::new(Vec2::new(1, 1));
        surface.fill([0x12, 0x34, 0x56]);
        assert_eq!(surface.to_argb(), vec![0x00123456]);
    }

    #[test]
    fn test_blend_pixel() {
        let mut surface = Surface::new(Vec2::new(1, 1));
        surface.blend_pixel(0, 0, [200, 100, 0], 0.5);
        assert_eq!(surface.pixel(0, 0), Some([100, 50, 0]));
    }

    #[test]
    fn test_paint_discards_stale() {
        let shared = SharedSurface::new(Vec2::new(1, 1));
        let mut blue = Surface::new(Vec2::new(1, 1));
        blue.fill([0, 0, 255]);
        let mut red = Surface::new(Vec2::new(1, 1));
        red.fill([255, 0, 0]);

        assert!(shared.paint(Stamped::new(2, blue)).expect("paint"));
        assert!(!shared.paint(Stamped::new(1, red)).expect("paint"));
        assert_eq!(shared.read(|s| s.pixel(0, 0)), Some([0, 0, 255]));
        assert_eq!(shared.stamp(), 2);
    }

    #[test]
    fn test_paint_after_release() {
        let shared = SharedSurface::new(Vec2::new(1, 1));
        shared.release();
        let frame = Surface::new(Vec2::new(1, 1));
        assert!(matches!(
            shared.paint(Stamped::new(1, frame)),
            Err(ImageError::Closed)
        ));
    }
}
