/// Render-target rectangle in physical pixels, origin top-left.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole `width` x `height` target.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersects the viewport with a `width` x `height` target.
    ///
    /// Returns `None` when nothing of the viewport lies inside the target.
    pub fn clamped_to(self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        let v = Self::new(self.x, self.y, w, h);
        (!v.is_empty()).then_some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_inside_target_is_identity() {
        let v = Viewport::full(800, 600);
        assert_eq!(v.clamped_to(800, 600), Some(v));
    }

    #[test]
    fn clamp_trims_overhang() {
        let v = Viewport::new(100, 50, 1000, 1000);
        assert_eq!(v.clamped_to(800, 600), Some(Viewport::new(100, 50, 700, 550)));
    }

    #[test]
    fn clamp_outside_target_is_none() {
        assert_eq!(Viewport::new(900, 0, 10, 10).clamped_to(800, 600), None);
        assert_eq!(Viewport::full(0, 10).clamped_to(800, 600), None);
    }
}
