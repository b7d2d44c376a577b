//! Live viewport dimensions

use serde::{Deserialize, Serialize};

use crate::math::Size;

/// Current viewport dimensions.
///
/// A plain state holder. The registry reads it at call time, so geometry
/// clamping always sees the dimensions in effect at the moment of the call,
/// never a cached copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen size in pixels
    pub screen_size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            screen_size: Size::new(1920.0, 1080.0),
        }
    }
}

impl Viewport {
    /// Create a new viewport with the given screen size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            screen_size: Size::new(width, height),
        }
    }

    /// Update the screen size (host calls this on resize events)
    #[inline]
    pub fn set_screen_size(&mut self, size: Size) {
        self.screen_size = size;
    }

    /// Viewport width in pixels
    #[inline]
    pub fn width(&self) -> f32 {
        self.screen_size.width
    }

    /// Viewport height in pixels
    #[inline]
    pub fn height(&self) -> f32 {
        self.screen_size.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_default() {
        let viewport = Viewport::default();
        assert!((viewport.width() - 1920.0).abs() < 0.001);
        assert!((viewport.height() - 1080.0).abs() < 0.001);
    }

    #[test]
    fn test_viewport_resize() {
        let mut viewport = Viewport::new(1280.0, 720.0);
        viewport.set_screen_size(Size::new(800.0, 600.0));
        assert!((viewport.width() - 800.0).abs() < 0.001);
        assert!((viewport.height() - 600.0).abs() < 0.001);
    }
}
