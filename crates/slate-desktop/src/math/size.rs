//! 2D size type for window dimensions

use serde::{Deserialize, Serialize};

/// Width and height in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_serialization() {
        let s = Size::new(540.0, 400.0);
        let json = serde_json::to_string(&s).unwrap();
        let restored: Size = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, s);
    }
}
