//! Snapshot serialization for desktop layout

use serde::{Deserialize, Serialize};

use crate::position_cache::PositionCache;
use crate::window::Window;

/// Snapshot of desktop layout for persistence
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version for migration support
    pub version: u32,
    /// Focused window id at capture time
    pub active_window_id: Option<String>,
    /// Open windows in registry order
    pub windows: Vec<Window>,
    /// Cached positions, including windows closed before the capture
    pub positions: PositionCache,
}

impl Snapshot {
    /// Current snapshot version
    pub const CURRENT_VERSION: u32 = 1;

    /// Check if the snapshot needs migration
    pub fn needs_migration(&self) -> bool {
        self.version < Self::CURRENT_VERSION
    }

    /// Migrate the snapshot to the current version
    pub fn migrate(&mut self) {
        // Add migration logic as versions increase
        self.version = Self::CURRENT_VERSION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::viewport::Viewport;
    use crate::window::{WindowConfig, WindowRegistry};

    #[test]
    fn test_snapshot_round_trip() {
        let mut registry = WindowRegistry::with_viewport(Viewport::new(1920.0, 1080.0));
        registry
            .create(WindowConfig {
                id: "files".to_string(),
                title: "Files".to_string(),
                ..Default::default()
            })
            .unwrap();
        registry.move_window("files", Vec2::new(320.0, 180.0), false);

        let json = serde_json::to_string(&registry.snapshot()).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        let registry = WindowRegistry::from_snapshot(restored, Viewport::new(1920.0, 1080.0));

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.active_window_id(), Some("files"));
        assert_eq!(
            registry.get("files").unwrap().position,
            Vec2::new(320.0, 180.0)
        );
        assert_eq!(
            registry.positions().peek("files"),
            Some(Vec2::new(320.0, 180.0))
        );
    }

    #[test]
    fn test_snapshot_keeps_closed_window_positions() {
        let mut registry = WindowRegistry::new();
        registry
            .create(WindowConfig {
                id: "term".to_string(),
                ..Default::default()
            })
            .unwrap();
        registry.move_window("term", Vec2::new(42.0, 42.0), false);
        registry.close("term");

        let snapshot = registry.snapshot();
        assert!(snapshot.windows.is_empty());
        assert_eq!(snapshot.positions.peek("term"), Some(Vec2::new(42.0, 42.0)));
    }

    #[test]
    fn test_snapshot_migration() {
        let mut snapshot = Snapshot {
            version: 0,
            ..Default::default()
        };
        assert!(snapshot.needs_migration());
        snapshot.migrate();
        assert!(!snapshot.needs_migration());
        assert_eq!(snapshot.version, Snapshot::CURRENT_VERSION);
    }
}
