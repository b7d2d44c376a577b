//! Window registry: lifecycle, focus, z-order, and geometry clamping

use crate::error::DesktopError;
use crate::math::{Size, Vec2};
use crate::persistence::Snapshot;
use crate::position_cache::PositionCache;
use crate::viewport::Viewport;

use super::{Window, WindowConfig, WindowUpdate};

/// Default window size when the descriptor leaves it unspecified
pub const DEFAULT_SIZE: Size = Size {
    width: 540.0,
    height: 400.0,
};

/// Default origin when neither the cache nor the descriptor supplies one
pub const DEFAULT_POSITION: Vec2 = Vec2 { x: 100.0, y: 100.0 };

/// Margin kept on-screen so a window always retains a drag handle
pub const EDGE_MARGIN: f32 = 64.0;

/// Smallest size a resize may produce
pub const MIN_SIZE: Size = Size {
    width: 200.0,
    height: 150.0,
};

/// Window registry holding the ordered set of open windows.
///
/// Registry order is creation order; focus falls back to the last window in
/// that order when the active window closes.
#[derive(Clone, Debug, Default)]
pub struct WindowRegistry {
    windows: Vec<Window>,
    active_window_id: Option<String>,
    positions: PositionCache,
    viewport: Viewport,
}

/// Clamp a window origin so it stays within the drag-reachable region of
/// the viewport: `[0, vw - 64] x [0, vh - 64]`.
fn clamp_position(position: Vec2, viewport: &Viewport) -> Vec2 {
    let max_x = (viewport.width() - EDGE_MARGIN).max(0.0);
    let max_y = (viewport.height() - EDGE_MARGIN).max(0.0);
    Vec2::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
}

impl WindowRegistry {
    /// Create an empty registry with the default viewport
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given viewport
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Rebuild a registry from a persisted snapshot
    pub fn from_snapshot(mut snapshot: Snapshot, viewport: Viewport) -> Self {
        if snapshot.needs_migration() {
            snapshot.migrate();
        }
        Self {
            windows: snapshot.windows,
            active_window_id: snapshot.active_window_id,
            positions: snapshot.positions,
            viewport,
        }
    }

    /// Capture the registry state for persistence
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: Snapshot::CURRENT_VERSION,
            active_window_id: self.active_window_id.clone(),
            windows: self.windows.clone(),
            positions: self.positions.clone(),
        }
    }

    /// Create a window and focus it, returning its id.
    ///
    /// A descriptor without an id is a hard error. Creating an id that is
    /// already open focuses the existing window instead of duplicating it;
    /// its geometry is left untouched.
    pub fn create(&mut self, config: WindowConfig) -> Result<String, DesktopError> {
        if config.id.is_empty() {
            return Err(DesktopError::MissingWindowId);
        }
        if self.get(&config.id).is_some() {
            let id = config.id;
            self.focus(Some(id.as_str()));
            return Ok(id);
        }

        let z_index = self.next_z();
        let requested = config.position.unwrap_or(DEFAULT_POSITION);
        let start = self.positions.get(&config.id, requested);
        let position = clamp_position(start, &self.viewport);
        self.positions.set(&config.id, position);

        let window = Window {
            id: config.id.clone(),
            title: config.title,
            app_id: config.app_id,
            position,
            size: config.size.unwrap_or(DEFAULT_SIZE),
            prev_position: None,
            prev_size: None,
            z_index,
            maximized: false,
            minimized: false,
            no_resize: config.no_resize,
            no_controls: config.no_controls,
            file_path: config.file_path,
            picker: config.picker,
            selected_file: None,
        };
        self.windows.push(window);
        self.active_window_id = Some(config.id.clone());
        Ok(config.id)
    }

    /// Focus a window, bringing it to the top of the stack.
    ///
    /// `None` clears focus (click-outside-to-deselect). Focusing the window
    /// that is already active is a no-op and does not bump its z-order.
    pub fn focus(&mut self, id: Option<&str>) {
        let Some(id) = id else {
            self.active_window_id = None;
            return;
        };
        if self.active_window_id.as_deref() == Some(id) {
            return;
        }
        if !self.windows.iter().any(|w| w.id == id) {
            return;
        }
        let z_index = self.next_z();
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.z_index = z_index;
        }
        self.active_window_id = Some(id.to_string());
    }

    /// Close a window, caching its position for a later reopen.
    ///
    /// Focus falls to the last remaining window in registry order.
    pub fn close(&mut self, id: &str) {
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };
        let window = self.windows.remove(index);
        self.positions.set(&window.id, window.position);
        self.active_window_id = self.windows.last().map(|w| w.id.clone());
    }

    /// Maximize a window to the live viewport dimensions
    pub fn maximize(&mut self, id: &str) {
        let viewport_size = self.viewport.screen_size;
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.prev_position = Some(window.position);
            window.prev_size = Some(window.size);
            window.position = Vec2::ZERO;
            window.size = viewport_size;
            window.maximized = true;
        }
    }

    /// Restore a maximized window to its previous geometry.
    ///
    /// The position comes from the cache keyed by id, falling back to the
    /// geometry captured at maximize time, then the origin.
    pub fn restore(&mut self, id: &str) {
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };
        let (prev_position, prev_size) = {
            let window = &mut self.windows[index];
            (window.prev_position.take(), window.prev_size.take())
        };
        let position = self
            .positions
            .get(id, prev_position.unwrap_or(Vec2::ZERO));

        let window = &mut self.windows[index];
        if let Some(size) = prev_size {
            window.size = size;
        }
        window.position = position;
        window.maximized = false;
    }

    /// Minimize a window.
    ///
    /// The window stays in the registry; hiding it is the presentation
    /// layer's job.
    pub fn minimize(&mut self, id: &str) {
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };
        let current = self.windows[index].position;
        let position = self.positions.get(id, current);
        let window = &mut self.windows[index];
        window.minimized = true;
        window.position = position;
    }

    /// Move a window to an absolute position, or by a delta when `relative`.
    ///
    /// The result is clamped so the origin stays on-screen and is recorded
    /// in the position cache. The state write is skipped when the clamped
    /// position equals the current one.
    pub fn move_window(&mut self, id: &str, position: Vec2, relative: bool) {
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };
        let current = self.windows[index].position;
        let target = if relative { current + position } else { position };
        let clamped = clamp_position(target, &self.viewport);
        self.positions.set(id, clamped);
        if clamped == current {
            return;
        }
        self.windows[index].position = clamped;
    }

    /// Resize a window, optionally moving it in the same operation.
    ///
    /// The size is applied unconditionally (floored at [`MIN_SIZE`]); a
    /// supplied position is clamped and cached exactly like a move.
    pub fn resize(&mut self, id: &str, size: Size, new_position: Option<Vec2>) {
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };
        let width = size.width.max(MIN_SIZE.width);
        let height = size.height.max(MIN_SIZE.height);
        self.windows[index].size = Size::new(width, height);

        if let Some(position) = new_position {
            let clamped = clamp_position(position, &self.viewport);
            self.positions.set(id, clamped);
            self.windows[index].position = clamped;
        }
    }

    /// Shallow-merge a partial update into a window.
    ///
    /// A supplied position also updates the position cache.
    pub fn update(&mut self, id: &str, update: WindowUpdate) {
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };
        if let Some(position) = update.position {
            self.positions.set(id, position);
            self.windows[index].position = position;
        }
        let window = &mut self.windows[index];
        if let Some(title) = update.title {
            window.title = title;
        }
        if let Some(size) = update.size {
            window.size = size;
        }
        if let Some(file_path) = update.file_path {
            window.file_path = Some(file_path);
        }
        if let Some(selected_file) = update.selected_file {
            window.selected_file = Some(selected_file);
        }
        if let Some(picker) = update.picker {
            window.picker = Some(picker);
        }
    }

    /// All windows in registry (creation) order
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Get a window by id
    pub fn get(&self, id: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Currently focused window id, if any
    pub fn active_window_id(&self) -> Option<&str> {
        self.active_window_id.as_deref()
    }

    /// Whether the given window currently holds focus
    pub fn is_focused(&self, id: &str) -> bool {
        self.active_window_id.as_deref() == Some(id)
    }

    /// Windows sorted by z-order (back to front)
    pub fn windows_by_z(&self) -> Vec<&Window> {
        let mut windows: Vec<&Window> = self.windows.iter().collect();
        windows.sort_by_key(|w| w.z_index);
        windows
    }

    /// Number of open windows
    pub fn count(&self) -> usize {
        self.windows.len()
    }

    /// The live viewport
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Update the viewport dimensions (host resize events)
    pub fn set_screen_size(&mut self, size: Size) {
        self.viewport.set_screen_size(size);
    }

    /// The position cache
    pub fn positions(&self) -> &PositionCache {
        &self.positions
    }

    fn next_z(&self) -> i32 {
        self.windows.iter().map(|w| w.z_index).max().unwrap_or(-1) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str) -> WindowConfig {
        WindowConfig {
            id: id.to_string(),
            title: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_requires_id() {
        let mut registry = WindowRegistry::new();
        let err = registry.create(WindowConfig::default()).unwrap_err();
        assert_eq!(err, DesktopError::MissingWindowId);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_create_focuses_new_window() {
        let mut registry = WindowRegistry::new();
        let id = registry.create(config("files")).unwrap();
        assert_eq!(id, "files");
        assert!(registry.is_focused("files"));
        let window = registry.get("files").unwrap();
        assert_eq!(window.position, DEFAULT_POSITION);
        assert_eq!(window.size, DEFAULT_SIZE);
        assert_eq!(window.z_index, 0);
    }

    #[test]
    fn test_create_existing_id_is_idempotent_open() {
        let mut registry = WindowRegistry::new();
        registry
            .create(WindowConfig {
                position: Some(Vec2::new(300.0, 200.0)),
                ..config("a")
            })
            .unwrap();
        registry.create(config("b")).unwrap();
        assert!(registry.is_focused("b"));

        // A second create against "a" transfers focus; geometry is untouched.
        let id = registry
            .create(WindowConfig {
                position: Some(Vec2::new(900.0, 900.0)),
                ..config("a")
            })
            .unwrap();
        assert_eq!(id, "a");
        assert_eq!(registry.count(), 2);
        assert!(registry.is_focused("a"));
        assert_eq!(registry.get("a").unwrap().position, Vec2::new(300.0, 200.0));
    }

    #[test]
    fn test_z_order_monotonicity() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.create(config("b")).unwrap();
        registry.create(config("c")).unwrap();

        for id in ["a", "c", "b", "a"] {
            registry.focus(Some(id));
            let focused_z = registry.get(id).unwrap().z_index;
            let max_other = registry
                .windows()
                .iter()
                .filter(|w| w.id != id)
                .map(|w| w.z_index)
                .max()
                .unwrap();
            assert!(focused_z > max_other);
        }
    }

    #[test]
    fn test_focus_same_id_does_not_bump_z() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        let z_before = registry.get("a").unwrap().z_index;
        registry.focus(Some("a"));
        assert_eq!(registry.get("a").unwrap().z_index, z_before);
    }

    #[test]
    fn test_focus_none_clears_focus() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.focus(None);
        assert!(registry.active_window_id().is_none());
        assert!(!registry.is_focused("a"));
    }

    #[test]
    fn test_close_focuses_last_remaining() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.create(config("b")).unwrap();
        registry.create(config("c")).unwrap();

        registry.close("c");
        assert_eq!(registry.active_window_id(), Some("b"));
        registry.close("a");
        assert_eq!(registry.active_window_id(), Some("b"));
        registry.close("b");
        assert!(registry.active_window_id().is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_close_then_reopen_restores_position() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.move_window("a", Vec2::new(400.0, 300.0), false);
        registry.close("a");

        registry.create(config("a")).unwrap();
        assert_eq!(registry.get("a").unwrap().position, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_create_clamps_offscreen_position() {
        // 1920x1080 viewport: an origin of (5000, 5000) clamps to the
        // drag-reachable corner (1856, 1016).
        let mut registry = WindowRegistry::with_viewport(Viewport::new(1920.0, 1080.0));
        registry
            .create(WindowConfig {
                position: Some(Vec2::new(5000.0, 5000.0)),
                ..config("a")
            })
            .unwrap();
        assert_eq!(
            registry.get("a").unwrap().position,
            Vec2::new(1856.0, 1016.0)
        );
    }

    #[test]
    fn test_move_clamp_is_idempotent() {
        let mut registry = WindowRegistry::with_viewport(Viewport::new(1920.0, 1080.0));
        registry.create(config("a")).unwrap();

        registry.move_window("a", Vec2::new(-250.0, 9999.0), false);
        let first = registry.get("a").unwrap().position;
        assert_eq!(first, Vec2::new(0.0, 1016.0));

        // Re-applying the clamped value is a fixed point.
        registry.move_window("a", first, false);
        assert_eq!(registry.get("a").unwrap().position, first);
    }

    #[test]
    fn test_move_relative() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.move_window("a", Vec2::new(50.0, -20.0), true);
        assert_eq!(registry.get("a").unwrap().position, Vec2::new(150.0, 80.0));
        assert_eq!(
            registry.positions().peek("a"),
            Some(Vec2::new(150.0, 80.0))
        );
    }

    #[test]
    fn test_maximize_restore_round_trip() {
        let mut registry = WindowRegistry::with_viewport(Viewport::new(1920.0, 1080.0));
        registry
            .create(WindowConfig {
                position: Some(Vec2::new(250.0, 120.0)),
                size: Some(Size::new(640.0, 480.0)),
                ..config("a")
            })
            .unwrap();

        registry.maximize("a");
        {
            let window = registry.get("a").unwrap();
            assert!(window.maximized);
            assert_eq!(window.position, Vec2::ZERO);
            assert_eq!(window.size, Size::new(1920.0, 1080.0));
        }

        registry.restore("a");
        let window = registry.get("a").unwrap();
        assert!(!window.maximized);
        assert_eq!(window.position, Vec2::new(250.0, 120.0));
        assert_eq!(window.size, Size::new(640.0, 480.0));
    }

    #[test]
    fn test_minimize_keeps_window_in_registry() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.minimize("a");
        assert_eq!(registry.count(), 1);
        assert!(registry.get("a").unwrap().minimized);
    }

    #[test]
    fn test_resize_floors_at_min_size() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.resize("a", Size::new(10.0, 10.0), None);
        assert_eq!(registry.get("a").unwrap().size, MIN_SIZE);
    }

    #[test]
    fn test_resize_with_position_clamps_and_caches() {
        let mut registry = WindowRegistry::with_viewport(Viewport::new(1920.0, 1080.0));
        registry.create(config("a")).unwrap();
        registry.resize("a", Size::new(800.0, 600.0), Some(Vec2::new(-100.0, 50.0)));
        let window = registry.get("a").unwrap();
        assert_eq!(window.size, Size::new(800.0, 600.0));
        assert_eq!(window.position, Vec2::new(0.0, 50.0));
        assert_eq!(registry.positions().peek("a"), Some(Vec2::new(0.0, 50.0)));
    }

    #[test]
    fn test_update_merges_fields() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.update(
            "a",
            WindowUpdate {
                title: Some("Renamed".to_string()),
                selected_file: Some("/home/pic.png".to_string()),
                position: Some(Vec2::new(10.0, 10.0)),
                ..Default::default()
            },
        );
        let window = registry.get("a").unwrap();
        assert_eq!(window.title, "Renamed");
        assert_eq!(window.selected_file.as_deref(), Some("/home/pic.png"));
        assert_eq!(window.position, Vec2::new(10.0, 10.0));
        assert_eq!(registry.positions().peek("a"), Some(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_windows_by_z_back_to_front() {
        let mut registry = WindowRegistry::new();
        registry.create(config("a")).unwrap();
        registry.create(config("b")).unwrap();
        registry.focus(Some("a"));

        let order: Vec<&str> = registry.windows_by_z().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
