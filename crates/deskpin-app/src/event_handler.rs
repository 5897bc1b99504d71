//! Pointer routing from native windows to engine gestures.

use deskpin_core::{GeometryEngine, WidgetId};
use kurbo::{Point, Size};
use std::collections::HashMap;

/// Side of the square bottom-right area that starts a resize, in pixels.
pub const DEFAULT_RESIZE_HANDLE: f64 = 16.0;

/// Which gesture a left press started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerGesture {
    Drag,
    Resize,
}

/// Last known pointer position over a widget window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    /// Relative to the window's top-left.
    local: Point,
    /// Absolute screen position.
    screen: Point,
}

/// Translates press/move/release on widget windows into engine gestures.
///
/// Only one gesture runs at a time. Moves are forwarded in screen
/// coordinates so a drag keeps tracking when the pointer outruns its window.
#[derive(Debug)]
pub struct EventHandler {
    resize_handle: f64,
    active: Option<(WidgetId, PointerGesture)>,
    cursors: HashMap<WidgetId, Cursor>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_HANDLE)
    }
}

impl EventHandler {
    /// Create a handler with the given resize-handle size.
    pub fn new(resize_handle: f64) -> Self {
        Self {
            resize_handle,
            active: None,
            cursors: HashMap::new(),
        }
    }

    /// The gesture in progress, if any.
    pub fn active(&self) -> Option<(&str, PointerGesture)> {
        self.active.as_ref().map(|(id, gesture)| (id.as_str(), *gesture))
    }

    /// Whether `local` falls in the resize corner of a window of `size`.
    pub fn in_resize_handle(&self, size: Size, local: Point) -> bool {
        local.x >= size.width - self.resize_handle
            && local.y >= size.height - self.resize_handle
            && local.x <= size.width
            && local.y <= size.height
    }

    /// Pointer moved over a widget window.
    pub fn cursor_moved(&mut self, engine: &mut GeometryEngine, id: &str, local: Point, screen: Point) {
        self.cursors.insert(id.to_string(), Cursor { local, screen });

        match &self.active {
            Some((active, PointerGesture::Drag)) => engine.update_drag(active, screen),
            Some((active, PointerGesture::Resize)) => engine.update_resize(active, screen),
            None => {}
        }
    }

    /// Left button pressed on a widget window.
    pub fn pointer_pressed(&mut self, engine: &mut GeometryEngine, id: &str) {
        if self.active.is_some() {
            return;
        }
        let Some(cursor) = self.cursors.get(id).copied() else {
            log::debug!("Press on widget {} before any cursor position", id);
            return;
        };
        let Some(handle) = engine.get(id) else {
            return;
        };

        let gesture = if self.in_resize_handle(handle.size, cursor.local) {
            engine.begin_resize(id, cursor.screen);
            PointerGesture::Resize
        } else {
            engine.begin_drag(id, cursor.screen);
            PointerGesture::Drag
        };
        self.active = Some((id.to_string(), gesture));
    }

    /// Left button released anywhere.
    pub fn pointer_released(&mut self, engine: &mut GeometryEngine) {
        match self.active.take() {
            Some((id, PointerGesture::Drag)) => engine.end_drag(&id),
            Some((id, PointerGesture::Resize)) => engine.end_resize(&id),
            None => {}
        }
    }

    /// Forget a closed widget.
    pub fn widget_closed(&mut self, id: &str) {
        self.cursors.remove(id);
        if self.active.as_ref().is_some_and(|(active, _)| active == id) {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskpin_core::{LayoutSnapshot, Monitor, WidgetRecord};
    use kurbo::Rect;

    fn engine() -> GeometryEngine {
        let mut engine = GeometryEngine::default();
        engine.set_monitors(vec![Monitor::new(Rect::new(0.0, 0.0, 1920.0, 1080.0))]);
        engine
            .restore(LayoutSnapshot {
                widgets: vec![WidgetRecord {
                    id: "a".into(),
                    kind: "clock".into(),
                    x: 100,
                    y: 100,
                    width: 200,
                    height: 150,
                    z_policy: Default::default(),
                    click_through: false,
                    settings: Default::default(),
                }],
            })
            .unwrap();
        engine
    }

    #[test]
    fn test_press_in_corner_resizes() {
        let mut engine = engine();
        let mut handler = EventHandler::default();

        handler.cursor_moved(&mut engine, "a", Point::new(195.0, 145.0), Point::new(295.0, 245.0));
        handler.pointer_pressed(&mut engine, "a");
        assert_eq!(handler.active(), Some(("a", PointerGesture::Resize)));

        handler.cursor_moved(&mut engine, "a", Point::new(245.0, 195.0), Point::new(345.0, 295.0));
        handler.pointer_released(&mut engine);

        assert_eq!(engine.get("a").unwrap().size, Size::new(250.0, 200.0));
        assert!(handler.active().is_none());
        assert!(engine.save_timer().is_pending());
    }

    #[test]
    fn test_press_elsewhere_drags() {
        let mut engine = engine();
        let mut handler = EventHandler::default();

        handler.cursor_moved(&mut engine, "a", Point::new(20.0, 20.0), Point::new(120.0, 120.0));
        handler.pointer_pressed(&mut engine, "a");
        assert_eq!(handler.active(), Some(("a", PointerGesture::Drag)));

        // The pointer outruns the window; screen coordinates still drive it.
        handler.cursor_moved(&mut engine, "other", Point::ZERO, Point::new(520.0, 420.0));
        handler.pointer_released(&mut engine);

        assert_eq!(engine.get("a").unwrap().position, Point::new(500.0, 400.0));
    }

    #[test]
    fn test_press_without_cursor_is_ignored() {
        let mut engine = engine();
        let mut handler = EventHandler::default();
        handler.pointer_pressed(&mut engine, "a");
        assert!(handler.active().is_none());
    }

    #[test]
    fn test_close_cancels_gesture() {
        let mut engine = engine();
        let mut handler = EventHandler::default();
        handler.cursor_moved(&mut engine, "a", Point::new(20.0, 20.0), Point::new(120.0, 120.0));
        handler.pointer_pressed(&mut engine, "a");

        engine.remove_widget("a");
        handler.widget_closed("a");
        assert!(handler.active().is_none());
    }

    #[test]
    fn test_resize_handle_bounds() {
        let handler = EventHandler::new(16.0);
        let size = Size::new(200.0, 150.0);
        assert!(handler.in_resize_handle(size, Point::new(184.0, 134.0)));
        assert!(!handler.in_resize_handle(size, Point::new(183.0, 140.0)));
        assert!(!handler.in_resize_handle(size, Point::new(100.0, 75.0)));
    }
}
