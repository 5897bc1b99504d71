//! In-progress pointer gestures.

use kurbo::{Point, Size, Vec2};

/// A drag or resize that has begun but not ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Gesture {
    /// Moving the widget. `offset` is pointer minus top-left at drag start.
    Drag { offset: Vec2 },
    /// Resizing from the bottom-right corner with the top-left anchored.
    Resize { start_pointer: Point, start_size: Size },
}

impl Gesture {
    pub(crate) fn is_drag(&self) -> bool {
        matches!(self, Gesture::Drag { .. })
    }

    pub(crate) fn is_resize(&self) -> bool {
        matches!(self, Gesture::Resize { .. })
    }
}
