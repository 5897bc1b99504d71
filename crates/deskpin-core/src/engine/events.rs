//! Change notifications emitted by the geometry engine.

use crate::layout::{WidgetId, ZPolicy};
use kurbo::{Point, Size};

/// Something the windowing layer needs to mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryEvent {
    /// A widget was created (added or restored).
    Added { id: WidgetId },
    /// A widget was destroyed.
    Removed { id: WidgetId },
    /// A widget's top-left corner changed.
    Moved { id: WidgetId, position: Point },
    /// A widget's size changed.
    Resized { id: WidgetId, size: Size },
    /// A widget's stacking intent changed.
    ZPolicyChanged { id: WidgetId, policy: ZPolicy },
    /// A widget's click-through flag changed.
    ClickThroughChanged { id: WidgetId, enabled: bool },
    /// A widget's settings blob changed; its content should be re-rendered.
    SettingsChanged { id: WidgetId },
}

impl GeometryEvent {
    /// The widget this event concerns.
    pub fn widget_id(&self) -> &str {
        match self {
            GeometryEvent::Added { id }
            | GeometryEvent::Removed { id }
            | GeometryEvent::Moved { id, .. }
            | GeometryEvent::Resized { id, .. }
            | GeometryEvent::ZPolicyChanged { id, .. }
            | GeometryEvent::ClickThroughChanged { id, .. }
            | GeometryEvent::SettingsChanged { id } => id,
        }
    }
}
