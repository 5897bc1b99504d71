//! Widget handles and the persisted layout document.

use crate::config::Preferences;
use crate::widget::{Settings, WidgetKind};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a placed widget.
pub type WidgetId = String;

/// Position new widgets are placed at.
pub const DEFAULT_POSITION: Point = Point::new(100.0, 100.0);

/// Generate a short widget id (first 8 hex digits of a v4 UUID).
pub fn new_widget_id() -> WidgetId {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Desired window stacking behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZPolicy {
    /// Regular stacking.
    #[default]
    Normal,
    /// Stays above regular windows.
    AlwaysOnTop,
    /// Stays below regular windows, on the desktop layer.
    DesktopOnly,
}

impl ZPolicy {
    /// Cycle to the next policy.
    pub fn next(self) -> Self {
        match self {
            ZPolicy::Normal => ZPolicy::AlwaysOnTop,
            ZPolicy::AlwaysOnTop => ZPolicy::DesktopOnly,
            ZPolicy::DesktopOnly => ZPolicy::Normal,
        }
    }
}

/// Initial size choices offered by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizePreset {
    Small,
    #[default]
    Medium,
    Large,
    #[serde(rename = "xlarge")]
    XLarge,
}

impl SizePreset {
    /// Content size in pixels.
    pub fn size(self) -> Size {
        match self {
            SizePreset::Small => Size::new(160.0, 160.0),
            SizePreset::Medium => Size::new(220.0, 220.0),
            SizePreset::Large => Size::new(320.0, 280.0),
            SizePreset::XLarge => Size::new(480.0, 360.0),
        }
    }
}

/// Live state of one placed widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetHandle {
    pub id: WidgetId,
    pub kind: WidgetKind,
    /// Top-left corner in screen pixels.
    pub position: Point,
    pub size: Size,
    pub z_policy: ZPolicy,
    pub click_through: bool,
    /// Kind-specific settings, owned by the widget kind.
    pub settings: Settings,
}

impl WidgetHandle {
    /// Screen rectangle covered by the widget.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Convert to the persisted record form.
    pub fn to_record(&self) -> WidgetRecord {
        WidgetRecord {
            id: self.id.clone(),
            kind: self.kind.as_str().to_string(),
            x: self.position.x.round() as i32,
            y: self.position.y.round() as i32,
            width: self.size.width.round() as i32,
            height: self.size.height.round() as i32,
            z_policy: self.z_policy,
            click_through: self.click_through,
            settings: self.settings.clone(),
        }
    }
}

/// One widget as stored on disk.
///
/// The kind is kept as a string so that a layout written by a newer build
/// (with kinds this build does not know) still parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRecord {
    pub id: String,
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub z_policy: ZPolicy,
    #[serde(default)]
    pub click_through: bool,
    #[serde(default)]
    pub settings: Settings,
}

impl WidgetRecord {
    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    /// Size in pixels.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Ordered widget records, in creation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub widgets: Vec<WidgetRecord>,
}

impl LayoutSnapshot {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

/// The full on-disk document: widgets plus preferences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    #[serde(flatten)]
    pub layout: LayoutSnapshot,
    #[serde(default)]
    pub preferences: Preferences,
}

impl LayoutDocument {
    /// Create a document from a snapshot and preferences.
    pub fn new(layout: LayoutSnapshot, preferences: Preferences) -> Self {
        Self {
            layout,
            preferences,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
