//! Engine tuning and persisted user preferences.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Distance (in screen pixels) under which an edge is pulled onto a snap line.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 8.0;

/// Smallest width a widget can be resized to.
pub const MIN_WIDGET_WIDTH: f64 = 80.0;

/// Smallest height a widget can be resized to.
pub const MIN_WIDGET_HEIGHT: f64 = 60.0;

/// Largest width a widget can be resized to.
pub const MAX_WIDGET_WIDTH: f64 = 800.0;

/// Largest height a widget can be resized to.
pub const MAX_WIDGET_HEIGHT: f64 = 600.0;

/// Quiet period before a settled mutation is written to disk.
pub const DEFAULT_SAVE_DELAY_MS: u64 = 400;

/// Tunables for the geometry engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Whether drags and resizes snap to monitor and peer edges.
    pub snap_enabled: bool,
    /// Snap distance in pixels. An edge snaps when strictly closer than this.
    pub snap_threshold: f64,
    /// Resize floor, applied per axis before snapping.
    pub min_size: Size,
    /// Resize ceiling, applied per axis before snapping. `None` lifts it.
    pub max_size: Option<Size>,
    /// Debounce delay for layout persistence.
    pub save_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            min_size: Size::new(MIN_WIDGET_WIDTH, MIN_WIDGET_HEIGHT),
            max_size: Some(Size::new(MAX_WIDGET_WIDTH, MAX_WIDGET_HEIGHT)),
            save_delay: Duration::from_millis(DEFAULT_SAVE_DELAY_MS),
        }
    }
}

impl EngineConfig {
    /// The user-facing subset that is persisted with the layout.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            snap_enabled: self.snap_enabled,
            snap_threshold: self.snap_threshold.max(0.0).round() as u32,
        }
    }

    /// Overlay persisted preferences onto this config.
    pub fn apply_preferences(&mut self, preferences: &Preferences) {
        self.snap_enabled = preferences.snap_enabled;
        self.snap_threshold = f64::from(preferences.snap_threshold);
    }

    /// Clamp a candidate size into the configured floor and ceiling, per axis.
    pub fn clamp_size(&self, size: Size) -> Size {
        let mut width = size.width.max(self.min_size.width);
        let mut height = size.height.max(self.min_size.height);
        if let Some(max) = self.max_size {
            width = width.min(max.width.max(self.min_size.width));
            height = height.min(max.height.max(self.min_size.height));
        }
        Size::new(width, height)
    }
}

/// Preferences stored in the layout document next to the widget list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub snap_enabled: bool,
    pub snap_threshold: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        EngineConfig::default().preferences()
    }
}
