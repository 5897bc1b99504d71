//! Widget kinds and their content behavior.
//!
//! Every placed widget has a [`WidgetKind`] tag and a boxed
//! [`WidgetBehavior`] built from it. The geometry engine only talks to the
//! behavior through the trait:
//! - `render` describes what the widget currently shows
//! - `on_settings_changed` applies a new settings blob
//! - `serialize_settings` produces the blob that gets persisted
//! - `tick` and `perform` drive time-based state and user commands
//!
//! Widgets own their settings; the engine treats them as opaque.

mod kinds;

pub use kinds::{ClockWidget, ImageWidget, NotesWidget, SystemMonitorWidget, TimerWidget, WebWidget};

use crate::layout::SizePreset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Opaque, kind-specific settings.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Text description of what a widget shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl WidgetContent {
    /// Create content with a title and body lines.
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// One-line form (e.g. for a native window title).
    pub fn summary(&self) -> String {
        match self.lines.first() {
            Some(first) => format!("{} - {}", self.title, first),
            None => self.title.clone(),
        }
    }
}

/// Capability interface implemented by every widget kind.
pub trait WidgetBehavior: fmt::Debug {
    /// Describe the current content.
    fn render(&self) -> WidgetContent;

    /// Apply a new settings blob. Missing or ill-typed fields fall back to
    /// defaults.
    fn on_settings_changed(&mut self, settings: &Settings);

    /// Produce the settings blob to persist.
    fn serialize_settings(&self) -> Settings;

    /// Advance time-driven state by `elapsed`. Returns true if the
    /// serialized settings changed.
    fn tick(&mut self, _elapsed: Duration) -> bool {
        false
    }

    /// Apply a user command. Returns false if this kind ignores it.
    fn perform(&mut self, _action: WidgetAction) -> bool {
        false
    }
}

/// A user command aimed at one widget's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    /// Start a paused timer or pause a running one.
    ToggleTimer,
    /// Stop a timer and zero it.
    ResetTimer,
}

/// Available widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Clock,
    SystemMonitor,
    Timer,
    Notes,
    Image,
    Web,
}

/// A persisted kind name this build does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown widget kind: {0}")]
pub struct UnknownKind(pub String);

impl WidgetKind {
    /// Every kind, in manager menu order.
    pub const ALL: [WidgetKind; 6] = [
        WidgetKind::Clock,
        WidgetKind::SystemMonitor,
        WidgetKind::Timer,
        WidgetKind::Notes,
        WidgetKind::Image,
        WidgetKind::Web,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Clock => "clock",
            WidgetKind::SystemMonitor => "system-monitor",
            WidgetKind::Timer => "timer",
            WidgetKind::Notes => "notes",
            WidgetKind::Image => "image",
            WidgetKind::Web => "web",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            WidgetKind::Clock => "Clock",
            WidgetKind::SystemMonitor => "System Monitor",
            WidgetKind::Timer => "Timer",
            WidgetKind::Notes => "Notes",
            WidgetKind::Image => "Image",
            WidgetKind::Web => "Web",
        }
    }

    /// Size a freshly added widget of this kind gets.
    pub fn default_preset(self) -> SizePreset {
        match self {
            WidgetKind::Web => SizePreset::XLarge,
            _ => SizePreset::Medium,
        }
    }

    /// Build the behavior for this kind and apply `settings` to it.
    pub fn instantiate(self, settings: &Settings) -> Box<dyn WidgetBehavior> {
        let mut behavior: Box<dyn WidgetBehavior> = match self {
            WidgetKind::Clock => Box::new(ClockWidget::default()),
            WidgetKind::SystemMonitor => Box::new(SystemMonitorWidget::default()),
            WidgetKind::Timer => Box::new(TimerWidget::default()),
            WidgetKind::Notes => Box::new(NotesWidget::default()),
            WidgetKind::Image => Box::new(ImageWidget::default()),
            WidgetKind::Web => Box::new(WebWidget::default()),
        };
        behavior.on_settings_changed(settings);
        behavior
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
