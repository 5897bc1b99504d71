//! Interface to the native windowing layer.
//!
//! The engine only records intent (position, size, z-policy, click-through).
//! A [`WindowingLayer`] turns that intent into OS window state.

use crate::layout::{WidgetHandle, ZPolicy};
use crate::widget::WidgetContent;
use kurbo::{Point, Rect, Size};
use thiserror::Error;

/// A connected display.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    /// Display rectangle in screen pixels.
    pub bounds: Rect,
    /// Name reported by the OS, if any.
    pub name: Option<String>,
}

impl Monitor {
    /// Create an unnamed monitor.
    pub fn new(bounds: Rect) -> Self {
        Self { bounds, name: None }
    }

    /// Attach a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Windowing errors.
#[derive(Debug, Error)]
pub enum WindowingError {
    #[error("No native window for widget {0}")]
    MissingWindow(String),
    #[error("Window creation failed: {0}")]
    Create(String),
    #[error("Operation not supported on this platform: {0}")]
    NotSupported(String),
}

/// Result type for windowing operations.
pub type WindowingResult<T> = Result<T, WindowingError>;

/// Native window operations the shell provides.
pub trait WindowingLayer {
    /// Enumerate connected displays.
    fn monitors(&self) -> Vec<Monitor>;

    /// Create a window for a widget at its current geometry and z-policy.
    fn create_window(&mut self, handle: &WidgetHandle, content: &WidgetContent) -> WindowingResult<()>;

    /// Move a window's top-left corner.
    fn move_window(&mut self, id: &str, position: Point) -> WindowingResult<()>;

    /// Resize a window.
    fn resize_window(&mut self, id: &str, size: Size) -> WindowingResult<()>;

    /// Destroy a window.
    fn destroy_window(&mut self, id: &str) -> WindowingResult<()>;

    /// Apply a stacking policy.
    fn apply_z_policy(&mut self, id: &str, policy: ZPolicy) -> WindowingResult<()>;

    /// Let pointer events pass through (or stop passing through).
    fn apply_click_through(&mut self, id: &str, enabled: bool) -> WindowingResult<()>;

    /// Refresh what a window shows.
    fn update_content(&mut self, id: &str, content: &WidgetContent) -> WindowingResult<()>;
}
