//! Deskpin Application
//!
//! The native shell: one borderless window per widget, pointer and keyboard
//! routing, and the winit implementation of the windowing layer.

mod app;
mod event_handler;
mod shortcuts;
mod system;
mod windows;

pub use app::{App, AppConfig, AppError, LAYOUT_PATH_ENV};
pub use event_handler::{EventHandler, PointerGesture, DEFAULT_RESIZE_HANDLE};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
pub use system::{SystemPoller, SystemReadings};
pub use windows::{window_level, NativeWindows, WindowRegistry};
