//! Deskpin Core Library
//!
//! Platform-agnostic geometry engine, layout persistence and widget kinds for
//! the Deskpin desktop widget overlay.

pub mod app_state;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod layout;
pub mod snap;
pub mod storage;
pub mod widget;
pub mod windowing;

pub use app_state::{ApplicationState, Notice};
pub use config::{EngineConfig, Preferences};
pub use debounce::Debouncer;
pub use engine::{EngineError, EngineResult, GeometryEngine, GeometryEvent};
pub use layout::{LayoutDocument, LayoutSnapshot, SizePreset, WidgetHandle, WidgetId, WidgetRecord, ZPolicy};
pub use snap::{Axis, SnapContext, SnapLine, SnapSource};
pub use storage::{
    FileStorage, LayoutStore, MemoryStorage, StorageError, StorageResult, BACKUP_SUFFIX,
    LAYOUT_FILE_NAME,
};
pub use widget::{Settings, SystemMonitorWidget, WidgetAction, WidgetBehavior, WidgetContent, WidgetKind};
pub use windowing::{Monitor, WindowingError, WindowingLayer, WindowingResult};
