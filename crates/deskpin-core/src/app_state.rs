//! Process-scoped application state.
//!
//! [`ApplicationState`] owns the geometry engine and the layout store. It is
//! created once at startup with [`ApplicationState::init`], which loads and
//! restores the saved layout, and torn down with
//! [`ApplicationState::shutdown`], which flushes anything unsaved.
//!
//! A saved layout that fails to load is backed up through the store before
//! anything new is written over it. If that backup fails, saving stays off
//! for the rest of the session.

use crate::config::EngineConfig;
use crate::engine::{GeometryEngine, GeometryEvent};
use crate::layout::LayoutDocument;
use crate::storage::{LayoutStore, StorageError, StorageResult};
use crate::widget::{SystemMonitorWidget, WidgetKind};
use crate::windowing::WindowingLayer;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Consecutive save attempts before the user is told.
pub const MAX_SAVE_ATTEMPTS: u32 = 2;

/// A non-fatal condition the shell should surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The layout could not be written; changes are kept in memory.
    PersistenceFailed { message: String },
    /// The saved layout could not be loaded; starting empty. `backed_up`
    /// tells whether a copy was kept before it can be overwritten.
    LayoutRejected { message: String, backed_up: bool },
}

/// Engine plus persistence, with explicit startup and teardown.
pub struct ApplicationState<S: LayoutStore> {
    engine: GeometryEngine,
    storage: Arc<S>,
    /// Consecutive failed saves in the current retry cycle.
    failed_attempts: u32,
    /// Whether the in-memory layout differs from what was last written.
    unsaved: bool,
    /// Set when a rejected layout could not be backed up.
    writes_blocked: bool,
    notices: Vec<Notice>,
}

impl<S: LayoutStore> ApplicationState<S> {
    /// Load the saved layout (if any) and build the engine from it.
    ///
    /// Saved preferences override the matching fields of `config`. A missing
    /// layout starts empty; an unreadable or invalid one starts empty, is
    /// backed up, and queues a [`Notice::LayoutRejected`].
    pub fn init(storage: Arc<S>, mut config: EngineConfig) -> Self {
        let mut rejected = None;

        let document = match storage.load() {
            Ok(document) => Some(document),
            Err(StorageError::NotFound(_)) => {
                log::info!("No saved layout, starting empty");
                None
            }
            Err(e) => {
                log::error!("Failed to load layout: {}", e);
                rejected = Some(e.to_string());
                None
            }
        };

        if let Some(document) = &document {
            config.apply_preferences(&document.preferences);
        }
        let mut engine = GeometryEngine::new(config);

        if let Some(document) = document {
            if let Err(e) = engine.restore(document.layout) {
                log::error!("Saved layout rejected: {}", e);
                rejected = Some(e.to_string());
            }
        }

        let mut notices = Vec::new();
        let mut writes_blocked = false;
        if let Some(message) = rejected {
            let backed_up = match storage.backup() {
                Ok(copied) => copied,
                Err(e) => {
                    log::error!("Could not back up rejected layout, saving disabled: {}", e);
                    writes_blocked = true;
                    false
                }
            };
            notices.push(Notice::LayoutRejected { message, backed_up });
        }

        Self {
            engine,
            storage,
            failed_attempts: 0,
            unsaved: false,
            writes_blocked,
            notices,
        }
    }

    /// Get the engine.
    pub fn engine(&self) -> &GeometryEngine {
        &self.engine
    }

    /// Get the engine mutably.
    pub fn engine_mut(&mut self) -> &mut GeometryEngine {
        &mut self.engine
    }

    /// Get the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Whether the last write attempt failed and nothing has succeeded since.
    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }

    /// When the event loop should next call [`tick`](Self::tick).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.save_timer().deadline()
    }

    /// Drain pending user notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The document that would be written now.
    pub fn document(&self) -> LayoutDocument {
        LayoutDocument::new(self.engine.snapshot(), self.engine.config().preferences())
    }

    /// Run a due save. Returns true if the layout was written.
    ///
    /// A failed write is retried once on the next debounce cycle; a second
    /// consecutive failure queues a [`Notice::PersistenceFailed`].
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.engine.take_due_save(now) {
            return false;
        }

        match self.write() {
            Ok(()) => true,
            Err(e) => {
                self.failed_attempts += 1;
                if self.failed_attempts < MAX_SAVE_ATTEMPTS {
                    log::warn!("Saving layout failed, will retry: {}", e);
                    self.engine.request_save_at(now);
                } else {
                    log::error!("Saving layout failed: {}", e);
                    self.failed_attempts = 0;
                    self.notices.push(Notice::PersistenceFailed {
                        message: e.to_string(),
                    });
                }
                false
            }
        }
    }

    /// Write now, dropping any pending debounced save.
    pub fn flush(&mut self) -> StorageResult<()> {
        self.engine.cancel_pending_save();
        self.write()
    }

    /// Cancel the timer and flush if anything is unwritten.
    pub fn shutdown(&mut self) -> StorageResult<()> {
        let pending = self.engine.cancel_pending_save();
        if !pending && !self.unsaved {
            return Ok(());
        }
        log::info!("Flushing layout before exit");
        self.write()
    }

    /// Re-read display bounds from the windowing layer.
    pub fn refresh_monitors(&mut self, layer: &dyn WindowingLayer) {
        self.engine.set_monitors(layer.monitors());
    }

    /// Mirror engine changes onto native windows. Windowing errors are
    /// logged and otherwise ignored.
    pub fn sync_windows(&mut self, layer: &mut dyn WindowingLayer) {
        for event in self.engine.take_events() {
            let result = match &event {
                GeometryEvent::Added { id } => match self.engine.get(id) {
                    Some(handle) => {
                        let content = self.engine.render(id).unwrap_or_default();
                        layer.create_window(handle, &content)
                    }
                    // Added and removed within one batch.
                    None => Ok(()),
                },
                GeometryEvent::Removed { id } => layer.destroy_window(id),
                GeometryEvent::Moved { id, position } => layer.move_window(id, *position),
                GeometryEvent::Resized { id, size } => layer.resize_window(id, *size),
                GeometryEvent::ZPolicyChanged { id, policy } => layer.apply_z_policy(id, *policy),
                GeometryEvent::ClickThroughChanged { id, enabled } => {
                    layer.apply_click_through(id, *enabled)
                }
                GeometryEvent::SettingsChanged { id } => match self.engine.render(id) {
                    Some(content) => layer.update_content(id, &content),
                    None => Ok(()),
                },
            };
            if let Err(e) = result {
                log::warn!("Window update for {} failed: {}", event.widget_id(), e);
            }
        }
    }

    /// Advance timers by `elapsed`. Returns how many widgets changed.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        self.engine.advance(elapsed)
    }

    /// Push one system poll into every system monitor widget. Geometry and
    /// the save timer are left alone. Returns how many widgets were updated.
    pub fn apply_system_readings(&mut self, cpu_percent: f64, memory_percent: f64) -> usize {
        let ids: Vec<_> = self
            .engine
            .widgets()
            .filter(|handle| handle.kind == WidgetKind::SystemMonitor)
            .map(|handle| handle.id.clone())
            .collect();
        for id in &ids {
            self.engine
                .refresh_settings(id, SystemMonitorWidget::readings(cpu_percent, memory_percent));
        }
        ids.len()
    }

    /// Whether any widget needs system readings.
    pub fn wants_system_readings(&self) -> bool {
        self.engine
            .widgets()
            .any(|handle| handle.kind == WidgetKind::SystemMonitor)
    }

    /// Re-render every widget (e.g. once a second for clocks and timers).
    pub fn refresh_content(&self, layer: &mut dyn WindowingLayer) {
        for handle in self.engine.widgets() {
            let Some(content) = self.engine.render(&handle.id) else {
                continue;
            };
            if let Err(e) = layer.update_content(&handle.id, &content) {
                log::debug!("Content refresh for {} failed: {}", handle.id, e);
            }
        }
    }

    fn write(&mut self) -> StorageResult<()> {
        if self.writes_blocked {
            self.unsaved = true;
            return Err(StorageError::Other(
                "saving is disabled because the rejected layout could not be backed up".to_string(),
            ));
        }
        match self.storage.save(&self.document()) {
            Ok(()) => {
                self.failed_attempts = 0;
                self.unsaved = false;
                Ok(())
            }
            Err(e) => {
                self.unsaved = true;
                Err(e)
            }
        }
    }
}
