//! Geometry engine: live widget geometry, pointer gestures and snapping.
//!
//! The engine is driven synchronously from the UI event loop. Pointer moves
//! update live geometry without touching disk; settled mutations (drag or
//! resize release, menu actions) schedule a debounced save that the owner
//! polls via [`GeometryEngine::take_due_save`].
//!
//! Operations on unknown widget ids are no-ops. Drag and resize callbacks can
//! race with a close, so a missing widget is logged and otherwise ignored.

mod events;
mod gesture;


pub use events::GeometryEvent;

use crate::config::EngineConfig;
use crate::debounce::Debouncer;
use crate::layout::{
    new_widget_id, LayoutSnapshot, SizePreset, WidgetHandle, WidgetId, ZPolicy, DEFAULT_POSITION,
};
use crate::snap::SnapContext;
use crate::widget::{Settings, WidgetAction, WidgetBehavior, WidgetContent, WidgetKind};
use crate::windowing::Monitor;
use gesture::Gesture;
use kurbo::{Point, Rect, Size};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Widget not found: {0}")]
    NotFound(WidgetId),
    #[error("Invalid layout: {0}")]
    Validation(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// A placed widget with its behavior and transient UI state.
#[derive(Debug)]
struct LiveWidget {
    handle: WidgetHandle,
    behavior: Box<dyn WidgetBehavior>,
    /// Hidden widgets contribute no snap lines.
    visible: bool,
    gesture: Option<Gesture>,
}

/// Owns every widget's geometry and turns pointer input into committed
/// positions and sizes.
#[derive(Debug)]
pub struct GeometryEngine {
    config: EngineConfig,
    /// Widgets in creation order.
    widgets: Vec<LiveWidget>,
    monitors: Vec<Monitor>,
    events: Vec<GeometryEvent>,
    save_timer: Debouncer,
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GeometryEngine {
    /// Create an empty engine.
    pub fn new(config: EngineConfig) -> Self {
        let save_timer = Debouncer::new(config.save_delay);
        Self {
            config,
            widgets: Vec::new(),
            monitors: Vec::new(),
            events: Vec::new(),
            save_timer,
        }
    }

    /// Get the active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration (e.g. snap toggle from the settings page).
    pub fn set_config(&mut self, config: EngineConfig) {
        if config == self.config {
            return;
        }
        self.save_timer.set_delay(config.save_delay);
        self.config = config;
        self.request_save();
    }

    /// Known displays.
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Update display bounds after enumeration or reconfiguration.
    /// Existing widgets are not moved; they are clamped on their next drag.
    pub fn set_monitors(&mut self, monitors: Vec<Monitor>) {
        log::debug!("Monitors updated: {} connected", monitors.len());
        self.monitors = monitors;
    }

    /// All widgets in creation order.
    pub fn widgets(&self) -> impl Iterator<Item = &WidgetHandle> {
        self.widgets.iter().map(|w| &w.handle)
    }

    /// Get a widget by id.
    pub fn get(&self, id: &str) -> Option<&WidgetHandle> {
        self.find(id).map(|w| &w.handle)
    }

    /// Number of widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether there are no widgets.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Whether a widget contributes snap lines.
    pub fn is_visible(&self, id: &str) -> bool {
        self.find(id).is_some_and(|w| w.visible)
    }

    /// Show or hide a widget for snapping purposes.
    pub fn set_visible(&mut self, id: &str, visible: bool) {
        match self.find_mut(id) {
            Some(widget) => widget.visible = visible,
            None => log::debug!("set_visible: unknown widget {}", id),
        }
    }

    /// Whether a drag or resize is in progress on a widget.
    pub fn is_gesture_active(&self, id: &str) -> bool {
        self.find(id).is_some_and(|w| w.gesture.is_some())
    }

    // --- Lifecycle ---

    /// Add a widget at the default position. Returns its id.
    pub fn add_widget(&mut self, kind: WidgetKind, preset: SizePreset) -> WidgetId {
        let id = self.unique_id();
        let behavior = kind.instantiate(&Settings::new());
        let handle = WidgetHandle {
            id: id.clone(),
            kind,
            position: DEFAULT_POSITION,
            size: preset.size(),
            z_policy: ZPolicy::default(),
            click_through: false,
            settings: behavior.serialize_settings(),
        };
        self.widgets.push(LiveWidget {
            handle,
            behavior,
            visible: true,
            gesture: None,
        });
        log::info!("Added {} widget {}", kind, id);
        self.events.push(GeometryEvent::Added { id: id.clone() });
        self.request_save();
        id
    }

    /// Close a widget. Returns whether it existed.
    pub fn remove_widget(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            log::debug!("remove_widget: unknown widget {}", id);
            return false;
        };
        let widget = self.widgets.remove(index);
        log::info!("Removed widget {}", id);
        self.events.push(GeometryEvent::Removed { id: widget.handle.id });
        self.request_save();
        true
    }

    /// Close every widget.
    pub fn clear(&mut self) {
        if self.widgets.is_empty() {
            return;
        }
        for widget in self.widgets.drain(..) {
            self.events.push(GeometryEvent::Removed { id: widget.handle.id });
        }
        log::info!("Closed all widgets");
        self.request_save();
    }

    // --- Drag ---

    /// Start dragging. Ignored if the widget is unknown or already busy.
    pub fn begin_drag(&mut self, id: &str, pointer: Point) {
        let Some(widget) = self.find_mut(id) else {
            log::debug!("begin_drag: unknown widget {}", id);
            return;
        };
        if widget.gesture.is_some() {
            log::debug!("begin_drag: widget {} already in a gesture", id);
            return;
        }
        widget.gesture = Some(Gesture::Drag {
            offset: pointer - widget.handle.position,
        });
    }

    /// Move a dragged widget under the pointer, snapping each axis.
    pub fn update_drag(&mut self, id: &str, pointer: Point) {
        let Some(index) = self.index_of(id) else {
            log::debug!("update_drag: unknown widget {}", id);
            return;
        };
        let widget = &self.widgets[index];
        let Some(Gesture::Drag { offset }) = widget.gesture else {
            log::debug!("update_drag: widget {} is not being dragged", id);
            return;
        };

        let candidate = round_point(pointer - offset);
        let rect = Rect::from_origin_size(candidate, widget.handle.size);
        let snapped = if self.config.snap_enabled {
            self.snap_context(index).snap_position(rect).rect
        } else {
            rect
        };
        let position = self.clamp_to_displays(snapped).origin();
        self.set_position(index, position);
    }

    /// Finish a drag and schedule a save.
    pub fn end_drag(&mut self, id: &str) {
        self.end_gesture(id, Gesture::is_drag, "end_drag");
    }

    // --- Resize ---

    /// Start resizing from the bottom-right corner. Ignored if the widget is
    /// unknown or already busy.
    pub fn begin_resize(&mut self, id: &str, pointer: Point) {
        let Some(widget) = self.find_mut(id) else {
            log::debug!("begin_resize: unknown widget {}", id);
            return;
        };
        if widget.gesture.is_some() {
            log::debug!("begin_resize: widget {} already in a gesture", id);
            return;
        }
        widget.gesture = Some(Gesture::Resize {
            start_pointer: pointer,
            start_size: widget.handle.size,
        });
    }

    /// Resize under the pointer. The floor (and ceiling) apply before the
    /// bottom-right corner snaps.
    pub fn update_resize(&mut self, id: &str, pointer: Point) {
        let Some(index) = self.index_of(id) else {
            log::debug!("update_resize: unknown widget {}", id);
            return;
        };
        let widget = &self.widgets[index];
        let Some(Gesture::Resize {
            start_pointer,
            start_size,
        }) = widget.gesture
        else {
            log::debug!("update_resize: widget {} is not being resized", id);
            return;
        };

        let delta = pointer - start_pointer;
        let candidate = self.config.clamp_size(round_size(Size::new(
            start_size.width + delta.x,
            start_size.height + delta.y,
        )));
        let rect = Rect::from_origin_size(widget.handle.position, candidate);
        let size = if self.config.snap_enabled {
            let min = self.config.min_size;
            let snapped = self.snap_context(index).snap_corner(rect, min.width, min.height);
            self.config.clamp_size(snapped.rect.size())
        } else {
            candidate
        };
        self.set_size(index, size);
    }

    /// Finish a resize and schedule a save.
    pub fn end_resize(&mut self, id: &str) {
        self.end_gesture(id, Gesture::is_resize, "end_resize");
    }

    // --- Window flags ---

    /// Record a stacking intent.
    pub fn set_z_policy(&mut self, id: &str, policy: ZPolicy) {
        let Some(widget) = self.find_mut(id) else {
            log::debug!("set_z_policy: unknown widget {}", id);
            return;
        };
        if widget.handle.z_policy == policy {
            return;
        }
        widget.handle.z_policy = policy;
        let id = widget.handle.id.clone();
        self.events.push(GeometryEvent::ZPolicyChanged { id, policy });
        self.request_save();
    }

    /// Record a click-through flag.
    pub fn set_click_through(&mut self, id: &str, enabled: bool) {
        let Some(widget) = self.find_mut(id) else {
            log::debug!("set_click_through: unknown widget {}", id);
            return;
        };
        if widget.handle.click_through == enabled {
            return;
        }
        widget.handle.click_through = enabled;
        let id = widget.handle.id.clone();
        self.events.push(GeometryEvent::ClickThroughChanged { id, enabled });
        self.request_save();
    }

    /// Turn click-through off everywhere. Returns how many widgets changed.
    pub fn clear_all_click_through(&mut self) -> usize {
        let mut count = 0;
        for widget in &mut self.widgets {
            if widget.handle.click_through {
                widget.handle.click_through = false;
                self.events.push(GeometryEvent::ClickThroughChanged {
                    id: widget.handle.id.clone(),
                    enabled: false,
                });
                count += 1;
            }
        }
        if count > 0 {
            log::info!("Disabled click-through on {} widget(s)", count);
            self.request_save();
        }
        count
    }

    // --- Settings and content ---

    /// Replace a widget's settings blob. Geometry is never touched.
    pub fn set_settings(&mut self, id: &str, settings: Settings) {
        if self.apply_settings(id, &settings) {
            self.request_save();
        }
    }

    /// Push transient readings (e.g. from a system poller) into a widget.
    ///
    /// Routes like [`set_settings`](Self::set_settings) but does not schedule
    /// a save; the readings ride along with the next settled mutation.
    pub fn refresh_settings(&mut self, id: &str, settings: Settings) {
        self.apply_settings(id, &settings);
    }

    /// Run a content command on one widget. Returns false if the widget is
    /// unknown or its kind ignores the action.
    pub fn perform(&mut self, id: &str, action: WidgetAction) -> bool {
        let Some(widget) = self.find_mut(id) else {
            log::debug!("perform: unknown widget {}", id);
            return false;
        };
        if !widget.behavior.perform(action) {
            return false;
        }
        if self.sync_settings(id) {
            self.request_save();
        }
        true
    }

    /// Advance time-driven widgets. Returns how many changed.
    ///
    /// Called on every content refresh; does not schedule a save.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let mut changed = 0;
        for widget in &mut self.widgets {
            if !widget.behavior.tick(elapsed) {
                continue;
            }
            widget.handle.settings = widget.behavior.serialize_settings();
            self.events.push(GeometryEvent::SettingsChanged {
                id: widget.handle.id.clone(),
            });
            changed += 1;
        }
        changed
    }

    /// Describe what a widget shows.
    pub fn render(&self, id: &str) -> Option<WidgetContent> {
        self.find(id).map(|w| w.behavior.render())
    }

    // --- Persistence ---

    /// Replace all widgets from a persisted snapshot.
    ///
    /// Duplicate ids or negative sizes reject the whole snapshot and leave the
    /// current widgets untouched. Records with unknown kinds are skipped.
    /// Returns the number of widgets loaded.
    pub fn restore(&mut self, snapshot: LayoutSnapshot) -> EngineResult<usize> {
        validate_snapshot(&snapshot)?;

        let mut restored = Vec::with_capacity(snapshot.widgets.len());
        for record in snapshot.widgets {
            let kind = match record.kind.parse::<WidgetKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    log::warn!("Skipping widget {} while restoring: {}", record.id, e);
                    continue;
                }
            };
            let behavior = kind.instantiate(&record.settings);
            let handle = WidgetHandle {
                position: record.position(),
                size: record.size(),
                id: record.id,
                kind,
                z_policy: record.z_policy,
                click_through: record.click_through,
                settings: behavior.serialize_settings(),
            };
            restored.push(LiveWidget {
                handle,
                behavior,
                visible: true,
                gesture: None,
            });
        }

        for widget in self.widgets.drain(..) {
            self.events.push(GeometryEvent::Removed { id: widget.handle.id });
        }
        for widget in &restored {
            self.events.push(GeometryEvent::Added {
                id: widget.handle.id.clone(),
            });
        }
        self.widgets = restored;

        log::info!("Restored {} widget(s)", self.widgets.len());
        Ok(self.widgets.len())
    }

    /// Current layout in creation order.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            widgets: self.widgets.iter().map(|w| w.handle.to_record()).collect(),
        }
    }

    /// Drain pending change notifications.
    pub fn take_events(&mut self) -> Vec<GeometryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Schedule (or push back) a debounced save.
    pub fn request_save(&mut self) {
        self.save_timer.schedule();
    }

    /// Schedule (or push back) a debounced save relative to `now`.
    pub fn request_save_at(&mut self, now: Instant) {
        self.save_timer.schedule_at(now);
    }

    /// The debounced save timer.
    pub fn save_timer(&self) -> &Debouncer {
        &self.save_timer
    }

    /// Consume a due save. Returns true when the owner should persist now.
    pub fn take_due_save(&mut self, now: Instant) -> bool {
        self.save_timer.fire(now)
    }

    /// Drop a pending save. Returns whether one was pending.
    pub fn cancel_pending_save(&mut self) -> bool {
        self.save_timer.cancel()
    }

    // --- Internals ---

    fn apply_settings(&mut self, id: &str, settings: &Settings) -> bool {
        let Some(widget) = self.find_mut(id) else {
            log::debug!("set_settings: unknown widget {}", id);
            return false;
        };
        widget.behavior.on_settings_changed(settings);
        self.sync_settings(id)
    }

    /// Copy the behavior's settings onto the handle, emitting on change.
    fn sync_settings(&mut self, id: &str) -> bool {
        let Some(widget) = self.find_mut(id) else {
            return false;
        };
        let normalized = widget.behavior.serialize_settings();
        if normalized == widget.handle.settings {
            return false;
        }
        widget.handle.settings = normalized;
        let id = widget.handle.id.clone();
        self.events.push(GeometryEvent::SettingsChanged { id });
        true
    }

    fn find(&self, id: &str) -> Option<&LiveWidget> {
        self.widgets.iter().find(|w| w.handle.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut LiveWidget> {
        self.widgets.iter_mut().find(|w| w.handle.id == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.widgets.iter().position(|w| w.handle.id == id)
    }

    fn unique_id(&self) -> WidgetId {
        loop {
            let id = new_widget_id();
            if self.find(&id).is_none() {
                return id;
            }
        }
    }

    fn end_gesture(&mut self, id: &str, matches: fn(&Gesture) -> bool, op: &str) {
        let Some(widget) = self.find_mut(id) else {
            log::debug!("{}: unknown widget {}", op, id);
            return;
        };
        if !widget.gesture.as_ref().is_some_and(matches) {
            log::debug!("{}: no matching gesture on widget {}", op, id);
            return;
        }
        widget.gesture = None;
        self.request_save();
    }

    /// Snap lines from monitors and every other visible widget.
    fn snap_context(&self, moving: usize) -> SnapContext {
        let peers = self
            .widgets
            .iter()
            .enumerate()
            .filter(|(index, w)| *index != moving && w.visible)
            .map(|(_, w)| (&w.handle.id, w.handle.bounds()));
        SnapContext::build(self.config.snap_threshold, &self.monitors, peers)
    }

    /// Bounding box of all monitors.
    fn display_union(&self) -> Option<Rect> {
        self.monitors.iter().map(|m| m.bounds).reduce(|a, b| a.union(b))
    }

    /// Keep a rectangle inside the display union. Oversized rectangles are
    /// pinned to the union's top-left.
    fn clamp_to_displays(&self, rect: Rect) -> Rect {
        let Some(union) = self.display_union() else {
            return rect;
        };
        let x = clamp_axis(rect.x0, rect.width(), union.x0, union.x1);
        let y = clamp_axis(rect.y0, rect.height(), union.y0, union.y1);
        Rect::from_origin_size(Point::new(x, y), rect.size())
    }

    fn set_position(&mut self, index: usize, position: Point) {
        let handle = &mut self.widgets[index].handle;
        if handle.position == position {
            return;
        }
        handle.position = position;
        self.events.push(GeometryEvent::Moved {
            id: handle.id.clone(),
            position,
        });
    }

    fn set_size(&mut self, index: usize, size: Size) {
        let handle = &mut self.widgets[index].handle;
        if handle.size == size {
            return;
        }
        handle.size = size;
        self.events.push(GeometryEvent::Resized {
            id: handle.id.clone(),
            size,
        });
    }
}

/// Structural checks a persisted snapshot must pass before anything loads.
pub fn validate_snapshot(snapshot: &LayoutSnapshot) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for record in &snapshot.widgets {
        if record.id.is_empty() {
            return Err(EngineError::Validation("widget with empty id".to_string()));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(EngineError::Validation(format!(
                "duplicate widget id {:?}",
                record.id
            )));
        }
        if record.width < 0 || record.height < 0 {
            return Err(EngineError::Validation(format!(
                "widget {:?} has negative size {}x{}",
                record.id, record.width, record.height
            )));
        }
    }
    Ok(())
}

fn clamp_axis(start: f64, length: f64, min: f64, max: f64) -> f64 {
    if length >= max - min {
        min
    } else {
        start.clamp(min, max - length)
    }
}

fn round_point(point: Point) -> Point {
    Point::new(point.x.round(), point.y.round())
}

fn round_size(size: Size) -> Size {
    Size::new(size.width.round(), size.height.round())
}
