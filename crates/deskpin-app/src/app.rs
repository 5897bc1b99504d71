//! Core application state and lifecycle.

use deskpin_core::{
    ApplicationState, EngineConfig, FileStorage, Notice, StorageError, WidgetAction, WidgetKind,
};
use kurbo::Point;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState};
use winit::window::WindowId;

use crate::event_handler::{EventHandler, DEFAULT_RESIZE_HANDLE};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::system::SystemPoller;
use crate::windows::{NativeWindows, WindowRegistry};

/// Environment variable overriding the layout file location.
pub const LAYOUT_PATH_ENV: &str = "DESKPIN_LAYOUT";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Layout file; `None` uses the platform data directory.
    pub layout_path: Option<PathBuf>,
    /// Side of the bottom-right resize area in pixels.
    pub resize_handle: f64,
    /// How often widget content is re-rendered, timers advance and system
    /// readings are polled.
    pub refresh_interval: Duration,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            layout_path: None,
            resize_handle: DEFAULT_RESIZE_HANDLE,
            refresh_interval: Duration::from_secs(1),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults plus overrides from the environment.
    pub fn from_env() -> Self {
        Self {
            layout_path: std::env::var_os(LAYOUT_PATH_ENV)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            ..Self::default()
        }
    }
}

/// Errors that stop the application from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Layout storage unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("Event loop error: {0}")]
    EventLoop(#[from] EventLoopError),
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: ApplicationState<FileStorage>,
    registry: WindowRegistry,
    event_handler: EventHandler,
    modifiers: ModifiersState,
    poller: SystemPoller,
    last_refresh: Instant,
    next_refresh: Instant,
    started: bool,
}

impl App {
    /// Open the layout store and restore the saved layout.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let storage = match &config.layout_path {
            Some(path) => FileStorage::new(path.clone())?,
            None => FileStorage::default_location()?,
        };
        log::info!("Layout file: {}", storage.path().display());

        let state = ApplicationState::init(Arc::new(storage), config.engine.clone());
        let event_handler = EventHandler::new(config.resize_handle);
        let now = Instant::now();

        Ok(Self {
            config,
            state,
            registry: WindowRegistry::default(),
            event_handler,
            modifiers: ModifiersState::empty(),
            poller: SystemPoller::new(),
            last_refresh: now,
            next_refresh: now,
            started: false,
        })
    }

    /// Run the event loop until the user quits.
    pub fn run(config: AppConfig) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        let mut app = App::new(config)?;
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    /// Push pending engine changes to native windows.
    fn sync(&mut self, event_loop: &ActiveEventLoop) {
        let mut layer = NativeWindows::new(event_loop, &mut self.registry);
        self.state.sync_windows(&mut layer);
    }

    fn report_notices(&mut self) {
        for notice in self.state.take_notices() {
            match notice {
                Notice::PersistenceFailed { message } => {
                    log::error!("Layout changes could not be saved: {}", message)
                }
                Notice::LayoutRejected {
                    message,
                    backed_up: true,
                } => log::warn!(
                    "Saved layout ignored ({}), previous file kept at {}",
                    message,
                    self.state.storage().backup_path().display()
                ),
                Notice::LayoutRejected {
                    message,
                    backed_up: false,
                } => log::warn!("Saved layout ignored: {}", message),
            }
        }
    }

    /// Advance timers, poll system readings and re-render every widget.
    fn refresh(&mut self, event_loop: &ActiveEventLoop, now: Instant) {
        self.state
            .advance(now.saturating_duration_since(self.last_refresh));
        self.last_refresh = now;

        if self.state.wants_system_readings() {
            let readings = self.poller.poll();
            self.state
                .apply_system_readings(readings.cpu_percent, readings.memory_percent);
        }

        self.sync(event_loop);
        let mut layer = NativeWindows::new(event_loop, &mut self.registry);
        self.state.refresh_content(&mut layer);
    }

    /// Remove a widget. Returns true when it was the last one, since nothing
    /// is left to receive input.
    fn close_widget(&mut self, id: &str) -> bool {
        self.state.engine_mut().remove_widget(id);
        self.event_handler.widget_closed(id);
        if self.state.engine().is_empty() {
            log::info!("Last widget closed, exiting");
            return true;
        }
        false
    }

    /// Run a shortcut on the focused widget. Returns true when the app
    /// should exit.
    fn apply_action(&mut self, id: &str, action: ShortcutAction) -> bool {
        let engine = self.state.engine_mut();
        match action {
            ShortcutAction::CycleZPolicy => {
                if let Some(policy) = engine.get(id).map(|w| w.z_policy.next()) {
                    engine.set_z_policy(id, policy);
                }
            }
            ShortcutAction::ToggleClickThrough => {
                if let Some(enabled) = engine.get(id).map(|w| !w.click_through) {
                    engine.set_click_through(id, enabled);
                }
            }
            ShortcutAction::ClearAllClickThrough => {
                engine.clear_all_click_through();
            }
            ShortcutAction::CloseWidget => return self.close_widget(id),
            ShortcutAction::AddWidget(kind) => {
                engine.add_widget(kind, kind.default_preset());
            }
            ShortcutAction::ToggleTimer => {
                engine.perform(id, WidgetAction::ToggleTimer);
            }
            ShortcutAction::ResetTimer => {
                engine.perform(id, WidgetAction::ResetTimer);
            }
            ShortcutAction::ToggleSnapping => {
                let mut config = engine.config().clone();
                config.snap_enabled = !config.snap_enabled;
                log::info!(
                    "Edge snapping {}",
                    if config.snap_enabled { "on" } else { "off" }
                );
                engine.set_config(config);
            }
            ShortcutAction::Quit => return true,
        }
        false
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, id: &str, event: &KeyEvent) {
        let Key::Character(key) = &event.logical_key else {
            return;
        };
        let Some(action) = ShortcutRegistry::find(
            key.as_str(),
            self.modifiers.control_key(),
            self.modifiers.shift_key(),
        ) else {
            return;
        };
        log::debug!("Shortcut {:?} on widget {}", action, id);

        if self.apply_action(id, action) {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }

        let layer = NativeWindows::new(event_loop, &mut self.registry);
        self.state.refresh_monitors(&layer);
        log::info!(
            "Found {} monitor(s), restoring {} widget(s)",
            self.state.engine().monitors().len(),
            self.state.engine().len()
        );

        if self.state.engine().is_empty() {
            self.state
                .engine_mut()
                .add_widget(WidgetKind::Clock, WidgetKind::Clock.default_preset());
        }

        self.started = true;
        self.sync(event_loop);
        self.report_notices();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(id) = self.registry.widget_for(window_id).cloned() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                if self.close_widget(&id) {
                    event_loop.exit();
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }

            WindowEvent::CursorMoved { position, .. } => {
                let local = Point::new(position.x, position.y);
                let Some(screen) = self.registry.screen_point(&id, local) else {
                    return;
                };
                self.event_handler
                    .cursor_moved(self.state.engine_mut(), &id, local, screen);
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.event_handler.pointer_pressed(self.state.engine_mut(), &id)
                }
                ElementState::Released => {
                    self.event_handler.pointer_released(self.state.engine_mut())
                }
            },

            WindowEvent::KeyboardInput { event, .. } => {
                // Keyboard input only reaches the focused widget's window.
                if event.state == ElementState::Pressed && !event.repeat {
                    self.handle_key(event_loop, &id, &event);
                }
            }

            _ => return,
        }

        self.sync(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.state.tick(now);

        if now >= self.next_refresh {
            self.refresh(event_loop, now);
            self.next_refresh = now + self.config.refresh_interval;
        }

        self.report_notices();

        let wake = match self.state.next_deadline() {
            Some(deadline) => deadline.min(self.next_refresh),
            None => self.next_refresh,
        };
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Err(e) = self.state.shutdown() {
            log::error!("Failed to save layout on exit: {}", e);
        }
        log::info!("Deskpin stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.layout_path.is_none());
        assert_eq!(config.resize_handle, 16.0);
        assert_eq!(config.engine.snap_threshold, 8.0);
    }

    fn app_in(dir: &std::path::Path) -> App {
        App::new(AppConfig {
            layout_path: Some(dir.join("layout.json")),
            ..AppConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_closing_last_widget_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let first = app.state.engine_mut().add_widget(WidgetKind::Clock, WidgetKind::Clock.default_preset());
        let second = app.state.engine_mut().add_widget(WidgetKind::Notes, WidgetKind::Notes.default_preset());

        assert!(!app.apply_action(&first, ShortcutAction::CloseWidget));
        assert!(app.close_widget(&second));
        assert!(app.state.engine().is_empty());
    }

    #[test]
    fn test_quit_action_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let id = app.state.engine_mut().add_widget(WidgetKind::Clock, WidgetKind::Clock.default_preset());
        assert!(app.apply_action(&id, ShortcutAction::Quit));
        assert_eq!(app.state.engine().len(), 1);
    }

    #[test]
    fn test_timer_shortcuts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let id = app.state.engine_mut().add_widget(WidgetKind::Timer, WidgetKind::Timer.default_preset());

        assert!(!app.apply_action(&id, ShortcutAction::ToggleTimer));
        assert_eq!(app.state.engine().render(&id).unwrap().lines[1], "Running");
        app.state.advance(Duration::from_secs(3));
        assert_eq!(app.state.engine().render(&id).unwrap().lines[0], "00:03");

        app.apply_action(&id, ShortcutAction::ResetTimer);
        assert_eq!(app.state.engine().render(&id).unwrap().lines, vec!["00:00", "Paused"]);
    }

    #[test]
    fn test_toggle_snapping_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let id = app.state.engine_mut().add_widget(WidgetKind::Clock, WidgetKind::Clock.default_preset());

        app.apply_action(&id, ShortcutAction::ToggleSnapping);
        assert!(!app.state.engine().config().snap_enabled);
        app.state.flush().unwrap();

        let saved = std::fs::read_to_string(dir.path().join("layout.json")).unwrap();
        assert!(saved.contains("\"snapEnabled\": false"));
    }

    #[test]
    fn test_rejected_layout_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("layout.json"), "{ broken").unwrap();

        let mut app = app_in(dir.path());
        app.state.engine_mut().add_widget(WidgetKind::Clock, WidgetKind::Clock.default_preset());
        app.state.flush().unwrap();

        let kept = std::fs::read_to_string(dir.path().join("layout.json.bak")).unwrap();
        assert_eq!(kept, "{ broken");
    }

    #[test]
    fn test_new_with_explicit_layout_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            layout_path: Some(dir.path().join("sub").join("layout.json")),
            ..AppConfig::default()
        };
        let app = App::new(config).unwrap();
        assert!(app.state.engine().is_empty());
        assert!(dir.path().join("sub").exists());
    }
}
