//! winit-backed windowing layer: one borderless window per widget.

use deskpin_core::{
    Monitor, WidgetContent, WidgetHandle, WidgetId, WindowingError, WindowingLayer,
    WindowingResult, ZPolicy,
};
use kurbo::{Point, Rect, Size};
use std::collections::HashMap;
use std::sync::Arc;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId, WindowLevel};

/// Map a stacking intent to a winit window level.
pub fn window_level(policy: ZPolicy) -> WindowLevel {
    match policy {
        ZPolicy::Normal => WindowLevel::Normal,
        ZPolicy::AlwaysOnTop => WindowLevel::AlwaysOnTop,
        ZPolicy::DesktopOnly => WindowLevel::AlwaysOnBottom,
    }
}

/// Open widget windows, indexed both ways.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WidgetId, Arc<Window>>,
    widgets: HashMap<WindowId, WidgetId>,
}

impl WindowRegistry {
    /// The widget a native window belongs to.
    pub fn widget_for(&self, window_id: WindowId) -> Option<&WidgetId> {
        self.widgets.get(&window_id)
    }

    /// The window showing a widget.
    pub fn window(&self, id: &str) -> Option<&Arc<Window>> {
        self.windows.get(id)
    }

    /// Convert a window-relative point to screen coordinates.
    pub fn screen_point(&self, id: &str, local: Point) -> Option<Point> {
        let origin = self.windows.get(id)?.inner_position().ok()?;
        Some(Point::new(f64::from(origin.x) + local.x, f64::from(origin.y) + local.y))
    }

    /// Number of open windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no windows are open.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn insert(&mut self, id: WidgetId, window: Arc<Window>) {
        self.widgets.insert(window.id(), id.clone());
        self.windows.insert(id, window);
    }

    fn remove(&mut self, id: &str) -> Option<Arc<Window>> {
        let window = self.windows.remove(id)?;
        self.widgets.remove(&window.id());
        Some(window)
    }

    fn get(&self, id: &str) -> WindowingResult<&Arc<Window>> {
        self.windows
            .get(id)
            .ok_or_else(|| WindowingError::MissingWindow(id.to_string()))
    }
}

/// [`WindowingLayer`] for the duration of one event-loop callback.
pub struct NativeWindows<'a> {
    event_loop: &'a ActiveEventLoop,
    registry: &'a mut WindowRegistry,
}

impl<'a> NativeWindows<'a> {
    pub fn new(event_loop: &'a ActiveEventLoop, registry: &'a mut WindowRegistry) -> Self {
        Self {
            event_loop,
            registry,
        }
    }
}

fn physical_position(position: Point) -> PhysicalPosition<i32> {
    PhysicalPosition::new(position.x.round() as i32, position.y.round() as i32)
}

fn physical_size(size: Size) -> PhysicalSize<u32> {
    PhysicalSize::new(size.width.max(1.0).round() as u32, size.height.max(1.0).round() as u32)
}

impl WindowingLayer for NativeWindows<'_> {
    fn monitors(&self) -> Vec<Monitor> {
        self.event_loop
            .available_monitors()
            .map(|handle| {
                let origin = handle.position();
                let size = handle.size();
                let bounds = Rect::new(
                    f64::from(origin.x),
                    f64::from(origin.y),
                    f64::from(origin.x) + f64::from(size.width),
                    f64::from(origin.y) + f64::from(size.height),
                );
                let monitor = Monitor::new(bounds);
                match handle.name() {
                    Some(name) => monitor.with_name(name),
                    None => monitor,
                }
            })
            .collect()
    }

    fn create_window(&mut self, handle: &WidgetHandle, content: &WidgetContent) -> WindowingResult<()> {
        if self.registry.window(&handle.id).is_some() {
            return Ok(());
        }

        let attrs = Window::default_attributes()
            .with_title(content.summary())
            .with_decorations(false)
            .with_resizable(false)
            .with_position(physical_position(handle.position))
            .with_inner_size(physical_size(handle.size))
            .with_window_level(window_level(handle.z_policy));

        let window = self
            .event_loop
            .create_window(attrs)
            .map_err(|e| WindowingError::Create(e.to_string()))?;
        let window = Arc::new(window);

        if handle.click_through {
            window
                .set_cursor_hittest(false)
                .map_err(|e| WindowingError::NotSupported(e.to_string()))?;
        }

        log::debug!("Opened window for {} widget {}", handle.kind, handle.id);
        self.registry.insert(handle.id.clone(), window);
        Ok(())
    }

    fn move_window(&mut self, id: &str, position: Point) -> WindowingResult<()> {
        self.registry.get(id)?.set_outer_position(physical_position(position));
        Ok(())
    }

    fn resize_window(&mut self, id: &str, size: Size) -> WindowingResult<()> {
        // The returned size is only Some when applied synchronously.
        let _ = self.registry.get(id)?.request_inner_size(physical_size(size));
        Ok(())
    }

    fn destroy_window(&mut self, id: &str) -> WindowingResult<()> {
        self.registry
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| WindowingError::MissingWindow(id.to_string()))
    }

    fn apply_z_policy(&mut self, id: &str, policy: ZPolicy) -> WindowingResult<()> {
        self.registry.get(id)?.set_window_level(window_level(policy));
        Ok(())
    }

    fn apply_click_through(&mut self, id: &str, enabled: bool) -> WindowingResult<()> {
        self.registry
            .get(id)?
            .set_cursor_hittest(!enabled)
            .map_err(|e| WindowingError::NotSupported(e.to_string()))
    }

    fn update_content(&mut self, id: &str, content: &WidgetContent) -> WindowingResult<()> {
        let window = self.registry.get(id)?;
        window.set_title(&content.summary());
        window.request_redraw();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_levels() {
        assert_eq!(window_level(ZPolicy::Normal), WindowLevel::Normal);
        assert_eq!(window_level(ZPolicy::AlwaysOnTop), WindowLevel::AlwaysOnTop);
        assert_eq!(window_level(ZPolicy::DesktopOnly), WindowLevel::AlwaysOnBottom);
    }

    #[test]
    fn test_physical_conversions_round() {
        assert_eq!(physical_position(Point::new(10.4, -3.6)), PhysicalPosition::new(10, -4));
        assert_eq!(physical_size(Size::new(220.0, 0.0)), PhysicalSize::new(220, 1));
    }
}
