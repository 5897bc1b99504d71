//! Behaviors for the built-in widget kinds.

use super::{Settings, WidgetAction, WidgetBehavior, WidgetContent};
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use serde_json::Value;
use std::time::Duration;

fn get_str(settings: &Settings, key: &str) -> Option<String> {
    settings.get(key).and_then(Value::as_str).map(str::to_string)
}

fn get_f64(settings: &Settings, key: &str) -> Option<f64> {
    settings.get(key).and_then(Value::as_f64)
}

fn get_u64(settings: &Settings, key: &str) -> Option<u64> {
    settings.get(key).and_then(Value::as_u64)
}

fn get_bool(settings: &Settings, key: &str) -> Option<bool> {
    settings.get(key).and_then(Value::as_bool)
}

/// Default clock format.
pub const DEFAULT_CLOCK_FORMAT: &str = "%H:%M:%S";

/// Wall clock with a strftime format.
#[derive(Debug, Clone)]
pub struct ClockWidget {
    format: String,
}

impl Default for ClockWidget {
    fn default() -> Self {
        Self {
            format: DEFAULT_CLOCK_FORMAT.to_string(),
        }
    }
}

impl ClockWidget {
    /// The active format string.
    pub fn format(&self) -> &str {
        &self.format
    }
}

impl WidgetBehavior for ClockWidget {
    fn render(&self) -> WidgetContent {
        let now = Local::now();
        WidgetContent::new(
            "Clock",
            vec![
                now.format(&self.format).to_string(),
                now.format("%Y-%m-%d %A").to_string(),
            ],
        )
    }

    fn on_settings_changed(&mut self, settings: &Settings) {
        let format = get_str(settings, "format").unwrap_or_else(|| DEFAULT_CLOCK_FORMAT.to_string());
        // Formatting an invalid pattern fails at display time, so reject it here.
        if StrftimeItems::new(&format).any(|item| item == Item::Error) {
            log::warn!("Ignoring invalid clock format {:?}", format);
            self.format = DEFAULT_CLOCK_FORMAT.to_string();
        } else {
            self.format = format;
        }
    }

    fn serialize_settings(&self) -> Settings {
        let mut settings = Settings::new();
        settings.insert("format".into(), Value::from(self.format.clone()));
        settings
    }
}

/// CPU and memory readings, pushed in by a background poller.
#[derive(Debug, Clone, Default)]
pub struct SystemMonitorWidget {
    cpu_percent: Option<f64>,
    memory_percent: Option<f64>,
}

impl SystemMonitorWidget {
    /// Settings blob carrying one poll's readings.
    pub fn readings(cpu_percent: f64, memory_percent: f64) -> Settings {
        let mut settings = Settings::new();
        settings.insert("cpuPercent".into(), Value::from(cpu_percent));
        settings.insert("memoryPercent".into(), Value::from(memory_percent));
        settings
    }
}

fn format_percent(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{label} {:.0}%", v.clamp(0.0, 100.0)),
        None => format!("{label} --"),
    }
}

impl WidgetBehavior for SystemMonitorWidget {
    fn render(&self) -> WidgetContent {
        WidgetContent::new(
            "System Monitor",
            vec![
                format_percent("CPU", self.cpu_percent),
                format_percent("Memory", self.memory_percent),
            ],
        )
    }

    fn on_settings_changed(&mut self, settings: &Settings) {
        self.cpu_percent = get_f64(settings, "cpuPercent");
        self.memory_percent = get_f64(settings, "memoryPercent");
    }

    fn serialize_settings(&self) -> Settings {
        let mut settings = Settings::new();
        if let Some(cpu) = self.cpu_percent {
            settings.insert("cpuPercent".into(), Value::from(cpu));
        }
        if let Some(memory) = self.memory_percent {
            settings.insert("memoryPercent".into(), Value::from(memory));
        }
        settings
    }
}

/// Stopwatch-style timer. Only whole seconds are persisted.
#[derive(Debug, Clone, Default)]
pub struct TimerWidget {
    elapsed: Duration,
    running: bool,
}

impl TimerWidget {
    fn formatted(&self) -> String {
        let total = self.elapsed.as_secs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes:02}:{seconds:02}")
        }
    }
}

impl WidgetBehavior for TimerWidget {
    fn render(&self) -> WidgetContent {
        let state = if self.running { "Running" } else { "Paused" };
        WidgetContent::new("Timer", vec![self.formatted(), state.to_string()])
    }

    fn on_settings_changed(&mut self, settings: &Settings) {
        let secs = get_u64(settings, "elapsedSecs").unwrap_or(0);
        // Keep the sub-second remainder when the blob only restates our time.
        if secs != self.elapsed.as_secs() {
            self.elapsed = Duration::from_secs(secs);
        }
        self.running = get_bool(settings, "running").unwrap_or(false);
    }

    fn serialize_settings(&self) -> Settings {
        let mut settings = Settings::new();
        settings.insert("elapsedSecs".into(), Value::from(self.elapsed.as_secs()));
        settings.insert("running".into(), Value::from(self.running));
        settings
    }

    fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        let before = self.elapsed.as_secs();
        self.elapsed += elapsed;
        self.elapsed.as_secs() != before
    }

    fn perform(&mut self, action: WidgetAction) -> bool {
        match action {
            WidgetAction::ToggleTimer => self.running = !self.running,
            WidgetAction::ResetTimer => {
                self.running = false;
                self.elapsed = Duration::ZERO;
            }
        }
        true
    }
}

/// Free-form note.
#[derive(Debug, Clone, Default)]
pub struct NotesWidget {
    text: String,
}

impl WidgetBehavior for NotesWidget {
    fn render(&self) -> WidgetContent {
        WidgetContent::new("Notes", self.text.lines().map(str::to_string).collect())
    }

    fn on_settings_changed(&mut self, settings: &Settings) {
        self.text = get_str(settings, "text").unwrap_or_default();
    }

    fn serialize_settings(&self) -> Settings {
        let mut settings = Settings::new();
        settings.insert("text".into(), Value::from(self.text.clone()));
        settings
    }
}

/// Picture frame with an optional crop rectangle `[x, y, width, height]`.
#[derive(Debug, Clone, Default)]
pub struct ImageWidget {
    image_path: Option<String>,
    crop_rect: Option<[i64; 4]>,
}

fn parse_crop_rect(value: Option<&Value>) -> Option<[i64; 4]> {
    let items = value?.as_array()?;
    if items.len() != 4 {
        return None;
    }
    let mut rect = [0i64; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = item.as_i64()?;
    }
    Some(rect)
}

impl WidgetBehavior for ImageWidget {
    fn render(&self) -> WidgetContent {
        let line = match &self.image_path {
            Some(path) => std::path::Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.clone()),
            None => "No image selected".to_string(),
        };
        WidgetContent::new("Image", vec![line])
    }

    fn on_settings_changed(&mut self, settings: &Settings) {
        self.image_path = get_str(settings, "imagePath").filter(|p| !p.is_empty());
        self.crop_rect = parse_crop_rect(settings.get("cropRect"));
    }

    fn serialize_settings(&self) -> Settings {
        let mut settings = Settings::new();
        if let Some(path) = &self.image_path {
            settings.insert("imagePath".into(), Value::from(path.clone()));
        }
        if let Some(rect) = self.crop_rect {
            settings.insert("cropRect".into(), Value::from(rect.to_vec()));
        }
        settings
    }
}

/// Web bookmark.
#[derive(Debug, Clone, Default)]
pub struct WebWidget {
    url: Option<String>,
}

impl WidgetBehavior for WebWidget {
    fn render(&self) -> WidgetContent {
        let line = self.url.clone().unwrap_or_else(|| "Enter a URL".to_string());
        WidgetContent::new("Web", vec![line])
    }

    fn on_settings_changed(&mut self, settings: &Settings) {
        self.url = get_str(settings, "url").filter(|u| !u.is_empty());
    }

    fn serialize_settings(&self) -> Settings {
        let mut settings = Settings::new();
        if let Some(url) = &self.url {
            settings.insert("url".into(), Value::from(url.clone()));
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> Settings {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_clock_rejects_invalid_format() {
        let mut clock = ClockWidget::default();
        clock.on_settings_changed(&settings(json!({ "format": "%Q%" })));
        assert_eq!(clock.format(), DEFAULT_CLOCK_FORMAT);

        clock.on_settings_changed(&settings(json!({ "format": "%H:%M" })));
        assert_eq!(clock.format(), "%H:%M");
        assert_eq!(clock.render().lines[0].len(), 5);
    }

    #[test]
    fn test_system_monitor_placeholder_until_polled() {
        let mut monitor = SystemMonitorWidget::default();
        assert_eq!(monitor.render().lines, vec!["CPU --", "Memory --"]);

        monitor.on_settings_changed(&settings(json!({ "cpuPercent": 12.4, "memoryPercent": 55.6 })));
        assert_eq!(monitor.render().lines, vec!["CPU 12%", "Memory 56%"]);
    }

    #[test]
    fn test_timer_format() {
        let mut timer = TimerWidget::default();
        timer.on_settings_changed(&settings(json!({ "elapsedSecs": 65, "running": true })));
        assert_eq!(timer.render().lines, vec!["01:05", "Running"]);

        timer.on_settings_changed(&settings(json!({ "elapsedSecs": 3725 })));
        assert_eq!(timer.render().lines, vec!["01:02:05", "Paused"]);
    }

    #[test]
    fn test_system_monitor_readings_blob() {
        let mut monitor = SystemMonitorWidget::default();
        monitor.on_settings_changed(&SystemMonitorWidget::readings(99.6, 0.4));
        assert_eq!(monitor.render().lines, vec!["CPU 100%", "Memory 0%"]);
    }

    #[test]
    fn test_timer_ticks_only_while_running() {
        let mut timer = TimerWidget::default();
        assert!(!timer.tick(Duration::from_secs(3)));
        assert_eq!(timer.render().lines[0], "00:00");

        timer.perform(WidgetAction::ToggleTimer);
        assert!(!timer.tick(Duration::from_millis(600)));
        assert!(timer.tick(Duration::from_millis(600)));
        assert_eq!(timer.render().lines, vec!["00:01", "Running"]);

        timer.perform(WidgetAction::ToggleTimer);
        assert!(!timer.tick(Duration::from_secs(10)));
        assert_eq!(timer.render().lines, vec!["00:01", "Paused"]);
    }

    #[test]
    fn test_timer_reset_stops_and_zeroes() {
        let mut timer = TimerWidget::default();
        timer.on_settings_changed(&settings(json!({ "elapsedSecs": 90, "running": true })));
        timer.perform(WidgetAction::ResetTimer);
        assert_eq!(
            timer.serialize_settings(),
            settings(json!({ "elapsedSecs": 0, "running": false }))
        );
    }

    #[test]
    fn test_timer_settings_keep_sub_second_progress() {
        let mut timer = TimerWidget::default();
        timer.perform(WidgetAction::ToggleTimer);
        timer.tick(Duration::from_millis(1500));

        let blob = timer.serialize_settings();
        timer.on_settings_changed(&blob);
        assert!(timer.tick(Duration::from_millis(500)));
        assert_eq!(timer.render().lines[0], "00:02");
    }

    #[test]
    fn test_image_crop_rect_round_trip() {
        let blob = settings(json!({ "imagePath": "/tmp/cat.png", "cropRect": [1, 2, 30, 40] }));
        let mut image = ImageWidget::default();
        image.on_settings_changed(&blob);
        assert_eq!(image.serialize_settings(), blob);
        assert_eq!(image.render().lines, vec!["cat.png"]);
    }

    #[test]
    fn test_image_ignores_malformed_crop_rect() {
        let mut image = ImageWidget::default();
        image.on_settings_changed(&settings(json!({ "cropRect": [1, 2, "x", 4] })));
        assert!(image.serialize_settings().get("cropRect").is_none());
    }

    #[test]
    fn test_web_placeholder() {
        let web = WebWidget::default();
        assert_eq!(web.render().lines, vec!["Enter a URL"]);
        assert!(web.serialize_settings().is_empty());
    }
}
