//! CPU and memory sampling for system monitor widgets.

use sysinfo::System;

/// One sample, both values in percent (0..=100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemReadings {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Polls global CPU usage and RAM occupancy.
///
/// CPU usage is the delta since the previous refresh, so the first poll after
/// creation may read zero.
pub struct SystemPoller {
    system: System,
}

impl Default for SystemPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPoller {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self { system }
    }

    /// Refresh and read current usage.
    pub fn poll(&mut self) -> SystemReadings {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        SystemReadings {
            cpu_percent: clamp_percent(f64::from(self.system.global_cpu_usage())),
            memory_percent: usage_percent(self.system.used_memory(), self.system.total_memory()),
        }
    }
}

fn usage_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    clamp_percent(used as f64 / total as f64 * 100.0)
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_percent() {
        assert_eq!(usage_percent(512, 2048), 25.0);
        assert_eq!(usage_percent(10, 0), 0.0);
        assert_eq!(usage_percent(3000, 2000), 100.0);
    }

    #[test]
    fn test_clamp_percent_rejects_nan() {
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(clamp_percent(-3.0), 0.0);
    }

    #[test]
    fn test_poll_stays_in_range() {
        let mut poller = SystemPoller::new();
        let readings = poller.poll();
        assert!((0.0..=100.0).contains(&readings.cpu_percent));
        assert!((0.0..=100.0).contains(&readings.memory_percent));
    }
}
