#[cfg(feature = "cli")]
use std::sync::Mutex;
use std::time::Duration;
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

impl ResourceSnapshot {
    /// 記憶體使用量是否超過預算
    pub fn exceeds_memory_budget(&self, budget_mb: u64) -> bool {
        self.memory_mb > budget_mb
    }
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    peak_memory_mb: u64,
}

/// 監控目前行程的 CPU 與記憶體，在長時間工作的各階段記錄到日誌
#[cfg(feature = "cli")]
pub struct ResourceMonitor {
    state: Mutex<MonitorState>,
    pid: Option<Pid>,
    started: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl ResourceMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("⚠️ Resource monitoring unavailable: {}", e);
                None
            }
        };

        Self {
            state: Mutex::new(MonitorState {
                system: System::new(),
                peak_memory_mb: 0,
            }),
            pid,
            started: Instant::now(),
            enabled,
        }
    }

    pub fn snapshot(&self) -> Option<ResourceSnapshot> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut state = self.state.lock().ok()?;
        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );

        let process = state.system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let cpu_usage = process.cpu_usage();

        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        Some(ResourceSnapshot {
            cpu_usage,
            memory_mb,
            peak_memory_mb: state.peak_memory_mb,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_phase(&self, phase: &str) {
        if let Some(stats) = self.snapshot() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時提供空實作
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct ResourceMonitor;

#[cfg(not(feature = "cli"))]
impl ResourceMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn snapshot(&self) -> Option<ResourceSnapshot> {
        None
    }

    pub fn log_phase(&self, _phase: &str) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = ResourceMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.snapshot().is_none());
    }

    #[test]
    fn test_memory_budget_check() {
        let snapshot = ResourceSnapshot {
            cpu_usage: 0.0,
            memory_mb: 120,
            peak_memory_mb: 150,
            elapsed: Duration::from_secs(1),
        };
        assert!(snapshot.exceeds_memory_budget(100));
        assert!(!snapshot.exceeds_memory_budget(120));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_enabled_monitor_tracks_peak() {
        let monitor = ResourceMonitor::new(true);
        if let Some(first) = monitor.snapshot() {
            assert!(first.peak_memory_mb >= first.memory_mb);
            let second = monitor.snapshot().unwrap();
            assert!(second.peak_memory_mb >= first.peak_memory_mb);
        }
    }
}
