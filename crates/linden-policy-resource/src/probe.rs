//! System resource probing.
//!
//! The default probe reads `/proc` and sysfs directly. Every source is
//! optional: an unreadable file degrades to a zero reading plus a
//! warning, never an error: the limiter is a soft gate and must keep
//! answering on hardware it does not understand.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

/// One probe reading.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub temperature_celsius: Option<f64>,
    pub warnings: Vec<String>,
}

/// Source of resource readings. Production uses [`ProcProbe`]; tests
/// inject fixed samples.
pub trait ResourceProbe: Send {
    fn sample(&mut self) -> ResourceSample;
}

/// `/proc` + sysfs probe.
///
/// CPU utilization is the busy share of the interval since the previous
/// call (the first call reports zero): the probe keeps the last counters
/// instead of sleeping to take a second reading, so sampling stays
/// on-demand.
pub struct ProcProbe {
    disk_path: PathBuf,
    prev_cpu: Option<(u64, u64)>,
}

impl ProcProbe {
    pub fn new() -> Self {
        Self {
            disk_path: PathBuf::from("/"),
            prev_cpu: None,
        }
    }

    /// Probe a different mount point for disk usage.
    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    fn cpu_percent(&mut self, warnings: &mut Vec<String>) -> f64 {
        let Ok(stat) = fs::read_to_string("/proc/stat") else {
            warnings.push("cpu reading unavailable".to_string());
            return 0.0;
        };
        let Some((idle, total)) = parse_proc_stat(&stat) else {
            warnings.push("cpu reading unparseable".to_string());
            return 0.0;
        };

        let percent = match self.prev_cpu {
            Some((prev_idle, prev_total)) if total > prev_total => {
                let total_delta = (total - prev_total) as f64;
                let idle_delta = idle.saturating_sub(prev_idle) as f64;
                ((total_delta - idle_delta) / total_delta * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        };
        self.prev_cpu = Some((idle, total));
        percent
    }

    fn memory_percent(warnings: &mut Vec<String>) -> f64 {
        let Ok(meminfo) = fs::read_to_string("/proc/meminfo") else {
            warnings.push("memory reading unavailable".to_string());
            return 0.0;
        };
        match parse_meminfo(&meminfo) {
            Some(percent) => percent,
            None => {
                warnings.push("memory reading unparseable".to_string());
                0.0
            }
        }
    }

    fn disk_percent(&self, warnings: &mut Vec<String>) -> f64 {
        match nix::sys::statvfs::statvfs(&self.disk_path) {
            Ok(stat) => {
                let blocks = stat.blocks() as f64;
                if blocks == 0.0 {
                    return 0.0;
                }
                let available = stat.blocks_available() as f64;
                ((1.0 - available / blocks) * 100.0).clamp(0.0, 100.0)
            }
            Err(e) => {
                warnings.push(format!("disk reading unavailable: {e}"));
                0.0
            }
        }
    }

    fn temperature() -> Option<f64> {
        // Millidegrees on the first thermal zone; absent on many hosts.
        let raw = fs::read_to_string("/sys/class/thermal/thermal_zone0/temp").ok()?;
        let millis: f64 = raw.trim().parse().ok()?;
        Some(millis / 1000.0)
    }
}

impl Default for ProcProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for ProcProbe {
    fn sample(&mut self) -> ResourceSample {
        let mut warnings = Vec::new();
        let sample = ResourceSample {
            cpu_percent: self.cpu_percent(&mut warnings),
            memory_percent: Self::memory_percent(&mut warnings),
            disk_percent: self.disk_percent(&mut warnings),
            temperature_celsius: Self::temperature(),
            warnings,
        };
        debug!(
            cpu = sample.cpu_percent,
            memory = sample.memory_percent,
            disk = sample.disk_percent,
            "resource sample taken"
        );
        sample
    }
}

/// Parse the aggregate `cpu` line into `(idle, total)` jiffies. Idle
/// includes iowait.
fn parse_proc_stat(stat: &str) -> Option<(u64, u64)> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|f| f.parse().ok())
        .collect();
    if fields.len() < 5 {
        return None;
    }
    let total: u64 = fields.iter().sum();
    let idle = fields[3] + fields[4];
    Some((idle, total))
}

/// Used-memory percentage from `MemTotal` and `MemAvailable`.
fn parse_meminfo(meminfo: &str) -> Option<f64> {
    let field = |name: &str| -> Option<f64> {
        meminfo
            .lines()
            .find(|l| l.starts_with(name))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    };
    let total = field("MemTotal:")?;
    let available = field("MemAvailable:")?;
    if total <= 0.0 {
        return None;
    }
    Some(((1.0 - available / total) * 100.0).clamp(0.0, 100.0))
}
