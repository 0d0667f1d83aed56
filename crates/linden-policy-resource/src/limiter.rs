//! The resource limiter.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::probe::{ResourceProbe, ResourceSample};

/// Rolling window for the API-call budget, in seconds.
const API_WINDOW_SECS: i64 = 3600;

/// Ceilings above which no new activity starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceCeilings {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub temperature_celsius: f64,
}

impl Default for ResourceCeilings {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 80.0,
            disk_percent: 90.0,
            temperature_celsius: 70.0,
        }
    }
}

/// Rate and count caps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateCaps {
    /// Maximum API calls in the trailing hour.
    pub api_calls_per_hour: usize,
    /// Maximum autonomous projects per day.
    pub projects_per_day: u32,
}

impl Default for RateCaps {
    fn default() -> Self {
        Self {
            api_calls_per_hour: 100,
            projects_per_day: 5,
        }
    }
}

/// A resource snapshot with the limit verdict applied. Recomputed on
/// demand, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub temperature_celsius: Option<f64>,
    pub within_limits: bool,
    pub warnings: Vec<String>,
}

struct SessionBudget {
    started_at: DateTime<Utc>,
    max_minutes: u32,
}

struct LimiterState {
    api_calls: VecDeque<DateTime<Utc>>,
    projects_today: u32,
    session: Option<SessionBudget>,
}

/// Gate for starting new reactive or autonomous work.
///
/// Owns its rolling counters; the only mutation paths are the `record_*`
/// operations and the explicit daily reset, all behind one mutex.
pub struct ResourceLimiter {
    probe: Mutex<Box<dyn ResourceProbe>>,
    ceilings: ResourceCeilings,
    caps: RateCaps,
    state: Mutex<LimiterState>,
}

impl ResourceLimiter {
    pub fn new(probe: Box<dyn ResourceProbe>) -> Self {
        Self::with_config(probe, ResourceCeilings::default(), RateCaps::default())
    }

    pub fn with_config(
        probe: Box<dyn ResourceProbe>,
        ceilings: ResourceCeilings,
        caps: RateCaps,
    ) -> Self {
        Self {
            probe: Mutex::new(probe),
            ceilings,
            caps,
            state: Mutex::new(LimiterState {
                api_calls: VecDeque::new(),
                projects_today: 0,
                session: None,
            }),
        }
    }

    /// Sample the system and apply the ceilings.
    pub fn check_resources(&self) -> ResourceStatus {
        let sample = self.probe.lock().expect("probe mutex poisoned").sample();
        self.status_from(sample)
    }

    fn status_from(&self, sample: ResourceSample) -> ResourceStatus {
        let mut warnings = sample.warnings;

        let mut exceeded = |name: &str, value: f64, ceiling: f64| -> bool {
            if value > ceiling {
                warnings.push(format!("{name} {value:.0}% exceeds ceiling {ceiling:.0}%"));
                true
            } else {
                false
            }
        };

        let mut over = false;
        over |= exceeded("cpu", sample.cpu_percent, self.ceilings.cpu_percent);
        over |= exceeded("memory", sample.memory_percent, self.ceilings.memory_percent);
        over |= exceeded("disk", sample.disk_percent, self.ceilings.disk_percent);

        if let Some(temp) = sample.temperature_celsius {
            if temp > self.ceilings.temperature_celsius {
                warnings.push(format!(
                    "temperature {temp:.0}C exceeds ceiling {:.0}C",
                    self.ceilings.temperature_celsius
                ));
                over = true;
            }
        }

        if over {
            warn!(?warnings, "resource ceilings exceeded");
        }

        ResourceStatus {
            cpu_percent: sample.cpu_percent,
            memory_percent: sample.memory_percent,
            disk_percent: sample.disk_percent,
            temperature_celsius: sample.temperature_celsius,
            within_limits: !over,
            warnings,
        }
    }

    /// Whether any new activity (reactive or autonomous) may start.
    pub fn can_start_activity(&self) -> (bool, String) {
        self.can_start_activity_at(Utc::now())
    }

    pub fn can_start_activity_at(&self, now: DateTime<Utc>) -> (bool, String) {
        let status = self.check_resources();
        if !status.within_limits {
            return (
                false,
                format!("resource limits exceeded: {}", status.warnings.join("; ")),
            );
        }

        let mut state = self.lock();

        if let Some(session) = &state.session {
            let elapsed = now - session.started_at;
            if elapsed >= Duration::minutes(i64::from(session.max_minutes)) {
                return (false, "session budget exhausted".to_string());
            }
        }

        prune_window(&mut state.api_calls, now);
        if state.api_calls.len() >= self.caps.api_calls_per_hour {
            return (false, "hourly API call budget exhausted".to_string());
        }

        (true, "ok".to_string())
    }

    /// Whether a new autonomous project may start. Stricter than
    /// `can_start_activity`: adds the daily cap.
    pub fn can_start_project(&self) -> (bool, String) {
        self.can_start_project_at(Utc::now())
    }

    pub fn can_start_project_at(&self, now: DateTime<Utc>) -> (bool, String) {
        let (ok, reason) = self.can_start_activity_at(now);
        if !ok {
            return (ok, reason);
        }
        let state = self.lock();
        if state.projects_today >= self.caps.projects_per_day {
            return (false, "daily project budget exhausted".to_string());
        }
        (true, "ok".to_string())
    }

    /// Record one API call into the rolling window.
    pub fn record_api_call(&self) {
        self.record_api_call_at(Utc::now());
    }

    pub fn record_api_call_at(&self, at: DateTime<Utc>) {
        let mut state = self.lock();
        prune_window(&mut state.api_calls, at);
        state.api_calls.push_back(at);
    }

    /// Record a started project against the daily cap.
    pub fn record_project(&self) {
        let mut state = self.lock();
        state.projects_today += 1;
        debug!(projects_today = state.projects_today, "project recorded");
    }

    /// Caller-driven daily rollover (e.g. at local midnight). The rolling
    /// API window needs no reset; it prunes itself on every check.
    pub fn reset_daily_counters(&self) {
        let mut state = self.lock();
        state.projects_today = 0;
    }

    /// Start tracking a session against the parent-configured budget.
    pub fn begin_session(&self, max_minutes: u32) {
        self.begin_session_at(max_minutes, Utc::now());
    }

    pub fn begin_session_at(&self, max_minutes: u32, now: DateTime<Utc>) {
        let mut state = self.lock();
        state.session = Some(SessionBudget {
            started_at: now,
            max_minutes,
        });
    }

    pub fn end_session(&self) {
        self.lock().session = None;
    }

    /// Minutes elapsed in the current session, if one is being tracked.
    pub fn session_elapsed_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let state = self.lock();
        state
            .session
            .as_ref()
            .map(|s| (now - s.started_at).num_minutes())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LimiterState> {
        self.state.lock().expect("limiter state mutex poisoned")
    }
}

/// Drop timestamps older than the trailing window.
fn prune_window(window: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
    let cutoff = now - Duration::seconds(API_WINDOW_SECS);
    while matches!(window.front(), Some(t) if *t <= cutoff) {
        window.pop_front();
    }
}
