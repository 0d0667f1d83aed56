//! The age gate: PIN verification, lockout, and settings access.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use linden_guard_types::AgeBand;

use crate::config::{ParentConfig, ParentConfigStore};
use crate::error::Result;
use crate::pin::PinHash;

/// Wrong attempts tolerated before the gate locks out.
pub const MAX_PIN_ATTEMPTS: u32 = 3;

/// How long a lockout lasts, in seconds.
pub const LOCKOUT_DURATION_SECS: i64 = 15 * 60;

/// Minimum accepted PIN length.
pub const MIN_PIN_LEN: usize = 4;

struct GateState {
    config: Option<ParentConfig>,
    failed_attempts: u32,
    lockout_until: Option<DateTime<Utc>>,
}

/// Owner of the parent profile and sole PIN-verification authority.
///
/// The failed-attempt counter and lockout deadline live behind a mutex:
/// concurrent verification attempts from simultaneous voice and chat
/// callers must not lose an increment.
pub struct AgeGate {
    store: ParentConfigStore,
    state: Mutex<GateState>,
}

impl AgeGate {
    /// Open the gate over the profile at `path`, loading it if present.
    pub fn open(store: ParentConfigStore) -> Result<Self> {
        let config = store.load()?;
        Ok(Self {
            store,
            state: Mutex::new(GateState {
                config,
                failed_attempts: 0,
                lockout_until: None,
            }),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.lock().config.is_some()
    }

    /// The configured age band, if setup has run.
    pub fn age_band(&self) -> Option<AgeBand> {
        self.lock().config.as_ref().map(|c| c.age_band)
    }

    /// Create (or overwrite) the parent profile. Callers gate this behind
    /// "not yet configured"; the gate itself only validates the PIN shape.
    pub fn setup(&self, age_band: AgeBand, pin: &str) -> Result<bool> {
        if pin.len() < MIN_PIN_LEN {
            return Ok(false);
        }

        let config = ParentConfig::new(age_band, PinHash::derive(pin), Utc::now());
        self.store.save(&config)?;

        let mut state = self.lock();
        state.config = Some(config);
        state.failed_attempts = 0;
        state.lockout_until = None;
        info!(%age_band, "parent profile created");
        Ok(true)
    }

    /// Verify the parent PIN.
    ///
    /// During an active lockout window this returns false without touching
    /// the hash; lockout evaluation strictly precedes verification. The
    /// return value is the same plain false as for a wrong PIN; callers
    /// that need to distinguish must ask [`AgeGate::is_locked_out`].
    pub fn verify_pin(&self, pin: &str) -> bool {
        self.verify_pin_at(pin, Utc::now())
    }

    pub fn verify_pin_at(&self, pin: &str, now: DateTime<Utc>) -> bool {
        let mut state = self.lock();

        match state.lockout_until {
            Some(until) if now < until => return false,
            Some(_) => {
                // Window elapsed: the slate is clean again.
                state.lockout_until = None;
                state.failed_attempts = 0;
            }
            None => {}
        }

        let pin_ok = match state.config.as_ref() {
            Some(config) => config.pin_hash.verify(pin),
            None => return false,
        };

        if pin_ok {
            state.failed_attempts = 0;
            if let Some(config) = state.config.as_mut() {
                config.last_verified = Some(now);
                if let Err(e) = self.store.save(config) {
                    warn!(error = %e, "could not persist last_verified");
                }
            }
            true
        } else {
            state.failed_attempts += 1;
            if state.failed_attempts >= MAX_PIN_ATTEMPTS {
                state.lockout_until = Some(now + Duration::seconds(LOCKOUT_DURATION_SECS));
                warn!(attempts = state.failed_attempts, "PIN lockout engaged");
            }
            false
        }
    }

    /// Change the PIN. Requires the current PIN to verify and the new PIN
    /// to meet the minimum length.
    pub fn change_pin(&self, current: &str, new: &str) -> bool {
        self.change_pin_at(current, new, Utc::now())
    }

    pub fn change_pin_at(&self, current: &str, new: &str, now: DateTime<Utc>) -> bool {
        if new.len() < MIN_PIN_LEN {
            return false;
        }
        if !self.verify_pin_at(current, now) {
            return false;
        }

        let mut state = self.lock();
        let Some(config) = state.config.as_mut() else {
            return false;
        };
        config.pin_hash = PinHash::derive(new);
        if let Err(e) = self.store.save(config) {
            warn!(error = %e, "could not persist new PIN");
            return false;
        }
        info!("parent PIN changed");
        true
    }

    /// Whether a lockout window is currently active.
    pub fn is_locked_out(&self) -> bool {
        self.is_locked_out_at(Utc::now())
    }

    pub fn is_locked_out_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lock().lockout_until, Some(until) if now < until)
    }

    /// Remaining lockout time, if a window is active.
    pub fn lockout_remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.lock().lockout_until {
            Some(until) if now < until => Some(until - now),
            _ => None,
        }
    }

    /// Settings view. Without verification the sensitive fields
    /// (transcript capture, timestamps) are absent, not nulled.
    pub fn get_settings(&self, pin_verified: bool) -> Map<String, Value> {
        let state = self.lock();
        let mut map = Map::new();
        let Some(config) = state.config.as_ref() else {
            return map;
        };

        map.insert("age_band".into(), json!(config.age_band));
        map.insert(
            "safety_stats_enabled".into(),
            json!(config.safety_stats_enabled),
        );
        map.insert(
            "max_session_minutes".into(),
            json!(config.max_session_minutes),
        );
        map.insert(
            "daily_limit_minutes".into(),
            json!(config.daily_limit_minutes),
        );

        if pin_verified {
            map.insert("transcript_enabled".into(), json!(config.transcript_enabled));
            map.insert("created_at".into(), json!(config.created_at));
            map.insert("last_verified".into(), json!(config.last_verified));
        }
        map
    }

    /// PIN-verified settings mutation. Unknown fields are ignored, not
    /// errored; a wrong PIN changes nothing.
    pub fn update_settings(&self, pin: &str, fields: &Map<String, Value>) -> bool {
        self.update_settings_at(pin, fields, Utc::now())
    }

    pub fn update_settings_at(
        &self,
        pin: &str,
        fields: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.verify_pin_at(pin, now) {
            return false;
        }

        let mut state = self.lock();
        let Some(config) = state.config.as_mut() else {
            return false;
        };

        for (key, value) in fields {
            match key.as_str() {
                "age_band" => {
                    if let Ok(band) = serde_json::from_value::<AgeBand>(value.clone()) {
                        config.age_band = band;
                    }
                }
                "transcript_enabled" => {
                    if let Some(v) = value.as_bool() {
                        config.transcript_enabled = v;
                    }
                }
                "safety_stats_enabled" => {
                    if let Some(v) = value.as_bool() {
                        config.safety_stats_enabled = v;
                    }
                }
                "max_session_minutes" => {
                    if let Some(v) = value.as_u64() {
                        config.max_session_minutes = v as u32;
                    }
                }
                "daily_limit_minutes" => {
                    if let Some(v) = value.as_u64() {
                        config.daily_limit_minutes = v as u32;
                    }
                }
                _ => {}
            }
        }

        if let Err(e) = self.store.save(config) {
            warn!(error = %e, "could not persist settings update");
            return false;
        }
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateState> {
        self.state.lock().expect("age gate mutex poisoned")
    }
}
