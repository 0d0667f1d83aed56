//! The persisted parent profile.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use linden_guard_types::AgeBand;

use crate::error::Result;
use crate::pin::PinHash;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// The parent profile, persisted as one JSON file at a fixed per-user
/// path. Created exactly once during setup and mutated only through the
/// PIN-verified update path in [`crate::AgeGate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParentConfig {
    pub schema_version: u32,
    pub age_band: AgeBand,
    pub pin_hash: PinHash,
    pub created_at: DateTime<Utc>,
    pub last_verified: Option<DateTime<Utc>>,
    pub transcript_enabled: bool,
    pub safety_stats_enabled: bool,
    pub max_session_minutes: u32,
    pub daily_limit_minutes: u32,
}

impl ParentConfig {
    pub fn new(age_band: AgeBand, pin_hash: PinHash, created_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            age_band,
            pin_hash,
            created_at,
            last_verified: None,
            transcript_enabled: false,
            safety_stats_enabled: true,
            max_session_minutes: 30,
            daily_limit_minutes: 120,
        }
    }
}

/// Loads and saves the profile file.
///
/// Writes go through a temp file and rename so a crash mid-write never
/// truncates the profile. File mode is restricted to owner read/write;
/// a chmod failure is logged and tolerated; the permission bits are
/// best-effort hardening, not the primary control.
#[derive(Clone, Debug)]
pub struct ParentConfigStore {
    path: PathBuf,
}

impl ParentConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the profile, or `None` if the device has not been set up.
    pub fn load(&self) -> Result<Option<ParentConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let config: ParentConfig = serde_json::from_str(&raw)?;
        Ok(Some(config))
    }

    pub fn save(&self, config: &ParentConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(config)?)?;
        restrict_permissions(&tmp);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %e, "could not restrict profile permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(path: &Path) {
    warn!(path = %path.display(), "owner-only permissions unsupported on this platform");
}
