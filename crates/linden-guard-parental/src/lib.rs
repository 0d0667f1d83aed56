//! # linden-guard-parental
//!
//! The parental gate: single owner of the persisted parent profile and
//! the only source of PIN-verification authority in the system. Other
//! components (crisis unlock, settings mutation) consume the boolean this
//! crate produces; none of them re-implement PIN logic.
//!
//! Lockout is evaluated strictly before hash comparison, and a locked-out
//! `verify_pin` returns the same plain `false` as a wrong PIN; lockout
//! state is only observable through the explicit query methods.

mod config;
mod error;
mod gate;
mod pin;

pub use config::{ParentConfig, ParentConfigStore, CONFIG_SCHEMA_VERSION};
pub use error::{ParentalError, Result};
pub use gate::{AgeGate, LOCKOUT_DURATION_SECS, MAX_PIN_ATTEMPTS, MIN_PIN_LEN};
pub use pin::PinHash;
