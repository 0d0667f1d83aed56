//! # linden-guard-crisis
//!
//! Stateful crisis escalation. The first moderation result touching a
//! crisis category locks the session; only a PIN-verified adult unlock
//! clears it. The manager holds and reports the state; it does not
//! intercept I/O itself, and callers must consult [`CrisisManager::is_locked`]
//! before issuing each new moderation request.

use std::collections::BTreeSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use linden_guard_types::{CrisisCard, ModResult, SafetyCategory};

/// Categories whose appearance in any moderation result locks the session.
/// Abuse victimization maps onto `hate_abuse` in the closed set.
pub const CRISIS_CATEGORIES: [SafetyCategory; 3] = [
    SafetyCategory::SelfHarm,
    SafetyCategory::SexualMinors,
    SafetyCategory::HateAbuse,
];

/// The lock state, exported for the parent dashboard. While active it
/// carries the fixed crisis message and resource list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisState {
    pub active: bool,
    pub triggered_by: Vec<SafetyCategory>,
    pub message: String,
    pub resources: Vec<String>,
}

impl CrisisState {
    fn normal() -> Self {
        Self {
            active: false,
            triggered_by: Vec::new(),
            message: String::new(),
            resources: Vec::new(),
        }
    }

    fn locked(triggered_by: Vec<SafetyCategory>) -> Self {
        let card = CrisisCard::standard();
        Self {
            active: true,
            triggered_by,
            message: card.message.to_string(),
            resources: card.resources.iter().map(|r| r.to_string()).collect(),
        }
    }
}

struct Inner {
    state: CrisisState,
    /// Count of transitions into the locked state. Never resets, even
    /// across unlocks; it feeds a parent-facing statistic.
    interventions: u64,
}

/// Crisis lock state machine.
///
/// One instance per logical session, shared by reference with every
/// caller that dispatches moderation. Interior state sits behind a mutex:
/// a lost lock transition under concurrent voice and chat input would be
/// a safety defect, not a cosmetic race.
pub struct CrisisManager {
    inner: Mutex<Inner>,
}

impl CrisisManager {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CrisisState::normal(),
                interventions: 0,
            }),
        }
    }

    /// Inspect a moderation result; lock if it touches a crisis category.
    /// Returns true if the session is locked after the check.
    pub fn check(&self, result: &ModResult) -> bool {
        let crisis: BTreeSet<SafetyCategory> = CRISIS_CATEGORIES.into_iter().collect();
        let mut inner = self.inner.lock().expect("crisis state mutex poisoned");

        if !inner.state.active && result.intersects(&crisis) {
            let triggered: Vec<SafetyCategory> = result
                .categories
                .iter()
                .copied()
                .filter(|c| crisis.contains(c))
                .collect();
            warn!(?triggered, "crisis category detected, locking session");
            inner.state = CrisisState::locked(triggered);
            inner.interventions += 1;
        }
        inner.state.active
    }

    /// Whether the session is currently locked.
    pub fn is_locked(&self) -> bool {
        self.inner.lock().expect("crisis state mutex poisoned").state.active
    }

    /// Clear the lock. `pin_verified` must come from the parental gate's
    /// PIN verification in the same call chain; this manager performs no
    /// PIN logic of its own. Returns true if the session is unlocked
    /// afterwards.
    pub fn unlock_with_pin(&self, pin_verified: bool) -> bool {
        let mut inner = self.inner.lock().expect("crisis state mutex poisoned");
        if !inner.state.active {
            return true;
        }
        if pin_verified {
            info!("crisis lock cleared by verified adult");
            inner.state = CrisisState::normal();
            true
        } else {
            false
        }
    }

    /// Total transitions into the locked state since construction.
    pub fn interventions(&self) -> u64 {
        self.inner.lock().expect("crisis state mutex poisoned").interventions
    }

    /// Snapshot of the current state for the parent dashboard.
    pub fn state(&self) -> CrisisState {
        self.inner.lock().expect("crisis state mutex poisoned").state.clone()
    }

    /// The fixed crisis card to surface while locked.
    pub fn crisis_card(&self) -> CrisisCard {
        CrisisCard::standard()
    }
}

impl Default for CrisisManager {
    fn default() -> Self {
        Self::new()
    }
}
