//! The capability policy engine.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{HardwareCapability, PolicyDecision, TaskEnvelope};

/// Per-attempt capability authorization.
///
/// The engine owns a mapping from task type to the capability
/// alternatives that can satisfy it (a task type mapped to several
/// capabilities is satisfied by any one of them, e.g. GPU generation
/// with a CPU fallback). Rules are evaluated top to bottom; the first
/// match wins.
pub struct CapabilityPolicyEngine {
    task_capabilities: HashMap<String, Vec<HardwareCapability>>,
}

impl CapabilityPolicyEngine {
    /// Engine with the device's standard task-type map.
    pub fn new() -> Self {
        Self {
            task_capabilities: Self::default_map(),
        }
    }

    /// Engine with a caller-supplied map.
    pub fn with_map(task_capabilities: HashMap<String, Vec<HardwareCapability>>) -> Self {
        Self { task_capabilities }
    }

    fn default_map() -> HashMap<String, Vec<HardwareCapability>> {
        HashMap::from([
            (
                "display_message".to_string(),
                vec![HardwareCapability::Display],
            ),
            (
                "show_animation".to_string(),
                vec![HardwareCapability::Display, HardwareCapability::Led],
            ),
            ("play_sound".to_string(), vec![HardwareCapability::Speaker]),
            (
                "record_audio".to_string(),
                vec![HardwareCapability::Microphone],
            ),
            ("take_photo".to_string(), vec![HardwareCapability::Camera]),
            (
                "generate_text".to_string(),
                vec![HardwareCapability::GpuCompute, HardwareCapability::CpuCompute],
            ),
            (
                "generate_image".to_string(),
                vec![HardwareCapability::GpuCompute],
            ),
        ])
    }

    /// Authorize one capability for one task attempt.
    pub fn can_use(
        &self,
        capability: HardwareCapability,
        task_type: &str,
        is_network_task: bool,
        is_explicit_request: bool,
    ) -> PolicyDecision {
        // Rule 1: nothing configured for this task type means no
        // restriction declared.
        if !self.task_capabilities.contains_key(task_type) {
            return PolicyDecision::allow(format!(
                "no capability restriction configured for task type '{task_type}'"
            ));
        }

        // Rule 2: network-originated tasks may never trigger capture,
        // explicit flag or not.
        if capability.is_sensitive() && is_network_task {
            return PolicyDecision::deny(format!(
                "{capability} may not be used by a network-originated task"
            ));
        }

        // Rule 3: capture requires a present, explicit local trigger.
        if capability.is_sensitive() && !is_explicit_request {
            return PolicyDecision::deny(format!(
                "{capability} requires an explicit request from a present user"
            ));
        }

        PolicyDecision::allow(format!("{capability} permitted for '{task_type}'"))
    }

    /// Authorize a task against its capability alternatives: any passing
    /// alternative authorizes the task. On total failure the decision
    /// carries the reason of the last alternative evaluated.
    pub fn authorize_task(
        &self,
        task: &TaskEnvelope,
        is_explicit_request: bool,
    ) -> PolicyDecision {
        let Some(alternatives) = self.task_capabilities.get(&task.task_type) else {
            return PolicyDecision::allow(format!(
                "no capability restriction configured for task type '{}'",
                task.task_type
            ));
        };

        let is_network = task.is_network_task();
        let mut last_denial = PolicyDecision::deny("no capability alternatives configured");

        for capability in alternatives {
            let decision =
                self.can_use(*capability, &task.task_type, is_network, is_explicit_request);
            if decision.allowed {
                return decision;
            }
            debug!(task_id = %task.task_id, %capability, reason = %decision.reason,
                "capability alternative denied");
            last_denial = decision;
        }
        last_denial
    }
}

impl Default for CapabilityPolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn task(task_type: &str, created_by: &str) -> TaskEnvelope {
        TaskEnvelope {
            task_id: "t-1".into(),
            task_type: task_type.into(),
            payload: Value::Null,
            created_by: created_by.into(),
        }
    }

    #[test]
    fn microphone_truth_table() {
        let engine = CapabilityPolicyEngine::new();
        let mic = HardwareCapability::Microphone;

        // Network tasks never capture, even with the explicit flag set.
        assert!(!engine.can_use(mic, "record_audio", true, true).allowed);
        assert!(!engine.can_use(mic, "record_audio", true, false).allowed);

        // Local + explicit is the only allowed combination.
        assert!(engine.can_use(mic, "record_audio", false, true).allowed);
        assert!(!engine.can_use(mic, "record_audio", false, false).allowed);
    }

    #[test]
    fn unconfigured_task_type_is_unrestricted() {
        let engine = CapabilityPolicyEngine::new();
        let decision =
            engine.can_use(HardwareCapability::Microphone, "calibrate_sensors", true, false);
        assert!(decision.allowed);
    }

    #[test]
    fn non_sensitive_capabilities_pass_without_explicit_flag() {
        let engine = CapabilityPolicyEngine::new();
        assert!(engine
            .can_use(HardwareCapability::Display, "display_message", true, false)
            .allowed);
        assert!(engine
            .can_use(HardwareCapability::Speaker, "play_sound", false, false)
            .allowed);
    }

    #[test]
    fn any_passing_alternative_authorizes_the_task() {
        let engine = CapabilityPolicyEngine::new();
        // generate_text is GPU-or-CPU; neither is sensitive.
        let decision = engine.authorize_task(&task("generate_text", "peer-7f"), false);
        assert!(decision.allowed);
    }

    #[test]
    fn total_failure_reports_last_alternative_reason() {
        let engine = CapabilityPolicyEngine::with_map(HashMap::from([(
            "surveil".to_string(),
            vec![HardwareCapability::Microphone, HardwareCapability::Camera],
        )]));

        let decision = engine.authorize_task(&task("surveil", "peer-7f"), true);
        assert!(!decision.allowed);
        // The reason is the last evaluated alternative's, by contract.
        assert!(decision.reason.contains("camera"));
    }

    #[test]
    fn local_explicit_capture_task_is_authorized() {
        let engine = CapabilityPolicyEngine::new();
        assert!(engine.authorize_task(&task("record_audio", "local"), true).allowed);
        assert!(!engine.authorize_task(&task("record_audio", "local"), false).allowed);
    }
}
