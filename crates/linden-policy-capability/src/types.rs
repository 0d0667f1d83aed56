//! Capability policy types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Creator tag for tasks originating on the device itself. Anything else
/// is treated as network-originated.
pub const LOCAL_CREATOR: &str = "local";

/// Sensitivity classes of the device's hardware and compute surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareCapability {
    Display,
    Led,
    Speaker,
    Fan,
    Camera,
    Microphone,
    GpuCompute,
    CpuCompute,
}

impl HardwareCapability {
    /// Capture capabilities: these record the child's environment and
    /// carry the strictest rules.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            HardwareCapability::Microphone | HardwareCapability::Camera
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            HardwareCapability::Display => "display",
            HardwareCapability::Led => "led",
            HardwareCapability::Speaker => "speaker",
            HardwareCapability::Fan => "fan",
            HardwareCapability::Camera => "camera",
            HardwareCapability::Microphone => "microphone",
            HardwareCapability::GpuCompute => "gpu_compute",
            HardwareCapability::CpuCompute => "cpu_compute",
        }
    }
}

impl std::fmt::Display for HardwareCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one capability check. Recomputed per attempt, never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: String,
}

impl PolicyDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// A task as handed over by the task-execution layer. The policy engine
/// consumes `task_type` and `created_by` only; `payload` is opaque here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task_id: String,
    pub task_type: String,
    pub payload: Value,
    pub created_by: String,
}

impl TaskEnvelope {
    /// Provenance check: anything not created locally counts as a
    /// network task.
    pub fn is_network_task(&self) -> bool {
        self.created_by != LOCAL_CREATOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_derived_from_creator() {
        let mut task = TaskEnvelope {
            task_id: "t-1".into(),
            task_type: "record_audio".into(),
            payload: Value::Null,
            created_by: LOCAL_CREATOR.into(),
        };
        assert!(!task.is_network_task());

        task.created_by = "peer-7f".into();
        assert!(task.is_network_task());
    }

    #[test]
    fn sensitivity_covers_capture_surfaces_only() {
        assert!(HardwareCapability::Microphone.is_sensitive());
        assert!(HardwareCapability::Camera.is_sensitive());
        assert!(!HardwareCapability::Display.is_sensitive());
        assert!(!HardwareCapability::GpuCompute.is_sensitive());
    }
}
