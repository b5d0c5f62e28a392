//! Run events
//!
//! Discrete pulses queued during a tick for UI, audio and haptics hosts.

use serde::{Deserialize, Serialize};

use super::entities::PickupKind;
use super::state::Lane;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Energy drained to zero
    #[serde(rename = "Sunlight depleted")]
    SunlightDepleted,
    /// Hit an obstacle
    #[serde(rename = "Collision detected")]
    CollisionDetected,
}

impl EndReason {
    /// User-facing reason string
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::SunlightDepleted => "Sunlight depleted",
            EndReason::CollisionDetected => "Collision detected",
        }
    }
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    PickupCollected { kind: PickupKind },
    BoostTriggered,
    Collision { lane: Lane },
    RegionEntered { region: u32 },
    RunEnded { reason: EndReason, final_score: u64 },
}
