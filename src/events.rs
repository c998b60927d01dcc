use crate::collision::CollisionKind;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A discrete event raised during a step, for the host's audio layer.
///
/// Events are buffered for the duration of one frame; whatever the host
/// has not taken by the next step is dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SimEvent {
    /// The player's speed changed, in km/h.
    EngineSpeedChanged { speed_kmh: f64 },
    BrakeEngaged,
    BrakeReleased,
    CollisionOccurred { kind: CollisionKind, impact_force: f64 },
    HornPressed,
    NitroEngaged,
    NitroDisengaged,
    /// The player's health reached zero.
    Wrecked,
}
