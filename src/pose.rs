//! Read-only transforms published to the renderer after every step.

use crate::math::Point2d;
use crate::pedestrian::Posture;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position in world space and a heading about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// The heading in radians; zero faces `+z` and `PI / 2` faces `+x`.
    pub heading: f64,
}

/// The pose of a pedestrian along with its gait state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PedestrianPose {
    pub pose: Pose,
    /// The walk-cycle phase in radians, used to swing the legs.
    pub walk_phase: f64,
    pub posture: Posture,
}

impl Pose {
    /// Creates a pose on the ground plane.
    pub fn new(ground: Point2d, heading: f64) -> Self {
        Self {
            x: ground.x,
            y: 0.0,
            z: ground.y,
            heading,
        }
    }
}
