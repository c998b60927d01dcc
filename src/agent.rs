use crate::grid::GridSpec;
use crate::math::Point2d;
use crate::pedestrian::Pedestrian;
use crate::vehicle::{Turn, VehicleAgent};
use rand::Rng;

/// An autonomous inhabitant of the city.
#[derive(Clone, Debug)]
pub enum Agent {
    /// A car or bus on the roads.
    Vehicle(VehicleAgent),
    /// A pedestrian on the sidewalks.
    Pedestrian(Pedestrian),
}

/// What happened to an agent during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    Moved,
    Turned(Turn),
}

impl Agent {
    /// The agent's ground-plane position.
    pub fn position(&self) -> Point2d {
        match self {
            Agent::Vehicle(vehicle) => vehicle.position(),
            Agent::Pedestrian(pedestrian) => pedestrian.position(),
        }
    }

    /// The agent's heading in radians.
    pub fn heading(&self) -> f64 {
        match self {
            Agent::Vehicle(vehicle) => vehicle.heading(),
            Agent::Pedestrian(pedestrian) => pedestrian.heading(),
        }
    }

    pub fn as_vehicle(&self) -> Option<&VehicleAgent> {
        match self {
            Agent::Vehicle(vehicle) => Some(vehicle),
            Agent::Pedestrian(_) => None,
        }
    }

    pub fn as_pedestrian(&self) -> Option<&Pedestrian> {
        match self {
            Agent::Vehicle(_) => None,
            Agent::Pedestrian(pedestrian) => Some(pedestrian),
        }
    }

    pub(crate) fn as_vehicle_mut(&mut self) -> Option<&mut VehicleAgent> {
        match self {
            Agent::Vehicle(vehicle) => Some(vehicle),
            Agent::Pedestrian(_) => None,
        }
    }

    pub(crate) fn as_pedestrian_mut(&mut self) -> Option<&mut Pedestrian> {
        match self {
            Agent::Vehicle(_) => None,
            Agent::Pedestrian(pedestrian) => Some(pedestrian),
        }
    }

    /// Advances the agent by one frame.
    pub(crate) fn step<R: Rng + ?Sized>(&mut self, grid: &GridSpec, rng: &mut R) -> AgentEvent {
        match self {
            Agent::Vehicle(vehicle) => match vehicle.step(grid, rng) {
                Some(turn) => AgentEvent::Turned(turn),
                None => AgentEvent::Moved,
            },
            Agent::Pedestrian(pedestrian) => {
                pedestrian.step(grid, rng);
                AgentEvent::Moved
            }
        }
    }
}

impl From<VehicleAgent> for Agent {
    fn from(vehicle: VehicleAgent) -> Self {
        Agent::Vehicle(vehicle)
    }
}

impl From<Pedestrian> for Agent {
    fn from(pedestrian: Pedestrian) -> Self {
        Agent::Pedestrian(pedestrian)
    }
}
