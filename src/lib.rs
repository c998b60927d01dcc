pub use agent::{Agent, AgentEvent};
pub use cgmath;
pub use collision::{Collision, CollisionAttributes, CollisionKind, Impact, Obstacle, OrientedRect};
pub use events::SimEvent;
pub use grid::{Axis, GridSpec};
pub use input::DriverInput;
pub use pedestrian::{Pedestrian, Posture};
pub use player::{Nitro, NitroAttributes, PlayerAttributes, PlayerVehicle};
pub use population::{Population, PopulationAttributes, SpeedTier};
pub use pose::{PedestrianPose, Pose};
pub use simulation::{Dashboard, Simulation, SimulationAttributes};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::{Interval, Rect};
pub use vehicle::{Turn, VehicleAgent, VehicleAttributes, VehicleClass};
pub use world::{Block, Building, LayoutAttributes, World};

mod agent;
pub mod collision;
mod debug;
mod events;
pub mod grid;
mod input;
pub mod math;
pub mod pedestrian;
pub mod player;
pub mod population;
mod pose;
mod simulation;
mod util;
pub mod vehicle;
pub mod world;

new_key_type! {
    /// Unique ID of a [Building].
    pub struct BuildingId;
    /// Unique ID of an [Agent].
    pub struct AgentId;
}

type BuildingSet = SlotMap<BuildingId, Building>;
type AgentSet = SlotMap<AgentId, Agent>;
