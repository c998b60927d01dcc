pub use self::class::VehicleClass;
use crate::collision::OrientedRect;
use crate::grid::{Axis, GridSpec};
use crate::math::{Point2d, Vector2d};
use crate::pose::Pose;
use crate::util::Rect;
use rand::Rng;

mod class;

/// The number of frames a vehicle must travel before it may turn voluntarily again.
pub const MIN_TURN_INTERVAL: u32 = 100;

/// How close, along its axis of travel, a vehicle must be to a crossing road to turn onto it.
const INTERSECTION_TOLERANCE: f64 = 1.0;

/// How far inside the city edge a vehicle is forced to turn.
const EDGE_CLEARANCE: f64 = 2.0;

/// An autonomous car or bus driving along the road grid.
#[derive(Clone, Debug)]
pub struct VehicleAgent {
    /// The vehicle's size class.
    class: VehicleClass,
    /// The axis the vehicle is travelling along.
    axis: Axis,
    /// The velocity along `axis`; its sign is the direction of travel.
    speed: f64,
    /// The ground-plane position of the centre of the vehicle.
    position: Point2d,
    /// The number of frames since the vehicle last turned.
    since_turn: u32,
    /// The chance of turning at each eligible intersection.
    turn_probability: f64,
}

/// The attributes of a new vehicle.
#[derive(Clone, Copy, Debug)]
pub struct VehicleAttributes {
    pub class: VehicleClass,
    pub axis: Axis,
    /// The signed speed along `axis`.
    pub speed: f64,
    pub position: Point2d,
    pub turn_probability: f64,
}

/// The reason a vehicle changed axis during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// A voluntary turn at an interior intersection.
    Intersection,
    /// A forced turn at the edge of the city.
    Boundary,
}

impl VehicleAgent {
    /// Creates a new vehicle.
    pub fn new(attributes: &VehicleAttributes) -> Self {
        Self {
            class: attributes.class,
            axis: attributes.axis,
            speed: attributes.speed,
            position: attributes.position,
            since_turn: 0,
            turn_probability: attributes.turn_probability.clamp(0.0, 1.0),
        }
    }

    /// The vehicle's size class.
    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// The axis the vehicle is travelling along.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The signed speed along the vehicle's axis, in units per frame.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The ground-plane position of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The heading in radians, derived from the axis and direction of travel.
    pub fn heading(&self) -> f64 {
        self.axis.heading(self.speed)
    }

    /// The number of frames since the vehicle last turned.
    pub fn since_turn(&self) -> u32 {
        self.since_turn
    }

    /// Overrides the turn timer, e.g. to set up a scenario.
    pub fn set_since_turn(&mut self, frames: u32) {
        self.since_turn = frames;
    }

    /// The vehicle's velocity as a world-space vector.
    pub fn velocity(&self) -> Vector2d {
        match self.axis {
            Axis::Horizontal => Vector2d::new(self.speed, 0.0),
            Axis::Vertical => Vector2d::new(0.0, self.speed),
        }
    }

    /// The vehicle's oriented footprint.
    pub fn footprint(&self) -> OrientedRect {
        OrientedRect::new(
            self.position,
            self.heading(),
            self.class.length(),
            self.class.width(),
        )
    }

    /// The pose handed to the renderer.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.heading())
    }

    /// Advances the vehicle by one frame, turning at intersections and city edges.
    pub(crate) fn step<R: Rng + ?Sized>(&mut self, grid: &GridSpec, rng: &mut R) -> Option<Turn> {
        self.since_turn = self.since_turn.saturating_add(1);
        *self.axis.along_mut(&mut self.position) += self.speed;

        let mut turn = None;
        if self.turn_at_intersection(grid, rng) {
            turn = Some(Turn::Intersection);
        }
        if self.turn_at_boundary(grid, rng) {
            turn = Some(Turn::Boundary);
        }
        turn
    }

    /// Moves the vehicle by `delta`, keeping it within `bounds`.
    pub(crate) fn push(&mut self, delta: Vector2d, bounds: &Rect) {
        self.position = bounds.clamp(self.position + delta);
    }

    /// Randomly turns onto the crossing road when close to an intersection.
    fn turn_at_intersection<R: Rng + ?Sized>(&mut self, grid: &GridSpec, rng: &mut R) -> bool {
        let along = self.axis.along(self.position);
        if self.since_turn <= MIN_TURN_INTERVAL
            || !grid.is_near_road(along, INTERSECTION_TOLERANCE)
            || !rng.gen_bool(self.turn_probability)
        {
            return false;
        }

        self.position = grid.nearest_intersection(self.position);
        self.turn(rng);
        true
    }

    /// Turns the vehicle when it is heading out of the city.
    fn turn_at_boundary<R: Rng + ?Sized>(&mut self, grid: &GridSpec, rng: &mut R) -> bool {
        let limit = grid.half_size() - EDGE_CLEARANCE;
        let along = self.axis.along(self.position);
        let outward = (self.speed > 0.0 && along > limit) || (self.speed < 0.0 && along < -limit);
        if !outward {
            return false;
        }

        *self.axis.along_mut(&mut self.position) = limit.copysign(self.speed);
        let across = self.axis.across_mut(&mut self.position);
        *across = grid.nearest_road(*across);
        log::trace!("{:?} forced to turn at the city edge {:?}", self.class, self.position);
        self.turn(rng);
        true
    }

    /// Switches to the perpendicular axis, heading left or right at random.
    fn turn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.axis = self.axis.flipped();
        self.speed = self.speed.abs() * sign;
        self.since_turn = 0;
    }
}
