use crate::grid::{Axis, GridSpec};
use crate::math::{Point2d, Vector2d};
use crate::pose::{PedestrianPose, Pose};
use crate::util::Rect;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// The chance per frame that a pedestrian at a corner switches to the crossing sidewalk.
pub const SWITCH_PROBABILITY: f64 = 0.02;

/// How far the walk cycle advances each frame, in radians.
pub const WALK_PHASE_STEP: f64 = 0.1;

/// The number of frames a knocked-down pedestrian stays down.
pub const RECOVERY_FRAMES: u32 = 180;

/// The factor applied to a pedestrian's speed when knocked down.
const KNOCKDOWN_SPEED_FACTOR: f64 = 0.1;

/// How close to a corner, on both axes, a pedestrian must be to switch sidewalks.
const CORNER_TOLERANCE: f64 = 1.0;

/// How far inside the city edge a pedestrian turns around.
const EDGE_CLEARANCE: f64 = 1.0;

/// Whether a pedestrian is on its feet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Posture {
    Standing,
    /// Knocked down by the player; gets back up after the given number of frames.
    Down { frames_left: u32 },
}

/// A pedestrian walking along the sidewalks beside the roads.
#[derive(Clone, Debug)]
pub struct Pedestrian {
    /// The orientation of the sidewalk the pedestrian is on.
    axis: Axis,
    /// The walking direction in radians: `0` or `PI` on horizontal sidewalks,
    /// `PI / 2` or `-PI / 2` on vertical ones.
    direction: f64,
    /// The walking speed in units per frame.
    speed: f64,
    /// The gait animation phase in radians.
    walk_phase: f64,
    /// The ground-plane position.
    position: Point2d,
    posture: Posture,
}

impl Pedestrian {
    /// Places a new pedestrian on a sidewalk of road `road`, on the side given by `side`.
    ///
    /// Sidewalks that would lie outside the city are mirrored to the inner side of the road.
    pub fn on_sidewalk(
        grid: &GridSpec,
        axis: Axis,
        road: usize,
        side: f64,
        along: f64,
        forward: bool,
        speed: f64,
    ) -> Self {
        let mut position = Point2d::new(0.0, 0.0);
        *axis.along_mut(&mut position) = along.clamp(-grid.half_size(), grid.half_size());
        *axis.across_mut(&mut position) = sidewalk_line(grid, grid.road_center(road), side);
        Self {
            axis,
            direction: walking_direction(axis, forward),
            speed: speed.max(0.0),
            walk_phase: 0.0,
            position,
            posture: Posture::Standing,
        }
    }

    /// Sets the initial walk-cycle phase.
    pub fn with_walk_phase(mut self, phase: f64) -> Self {
        self.walk_phase = phase.rem_euclid(TAU);
        self
    }

    /// The orientation of the sidewalk the pedestrian is on.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The walking direction angle.
    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn position(&self) -> Point2d {
        self.position
    }

    pub fn walk_phase(&self) -> f64 {
        self.walk_phase
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }

    /// Whether the pedestrian has been knocked down and is still on the ground.
    pub fn is_down(&self) -> bool {
        matches!(self.posture, Posture::Down { .. })
    }

    /// The heading in the shared convention, where zero faces `+z`.
    pub fn heading(&self) -> f64 {
        f64::atan2(self.direction.cos(), self.direction.sin())
    }

    /// The pose handed to the renderer.
    pub fn pose(&self) -> PedestrianPose {
        PedestrianPose {
            pose: Pose::new(self.position, self.heading()),
            walk_phase: self.walk_phase,
            posture: self.posture,
        }
    }

    /// Advances the pedestrian by one frame.
    pub(crate) fn step<R: Rng + ?Sized>(&mut self, grid: &GridSpec, rng: &mut R) {
        self.walk_phase = (self.walk_phase + WALK_PHASE_STEP).rem_euclid(TAU);

        match self.posture {
            Posture::Down { frames_left: 0 } => self.posture = Posture::Standing,
            Posture::Down { frames_left } => {
                self.posture = Posture::Down {
                    frames_left: frames_left - 1,
                };
                return;
            }
            Posture::Standing => {}
        }

        match self.axis {
            Axis::Horizontal => self.position.x += self.direction.cos() * self.speed,
            Axis::Vertical => self.position.y += self.direction.sin() * self.speed,
        }

        self.turn_at_edge(grid);

        if self.at_corner(grid) && rng.gen_bool(SWITCH_PROBABILITY) {
            self.switch_sidewalk(grid, rng);
        }
    }

    /// Knocks the pedestrian down, moving it by `delta` within `bounds`.
    pub(crate) fn knock_down(&mut self, delta: Vector2d, bounds: &Rect) {
        self.position = bounds.clamp(self.position + delta);
        self.speed *= KNOCKDOWN_SPEED_FACTOR;
        self.posture = Posture::Down {
            frames_left: RECOVERY_FRAMES,
        };
    }

    /// Reverses direction at the edges of the city.
    fn turn_at_edge(&mut self, grid: &GridSpec) {
        let limit = grid.half_size() - EDGE_CLEARANCE;
        let along = self.axis.along_mut(&mut self.position);
        if *along > limit {
            *along = limit;
            self.direction = walking_direction(self.axis, false);
        } else if *along < -limit {
            *along = -limit;
            self.direction = walking_direction(self.axis, true);
        }
    }

    /// Whether the pedestrian stands where two sidewalks cross.
    fn at_corner(&self, grid: &GridSpec) -> bool {
        sidewalk_distance(grid, self.position.x) < CORNER_TOLERANCE
            && sidewalk_distance(grid, self.position.y) < CORNER_TOLERANCE
    }

    /// Steps onto the crossing sidewalk at the current corner and picks a new direction.
    fn switch_sidewalk<R: Rng + ?Sized>(&mut self, grid: &GridSpec, rng: &mut R) {
        let axis = self.axis.flipped();
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let across = axis.across_mut(&mut self.position);
        *across = sidewalk_line(grid, grid.nearest_road(*across), side);
        self.axis = axis;
        self.direction = walking_direction(axis, rng.gen_bool(0.5));
    }
}

/// The walking direction along `axis`, towards `+` when `forward`.
fn walking_direction(axis: Axis, forward: bool) -> f64 {
    match (axis, forward) {
        (Axis::Horizontal, true) => 0.0,
        (Axis::Horizontal, false) => PI,
        (Axis::Vertical, true) => FRAC_PI_2,
        (Axis::Vertical, false) => -FRAC_PI_2,
    }
}

/// The centre line of the sidewalk on side `side` of the road at `road`,
/// mirrored inwards if it would lie outside the city.
fn sidewalk_line(grid: &GridSpec, road: f64, side: f64) -> f64 {
    let offset = grid.sidewalk_offset().copysign(side);
    if (road + offset).abs() > grid.half_size() {
        road - offset
    } else {
        road + offset
    }
}

/// The distance from `coord` to the nearest sidewalk centre line.
fn sidewalk_distance(grid: &GridSpec, coord: f64) -> f64 {
    let from_road = (coord - grid.nearest_road(coord)).abs();
    (from_road - grid.sidewalk_offset()).abs()
}
