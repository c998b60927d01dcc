pub use self::nitro::{Nitro, NitroAttributes};
use crate::collision::OrientedRect;
use crate::input::DriverInput;
use crate::math::{heading_vector, move_towards, Point2d};
use crate::pose::Pose;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod nitro;

/// The most health the player's car can have.
pub const MAX_HEALTH: f64 = 100.0;

/// The attributes of the player's car.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayerAttributes {
    /// The top forward speed, in units per frame.
    pub max_speed: f64,
    /// The speed gained per frame of throttle.
    pub acceleration: f64,
    /// The speed lost per frame when coasting.
    pub deceleration: f64,
    /// The speed lost per frame when braking.
    pub brake_strength: f64,
    /// The top reverse speed is `max_speed / reverse_ratio`.
    pub reverse_ratio: f64,
    /// The turn rate limit at a standstill, in radians per frame.
    pub max_turn_rate: f64,
    /// The turn rate gained per frame of steering.
    pub turn_acceleration: f64,
    /// The turn rate lost per frame without steering.
    pub turn_deceleration: f64,
    /// The fraction of the turn rate limit lost at top speed.
    pub speed_turn_penalty: f64,
    /// The car may not leave the square `±ground_half_size`.
    pub ground_half_size: f64,
    /// Converts units per frame to the km/h shown on the dashboard.
    pub speed_conversion: f64,
    /// The car's length along its heading.
    pub length: f64,
    /// The car's width across its heading.
    pub width: f64,
}

/// The user-controlled car.
#[derive(Clone, Debug)]
pub struct PlayerVehicle {
    attributes: PlayerAttributes,
    /// The ground-plane position of the centre of the car.
    position: Point2d,
    /// The heading in radians; zero faces `+z`.
    heading: f64,
    /// The signed speed, positive forwards.
    speed: f64,
    /// The signed rate of change of heading, in radians per frame.
    turn_rate: f64,
    /// The remaining health, from 0 to 100.
    health: f64,
    nitro: Nitro,
    /// The number of frames during which collisions are ignored and the
    /// throttle and brake have no effect.
    collision_cooldown: u32,
    /// The distance driven so far, in km.
    total_distance_km: f64,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self {
            max_speed: 0.35,
            acceleration: 0.001,
            deceleration: 0.001,
            brake_strength: 0.01,
            reverse_ratio: 1.5,
            max_turn_rate: 0.04,
            turn_acceleration: 0.002,
            turn_deceleration: 0.003,
            speed_turn_penalty: 0.6,
            ground_half_size: 250.0,
            speed_conversion: 200.0,
            length: 2.0,
            width: 1.0,
        }
    }
}

impl PlayerVehicle {
    /// Creates a stationary car at `position` facing `heading`.
    pub fn new(
        attributes: &PlayerAttributes,
        nitro: &NitroAttributes,
        position: Point2d,
        heading: f64,
    ) -> Self {
        Self {
            attributes: *attributes,
            position,
            heading,
            speed: 0.0,
            turn_rate: 0.0,
            health: MAX_HEALTH,
            nitro: Nitro::new(nitro),
            collision_cooldown: 0,
            total_distance_km: 0.0,
        }
    }

    pub fn attributes(&self) -> &PlayerAttributes {
        &self.attributes
    }

    pub fn position(&self) -> Point2d {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The signed speed in units per frame, positive forwards.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The current rate of change of heading, in radians per frame.
    pub fn turn_rate(&self) -> f64 {
        self.turn_rate
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    /// Whether the car's health has run out.
    pub fn is_wrecked(&self) -> bool {
        self.health <= 0.0
    }

    pub fn nitro(&self) -> &Nitro {
        &self.nitro
    }

    /// The number of frames left in the current collision window.
    pub fn collision_cooldown(&self) -> u32 {
        self.collision_cooldown
    }

    /// Whether the car is recovering from a collision.
    pub fn is_colliding(&self) -> bool {
        self.collision_cooldown > 0
    }

    /// The speed shown on the speedometer.
    pub fn speed_kmh(&self) -> f64 {
        self.speed.abs() * self.attributes.speed_conversion
    }

    /// The distance shown on the odometer.
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    /// The car's oriented footprint.
    pub fn footprint(&self) -> OrientedRect {
        OrientedRect::new(
            self.position,
            self.heading,
            self.attributes.length,
            self.attributes.width,
        )
    }

    /// The pose handed to the renderer.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.heading)
    }

    /// The turn rate limit at the current speed; the faster the car, the lower the limit.
    pub fn effective_max_turn_rate(&self) -> f64 {
        let a = &self.attributes;
        let penalty = f64::min(self.speed.abs() / a.max_speed * a.speed_turn_penalty, a.speed_turn_penalty);
        a.max_turn_rate * (1.0 - penalty)
    }

    /// Sets the speed, clamped between the top reverse and boosted forward speeds.
    pub fn set_speed(&mut self, speed: f64) {
        let a = &self.attributes;
        let max = a.max_speed * self.nitro.attributes().boost_multiplier.max(1.0);
        self.speed = speed.clamp(-a.max_speed / a.reverse_ratio, max);
    }

    /// Moves the car, keeping it on the ground.
    pub fn set_position(&mut self, position: Point2d) {
        let half = self.attributes.ground_half_size;
        self.position = Point2d::new(position.x.clamp(-half, half), position.y.clamp(-half, half));
    }

    /// Starts a collision window of the given number of frames.
    pub(crate) fn start_collision_cooldown(&mut self, frames: u32) {
        self.collision_cooldown = frames;
    }

    /// Counts down the collision window; returns `true` while it is still open.
    pub(crate) fn tick_collision_cooldown(&mut self) -> bool {
        if self.collision_cooldown == 0 {
            return false;
        }
        self.collision_cooldown -= 1;
        true
    }

    /// Removes `amount` health, returning `true` if this wrecked the car.
    pub(crate) fn apply_damage(&mut self, amount: f64) -> bool {
        let was_wrecked = self.is_wrecked();
        self.health = (self.health - amount).clamp(0.0, MAX_HEALTH);
        !was_wrecked && self.is_wrecked()
    }

    /// Integrates the driver's input over one frame.
    ///
    /// # Parameters
    /// * `input` - The driver's intents for this frame
    /// * `dt` - The wall time since the previous frame in seconds, used for the odometer
    pub fn step(&mut self, input: &DriverInput, dt: f64) {
        let boosting = self.nitro.update(input.nitro, input.forward && !self.is_colliding());
        if self.is_colliding() {
            self.speed = move_towards(self.speed, 0.0, self.attributes.deceleration);
        } else {
            self.apply_throttle(input, boosting);
        }
        self.apply_steering(input);
        self.integrate(dt);
    }

    /// Applies the throttle, reverse and brake.
    fn apply_throttle(&mut self, input: &DriverInput, boosting: bool) {
        let a = &self.attributes;
        let (top_speed, acceleration) = if boosting {
            let nitro = self.nitro.attributes();
            (
                a.max_speed * nitro.boost_multiplier,
                a.acceleration * nitro.acceleration_multiplier,
            )
        } else {
            (a.max_speed, a.acceleration)
        };

        self.speed = if input.forward {
            if self.speed > top_speed {
                // Ease back down after a boost ends.
                move_towards(self.speed, top_speed, a.deceleration)
            } else {
                f64::min(self.speed + acceleration, top_speed)
            }
        } else if input.backward {
            f64::max(self.speed - a.acceleration, -a.max_speed / a.reverse_ratio)
        } else {
            move_towards(self.speed, 0.0, a.deceleration)
        };

        if input.brake {
            self.speed = move_towards(self.speed, 0.0, a.brake_strength);
        }
    }

    /// Ramps the turn rate towards the steering input, within the speed-dependent limit.
    fn apply_steering(&mut self, input: &DriverInput) {
        let a = &self.attributes;
        let limit = self.effective_max_turn_rate();
        self.turn_rate = match input.steering() {
            1 => f64::min(self.turn_rate + a.turn_acceleration, limit),
            -1 => f64::max(self.turn_rate - a.turn_acceleration, -limit),
            _ => move_towards(self.turn_rate, 0.0, a.turn_deceleration),
        };
    }

    /// Integrates the heading, position and odometer.
    fn integrate(&mut self, dt: f64) {
        if self.speed != 0.0 {
            self.heading += self.turn_rate;
            self.set_position(self.position + heading_vector(self.heading) * self.speed);
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.total_distance_km += self.speed.abs() * dt * (self.attributes.speed_conversion / 3600.0);
    }
}
