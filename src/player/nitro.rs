#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The most fuel the nitro tank holds.
pub const MAX_FUEL: f64 = 100.0;

/// The attributes of the nitro boost.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NitroAttributes {
    /// The factor applied to the top speed while boosting.
    pub boost_multiplier: f64,
    /// The factor applied to the acceleration while boosting.
    pub acceleration_multiplier: f64,
    /// The fuel burnt per frame of boosting.
    pub burn_rate: f64,
    /// The fuel regained per frame once regeneration has started.
    pub regen_rate: f64,
    /// The number of frames after release before fuel starts to regenerate.
    pub regen_delay: u32,
}

/// The nitro tank and its boost state.
#[derive(Clone, Debug)]
pub struct Nitro {
    attributes: NitroAttributes,
    fuel: f64,
    active: bool,
    /// The number of frames since the nitro control was released.
    released_for: u32,
}

impl Default for NitroAttributes {
    fn default() -> Self {
        Self {
            boost_multiplier: 1.5,
            acceleration_multiplier: 2.0,
            burn_rate: 0.5,
            regen_rate: 0.2,
            regen_delay: 60,
        }
    }
}

impl Nitro {
    /// Creates a full tank.
    pub fn new(attributes: &NitroAttributes) -> Self {
        Self {
            attributes: *attributes,
            fuel: MAX_FUEL,
            active: false,
            released_for: 0,
        }
    }

    pub fn attributes(&self) -> &NitroAttributes {
        &self.attributes
    }

    /// The remaining fuel, from 0 to 100.
    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    /// Sets the remaining fuel, clamped to `[0, 100]`.
    pub fn set_fuel(&mut self, fuel: f64) {
        self.fuel = fuel.clamp(0.0, MAX_FUEL);
    }

    /// Whether the boost is currently engaged.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Updates the tank for one frame and returns whether the boost applies this frame.
    ///
    /// # Parameters
    /// * `held` - Whether the nitro control is held down
    /// * `accelerating` - Whether the driver is accelerating forwards
    pub fn update(&mut self, held: bool, accelerating: bool) -> bool {
        if !held {
            self.active = false;
            self.released_for = self.released_for.saturating_add(1);
            if self.released_for > self.attributes.regen_delay {
                self.set_fuel(self.fuel + self.attributes.regen_rate);
            }
            return false;
        }

        self.released_for = 0;
        if !accelerating || self.fuel <= 0.0 {
            self.active = false;
            return false;
        }

        self.set_fuel(self.fuel - self.attributes.burn_rate);
        // An empty tank disengages the boost, though this frame still gets it.
        self.active = self.fuel > 0.0;
        true
    }
}
