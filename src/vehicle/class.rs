#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The size class of an autonomous vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VehicleClass {
    Car,
    Bus,
}

impl VehicleClass {
    /// The vehicle's length along its heading.
    pub fn length(self) -> f64 {
        match self {
            VehicleClass::Car => 1.6,
            VehicleClass::Bus => 3.2,
        }
    }

    /// The vehicle's width across its heading.
    pub fn width(self) -> f64 {
        match self {
            VehicleClass::Car => 0.8,
            VehicleClass::Bus => 1.2,
        }
    }

    /// The vehicle's mass relative to the player's car.
    pub fn mass(self) -> f64 {
        match self {
            VehicleClass::Car => 1.0,
            VehicleClass::Bus => 3.0,
        }
    }
}
