//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use crate::math::Point2d;
use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval overlaps with the other.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max > other.min && other.max > self.min
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if the other interval lies entirely within this one.
    pub fn encloses(&self, other: &Self) -> bool {
        other.min >= self.min && other.max <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Creates an interval with the given centre and radius.
    pub fn disc(centre: T, radius: T) -> Self {
        Self {
            min: centre - radius,
            max: centre + radius,
        }
    }

    /// Shrinks the interval by `amount` on both ends.
    pub fn shrink(&self, amount: T) -> Self {
        Self {
            min: self.min + amount,
            max: self.max - amount,
        }
    }

    /// Clamps a value into the interval.
    pub fn clamp(&self, value: T) -> T {
        value.max(self.min).min(self.max)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// An axis-aligned rectangle on the ground plane.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// The extent along the world x-axis.
    pub x: Interval<f64>,
    /// The extent along the world z-axis.
    pub z: Interval<f64>,
}

impl Rect {
    /// Creates a rectangle from its centre and full dimensions.
    pub fn centred(centre: Point2d, width: f64, depth: f64) -> Self {
        Self {
            x: Interval::disc(centre.x, 0.5 * width),
            z: Interval::disc(centre.y, 0.5 * depth),
        }
    }

    /// Returns true if the point lies inside or on the edge of the rectangle.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.z.contains(point.y)
    }

    /// Returns true if the interiors of the two rectangles intersect.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x.overlaps(&other.x) && self.z.overlaps(&other.z)
    }

    /// Returns true if the other rectangle lies entirely within this one.
    pub fn encloses(&self, other: &Rect) -> bool {
        self.x.encloses(&other.x) && self.z.encloses(&other.z)
    }

    /// Shrinks the rectangle by `margin` on every side.
    pub fn shrink(&self, margin: f64) -> Rect {
        Rect {
            x: self.x.shrink(margin),
            z: self.z.shrink(margin),
        }
    }

    /// Clamps a point into the rectangle.
    pub fn clamp(&self, point: Point2d) -> Point2d {
        Point2d::new(self.x.clamp(point.x), self.z.clamp(point.y))
    }
}
