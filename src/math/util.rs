use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// The unit vector of travel for a heading in radians.
///
/// A heading of zero faces `+z`; a heading of `PI / 2` faces `+x`.
#[inline]
pub fn heading_vector(heading: f64) -> Vector2d {
    Vector2d::new(heading.sin(), heading.cos())
}

/// Moves `current` towards `target` by at most `max_delta`, without overshooting.
#[inline]
pub fn move_towards(current: f64, target: f64, max_delta: f64) -> f64 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(diff)
    }
}
