//! Per-frame debug geometry, recorded only with the `debug` feature.

use crate::collision::OrientedRect;
use crate::math::Point2d;
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

#[cfg(feature = "debug")]
fn record(value: serde_json::Value) {
    DEBUG_FRAME.with(|frame| frame.borrow_mut().push(value))
}

/// Records the sample points of a footprint.
#[allow(unused)]
pub fn debug_footprint(name: &str, footprint: &OrientedRect) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "points",
        "name": name,
        "points": footprint.sample_points().map(|p| [p.x, p.y]),
    }))
}

#[allow(unused)]
pub fn debug_line(name: &str, p1: Point2d, p2: Point2d) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "line",
        "name": name,
        "p1": [p1.x, p1.y],
        "p2": [p2.x, p2.y],
    }))
}

#[allow(unused)]
pub fn debug_circle(name: &str, centre: Point2d, radius: f64) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "circle",
        "name": name,
        "centre": [centre.x, centre.y],
        "radius": radius
    }))
}

/// Takes everything recorded since the previous call as a JSON array.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
