use crate::math::{heading_vector, project_local, rot90, Point2d, Vector2d};

/// A rectangle on the ground plane aligned to a heading rather than to the world axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    /// The centre of the rectangle.
    pub centre: Point2d,
    /// The unit vector pointing out of the front of the rectangle.
    pub forward: Vector2d,
    /// Half the extent along `forward`.
    pub half_length: f64,
    /// Half the extent across `forward`.
    pub half_width: f64,
}

impl OrientedRect {
    /// Creates the footprint of an object of the given size facing `heading`.
    pub fn new(centre: Point2d, heading: f64, length: f64, width: f64) -> Self {
        Self {
            centre,
            forward: heading_vector(heading),
            half_length: 0.5 * length,
            half_width: 0.5 * width,
        }
    }

    /// The unit vector pointing out of the left side of the rectangle.
    pub fn left(&self) -> Vector2d {
        -rot90(self.forward)
    }

    /// The larger half-extent, used for coarse distance checks.
    pub fn reach(&self) -> f64 {
        self.half_length.max(self.half_width)
    }

    /// Returns true if the point lies inside or on the edge of the rectangle.
    pub fn contains(&self, point: Point2d) -> bool {
        let local = project_local(point, self.centre, self.left(), self.forward);
        local.x.abs() <= self.half_width && local.y.abs() <= self.half_length
    }

    /// The points sampled when testing the rectangle against other shapes:
    /// the four corners, the centres of the front and back edges and the
    /// midpoints of the two sides.
    pub fn sample_points(&self) -> [Point2d; 8] {
        let f = self.forward * self.half_length;
        let l = self.left() * self.half_width;
        let c = self.centre;
        [
            c + f + l,
            c + f,
            c + f - l,
            c - f + l,
            c - f,
            c - f - l,
            c + l,
            c - l,
        ]
    }

    /// Tests the rectangles against each other by sampling each one's points
    /// inside the other, after a coarse distance check.
    pub fn intersects(&self, other: &OrientedRect) -> bool {
        use cgmath::MetricSpace;
        let reach = self.reach() + other.reach();
        if self.centre.distance2(other.centre) > reach * reach {
            return false;
        }
        self.sample_points().iter().any(|p| other.contains(*p))
            || other.sample_points().iter().any(|p| self.contains(*p))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn samples_follow_heading() {
        let rect = OrientedRect::new(Point2d::new(0.0, 0.0), FRAC_PI_2, 2.0, 1.0);
        let front = rect.sample_points()[1];
        assert_approx_eq!(front.x, 1.0);
        assert_approx_eq!(front.y, 0.0);
        let left = rect.sample_points()[6];
        assert_approx_eq!(left.x, 0.0);
        assert_approx_eq!(left.y, -0.5);
    }

    #[test]
    fn contains_respects_orientation() {
        let rect = OrientedRect::new(Point2d::new(10.0, 10.0), 0.0, 4.0, 1.0);
        assert!(rect.contains(Point2d::new(10.0, 11.9)));
        assert!(!rect.contains(Point2d::new(11.9, 10.0)));
        let turned = OrientedRect::new(Point2d::new(10.0, 10.0), FRAC_PI_2, 4.0, 1.0);
        assert!(turned.contains(Point2d::new(11.9, 10.0)));
    }

    #[test]
    fn crossing_rects_intersect() {
        let a = OrientedRect::new(Point2d::new(0.0, 0.0), 0.0, 2.0, 1.0);
        let b = OrientedRect::new(Point2d::new(0.0, 1.2), FRAC_PI_2, 3.2, 1.2);
        assert!(a.intersects(&b));
        let far = OrientedRect::new(Point2d::new(0.0, 5.0), FRAC_PI_2, 3.2, 1.2);
        assert!(!a.intersects(&far));
    }
}
