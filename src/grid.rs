//! The city grid and its implicit road network.
//!
//! Roads are never materialised. Every road, block and sidewalk coordinate is
//! derived from a [GridSpec] by the functions in this module, which are shared
//! by world generation, agent turning and collision snapping.

use crate::math::Point2d;
use crate::util::{Interval, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The dimensions of the city grid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridSpec {
    /// The number of blocks along each side of the city.
    pub grid_size: usize,
    /// The side length of a square block.
    pub block_size: f64,
    /// The width of every road.
    pub street_width: f64,
}

/// The axis an agent travels along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Travel along the world x-axis, on a road of constant z.
    Horizontal,
    /// Travel along the world z-axis, on a road of constant x.
    Vertical,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            grid_size: 15,
            block_size: 20.0,
            street_width: 10.0,
        }
    }
}

impl GridSpec {
    /// The distance between the centre lines of two neighbouring roads.
    pub fn pitch(&self) -> f64 {
        self.block_size + self.street_width
    }

    /// The side length of the whole city.
    pub fn city_size(&self) -> f64 {
        self.grid_size as f64 * self.pitch()
    }

    /// Half the side length of the city; all agents stay within `±half_size`.
    pub fn half_size(&self) -> f64 {
        0.5 * self.city_size()
    }

    /// The number of roads running in each direction.
    pub fn road_count(&self) -> usize {
        self.grid_size + 1
    }

    /// The centre-line coordinate of the road with the given index.
    ///
    /// There is no axis argument because the grid is square: road `index`
    /// sits at the same coordinate on both axes, so this is the z of a
    /// horizontal road and equally the x of a vertical one.
    pub fn road_center(&self, index: usize) -> f64 {
        index as f64 * self.pitch() - self.half_size()
    }

    /// The index of the road whose centre line is closest to `coord`,
    /// clamped to `[0, grid_size]`. Like [`GridSpec::road_center`] it takes
    /// no axis, since either world coordinate maps to roads the same way.
    pub fn nearest_road_index(&self, coord: f64) -> usize {
        let index = ((coord + self.half_size()) / self.pitch()).round();
        index.clamp(0.0, self.grid_size as f64) as usize
    }

    /// The centre-line coordinate of the road closest to `coord`.
    pub fn nearest_road(&self, coord: f64) -> f64 {
        self.road_center(self.nearest_road_index(coord))
    }

    /// Whether `coord` lies strictly within `tolerance` of a road centre line.
    pub fn is_near_road(&self, coord: f64, tolerance: f64) -> bool {
        (coord - self.nearest_road(coord)).abs() < tolerance
    }

    /// The point where the roads nearest to `point` cross.
    pub fn nearest_intersection(&self, point: Point2d) -> Point2d {
        Point2d::new(self.nearest_road(point.x), self.nearest_road(point.y))
    }

    /// The centre coordinate of the block with the given index,
    /// midway between roads `index` and `index + 1`.
    pub fn block_center(&self, index: usize) -> f64 {
        self.road_center(index) + 0.5 * self.pitch()
    }

    /// The footprint of block `(i, j)`, where `i` counts along x and `j` along z.
    pub fn block_rect(&self, i: usize, j: usize) -> Rect {
        let centre = Point2d::new(self.block_center(i), self.block_center(j));
        Rect::centred(centre, self.block_size, self.block_size)
    }

    /// The lateral distance from a road centre line to the middle of its sidewalks.
    pub fn sidewalk_offset(&self) -> f64 {
        0.4 * self.street_width
    }

    /// The square that contains the whole city.
    pub fn bounds(&self) -> Rect {
        let half = self.half_size();
        Rect {
            x: Interval::new(-half, half),
            z: Interval::new(-half, half),
        }
    }
}

impl Axis {
    /// The perpendicular axis.
    pub fn flipped(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// The component of `point` along this axis.
    pub fn along(self, point: Point2d) -> f64 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }

    /// A mutable reference to the component of `point` along this axis.
    pub fn along_mut(self, point: &mut Point2d) -> &mut f64 {
        match self {
            Axis::Horizontal => &mut point.x,
            Axis::Vertical => &mut point.y,
        }
    }

    /// The component of `point` across this axis.
    pub fn across(self, point: Point2d) -> f64 {
        self.flipped().along(point)
    }

    /// A mutable reference to the component of `point` across this axis.
    pub fn across_mut(self, point: &mut Point2d) -> &mut f64 {
        self.flipped().along_mut(point)
    }

    /// The heading, in radians, of travel along this axis in the direction of `sign`.
    ///
    /// Headings use the convention of the player vehicle: zero faces `+z`
    /// and `PI / 2` faces `+x`.
    pub fn heading(self, sign: f64) -> f64 {
        use std::f64::consts::{FRAC_PI_2, PI};
        match (self, sign >= 0.0) {
            (Axis::Horizontal, true) => FRAC_PI_2,
            (Axis::Horizontal, false) => -FRAC_PI_2,
            (Axis::Vertical, true) => 0.0,
            (Axis::Vertical, false) => PI,
        }
    }
}
