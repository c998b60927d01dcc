use crate::grid::GridSpec;
use crate::math::Point2d;
use crate::pose::Pose;
use crate::util::{Interval, Rect};
use crate::{BuildingId, BuildingSet};
use arrayvec::ArrayVec;
use itertools::iproduct;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The most buildings a single block can hold.
pub const MAX_BUILDINGS_PER_BLOCK: usize = 2;

/// A static building occupying an axis-aligned footprint inside one block.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Building {
    /// The centre of the footprint.
    pub centre: Point2d,
    /// The extent along x.
    pub width: f64,
    /// The extent along z.
    pub depth: f64,
    /// The height above the ground.
    pub height: f64,
}

/// The attributes controlling how blocks are filled with buildings.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutAttributes {
    /// The clearance kept between every building and the edge of its block.
    pub safety_margin: f64,
    /// The height range of a building that fills its block alone.
    pub single_height: Interval<f64>,
    /// The height range of each building in a two-building block.
    pub dual_height: Interval<f64>,
}

/// One cell of the city grid.
#[derive(Clone, Debug)]
pub struct Block {
    /// The block's column, counting along x.
    pub i: usize,
    /// The block's row, counting along z.
    pub j: usize,
    /// The number of buildings drawn for the block.
    pub requested: usize,
    /// The buildings actually placed in the block.
    pub buildings: ArrayVec<BuildingId, MAX_BUILDINGS_PER_BLOCK>,
}

/// The static city: its grid and every placed building.
#[derive(Clone, Debug)]
pub struct World {
    grid: GridSpec,
    safety_margin: f64,
    buildings: BuildingSet,
    blocks: Vec<Block>,
}

impl Default for LayoutAttributes {
    fn default() -> Self {
        Self {
            safety_margin: 4.0,
            single_height: Interval::new(10.0, 50.0),
            dual_height: Interval::new(5.0, 30.0),
        }
    }
}

impl Building {
    /// The building's axis-aligned footprint.
    pub fn footprint(&self) -> Rect {
        Rect::centred(self.centre, self.width, self.depth)
    }

    /// The pose handed to the renderer; buildings never rotate.
    pub fn pose(&self) -> Pose {
        Pose::new(self.centre, 0.0)
    }
}

impl World {
    /// Creates a world with the given grid and no buildings.
    pub fn empty(grid: GridSpec) -> Self {
        Self {
            grid,
            safety_margin: LayoutAttributes::default().safety_margin,
            buildings: BuildingSet::default(),
            blocks: vec![],
        }
    }

    /// Procedurally fills every block of the grid with one or two buildings.
    ///
    /// A building of a two-building block whose footprint would leave the
    /// block's safe area, or overlap its sibling, is skipped rather than
    /// redrawn, so such blocks may hold fewer buildings than requested.
    pub fn generate<R: Rng + ?Sized>(
        grid: GridSpec,
        attributes: &LayoutAttributes,
        rng: &mut R,
    ) -> Self {
        let mut world = Self {
            safety_margin: attributes.safety_margin,
            ..Self::empty(grid)
        };
        let mut skipped = 0;

        for (i, j) in iproduct!(0..grid.grid_size, 0..grid.grid_size) {
            let requested = rng.gen_range(1..=MAX_BUILDINGS_PER_BLOCK);
            let candidates = world.layout_block(attributes, i, j, requested, rng);
            skipped += requested - candidates.len();
            let buildings = candidates
                .into_iter()
                .map(|building| world.buildings.insert(building))
                .collect();
            world.blocks.push(Block {
                i,
                j,
                requested,
                buildings,
            });
        }

        log::info!(
            "generated {} buildings across {} blocks ({} placements skipped)",
            world.buildings.len(),
            world.blocks.len(),
            skipped
        );
        world
    }

    /// Registers an extra building, e.g. for a hand-built scenario.
    pub fn add_building(&mut self, building: Building) -> BuildingId {
        self.buildings.insert(building)
    }

    /// The grid the world was built on.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// The area of block `(i, j)` that buildings may occupy.
    pub fn safe_area(&self, i: usize, j: usize) -> Rect {
        self.grid.block_rect(i, j).shrink(self.safety_margin)
    }

    /// Gets a building by ID.
    pub fn get_building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id)
    }

    /// Returns an iterator over every building in the registry.
    pub fn iter_buildings(&self) -> impl Iterator<Item = (BuildingId, &Building)> {
        self.buildings.iter()
    }

    /// Returns an iterator over the blocks of the grid.
    pub fn iter_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// The number of buildings in the registry.
    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    /// Draws the buildings for a single block.
    fn layout_block<R: Rng + ?Sized>(
        &self,
        attributes: &LayoutAttributes,
        i: usize,
        j: usize,
        requested: usize,
        rng: &mut R,
    ) -> ArrayVec<Building, MAX_BUILDINGS_PER_BLOCK> {
        let block_size = self.grid.block_size;
        let centre = Point2d::new(self.grid.block_center(i), self.grid.block_center(j));
        let safe = self.safe_area(i, j);
        let max_dim = block_size - 2.0 * attributes.safety_margin;
        let mut placed: ArrayVec<Building, MAX_BUILDINGS_PER_BLOCK> = ArrayVec::new();

        if requested == 1 {
            let size = f64::max(f64::min(0.85 * block_size, max_dim), 0.75 * max_dim);
            placed.push(Building {
                centre,
                width: size,
                depth: size,
                height: sample(rng, attributes.single_height),
            });
            return placed;
        }

        let sub_block = f64::min(block_size / 1.8, 0.8 * max_dim);
        let max_offset = (max_dim - sub_block) / 2.5;
        for _ in 0..requested {
            let offset_x = (rng.gen::<f64>() - 0.5) * max_offset * 2.0;
            let offset_z = (rng.gen::<f64>() - 0.5) * max_offset * 2.0;
            let height = sample(rng, attributes.dual_height);
            let width = sub_block * (0.75 + rng.gen::<f64>() * 0.2);
            let depth = sub_block * (0.75 + rng.gen::<f64>() * 0.2);
            let building = Building {
                centre: Point2d::new(centre.x + offset_x, centre.y + offset_z),
                width,
                depth,
                height,
            };

            let footprint = building.footprint();
            if !safe.encloses(&footprint) {
                log::trace!("block ({i}, {j}): building leaves the safe area, skipped");
                continue;
            }
            if placed
                .iter()
                .any(|sibling| sibling.footprint().overlaps(&footprint))
            {
                log::trace!("block ({i}, {j}): building overlaps its sibling, skipped");
                continue;
            }
            placed.push(building);
        }
        placed
    }
}

/// Samples uniformly from `[range.min, range.max)`, or returns `range.min` for an empty range.
fn sample<R: Rng + ?Sized>(rng: &mut R, range: Interval<f64>) -> f64 {
    range.min + rng.gen::<f64>() * f64::max(range.length(), 0.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn overlapping_sibling_is_skipped() {
        let world = World::empty(GridSpec::default());
        // Every draw is zero, so both buildings land in the same place.
        let mut rng = StepRng::new(0, 0);
        let placed = world.layout_block(&LayoutAttributes::default(), 3, 4, 2, &mut rng);
        assert_eq!(placed.len(), 1);

        let safe = world.safe_area(3, 4);
        assert!(safe.encloses(&placed[0].footprint()));
        assert_approx_eq!(placed[0].width, 7.2);
        assert_approx_eq!(placed[0].centre.x, world.grid().block_center(3) - 0.96);
    }

    #[test]
    fn building_outside_safe_area_is_skipped() {
        let world = World::empty(GridSpec::default());
        // A thinner margin gives larger, further offset buildings than the
        // world's own safe area admits.
        let attributes = LayoutAttributes {
            safety_margin: 1.0,
            ..Default::default()
        };
        let mut rng = StepRng::new(0, 0);
        let placed = world.layout_block(&attributes, 3, 4, 2, &mut rng);
        assert!(placed.is_empty());
    }

    #[test]
    fn every_block_gets_at_least_one_building() {
        let mut rng = StdRng::seed_from_u64(7);
        let world = World::generate(GridSpec::default(), &LayoutAttributes::default(), &mut rng);
        assert_eq!(world.iter_blocks().count(), 15 * 15);
        for block in world.iter_blocks() {
            assert!(!block.buildings.is_empty());
            assert!(block.buildings.len() <= block.requested);
        }
    }

    #[test]
    fn single_building_fills_safe_area() {
        let mut rng = StdRng::seed_from_u64(3);
        let world = World::generate(GridSpec::default(), &LayoutAttributes::default(), &mut rng);
        let block = world
            .iter_blocks()
            .find(|block| block.requested == 1)
            .expect("some block requests one building");
        let building = world.get_building(block.buildings[0]).unwrap();
        assert_eq!(building.width, 12.0);
        assert_eq!(building.depth, 12.0);
        assert!(building.height >= 10.0 && building.height < 50.0);
    }

    #[test]
    fn empty_world_has_no_buildings() {
        let world = World::empty(GridSpec::default());
        assert_eq!(world.building_count(), 0);
        assert_eq!(world.iter_blocks().count(), 0);
    }
}
