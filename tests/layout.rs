//! Tests of the procedural city layout.

use city_drive_sim::{GridSpec, LayoutAttributes, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TOLERANCE: f64 = 1e-9;

fn check_layout(world: &World) {
    for block in world.iter_blocks() {
        let safe = world.safe_area(block.i, block.j).shrink(-TOLERANCE);
        let footprints: Vec<_> = block
            .buildings
            .iter()
            .map(|id| world.get_building(*id).unwrap().footprint())
            .collect();

        assert!(!footprints.is_empty());
        for (n, footprint) in footprints.iter().enumerate() {
            assert!(safe.encloses(footprint), "block ({}, {})", block.i, block.j);
            for sibling in &footprints[n + 1..] {
                assert!(!footprint.shrink(TOLERANCE).overlaps(sibling));
            }
        }
    }
}

/// Test that buildings stay inside their blocks for the default city.
#[test]
fn default_city_buildings_are_contained() {
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let world = World::generate(GridSpec::default(), &LayoutAttributes::default(), &mut rng);
        assert_eq!(world.iter_blocks().count(), 225);
        check_layout(&world);
    }
}

/// Test that the layout rules hold for a city of large blocks.
#[test]
fn large_blocks_are_contained() {
    let grid = GridSpec {
        grid_size: 6,
        block_size: 60.0,
        street_width: 10.0,
    };
    let mut rng = StdRng::seed_from_u64(8);
    let world = World::generate(grid, &LayoutAttributes::default(), &mut rng);
    check_layout(&world);
    assert!(world.iter_blocks().any(|block| block.requested == 2));
    assert!(world
        .iter_blocks()
        .all(|block| block.buildings.len() <= block.requested));
}

/// Test that buildings never sit on a road.
#[test]
fn buildings_avoid_roads() {
    let grid = GridSpec::default();
    let mut rng = StdRng::seed_from_u64(12);
    let world = World::generate(grid, &LayoutAttributes::default(), &mut rng);
    for (_, building) in world.iter_buildings() {
        let rect = building.footprint();
        for i in 0..grid.road_count() {
            let road = grid.road_center(i);
            let half_street = 0.5 * grid.street_width;
            assert!(rect.x.min >= road + half_street || rect.x.max <= road - half_street);
            assert!(rect.z.min >= road + half_street || rect.z.max <= road - half_street);
        }
    }
}
