//! Long-running sessions must keep every agent and the player inside the city.

use city_drive_sim::{DriverInput, Simulation, SimulationAttributes};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random but mostly-forward driving.
fn random_input(rng: &mut StdRng) -> DriverInput {
    DriverInput {
        forward: rng.gen_bool(0.8),
        backward: rng.gen_bool(0.05),
        brake: rng.gen_bool(0.05),
        turn_left: rng.gen_bool(0.3),
        turn_right: rng.gen_bool(0.3),
        nitro: rng.gen_bool(0.2),
        horn: rng.gen_bool(0.01),
    }
}

#[test]
fn everything_stays_in_bounds() {
    for seed in [1, 2] {
        let mut sim = Simulation::new(SimulationAttributes::default(), seed);
        let half = sim.attributes().grid.half_size();
        let ground = sim.attributes().player.ground_half_size;
        let mut input_rng = StdRng::seed_from_u64(seed + 100);

        for frame in 0..10_000 {
            sim.step(&random_input(&mut input_rng), 1.0 / 60.0);

            for (_, agent) in sim.population().iter() {
                let p = agent.position();
                assert!(
                    p.x.abs() <= half && p.y.abs() <= half,
                    "seed {seed}, frame {frame}: agent at {p:?}"
                );
            }
            let p = sim.player().position();
            assert!(p.x.abs() <= ground && p.y.abs() <= ground);

            let dash = sim.dashboard();
            assert!((0.0..=100.0).contains(&dash.health_percent));
            assert!((0.0..=100.0).contains(&dash.nitro_fuel_percent));
        }
        assert_eq!(sim.frame(), 10_000);
    }
}

#[test]
fn vehicle_headings_match_direction_of_travel() {
    let mut sim = Simulation::new(SimulationAttributes::default(), 3);
    for _ in 0..2_000 {
        sim.step(&DriverInput::default(), 1.0 / 60.0);
        for (_, vehicle) in sim.population().iter_vehicles() {
            let heading = city_drive_sim::math::heading_vector(vehicle.heading());
            let velocity = vehicle.velocity();
            assert!((heading.x * velocity.x + heading.y * velocity.y) >= 0.0);
        }
    }
}
