use std::time::Instant;

use city_drive_sim::{DriverInput, SimEvent, Simulation, SimulationAttributes};

/// The wall time of a frame at 60 frames per second.
const FRAME_DT: f64 = 1.0 / 60.0;

/// A repeating drive: accelerate, weave, boost, then brake.
fn scripted_input(frame: usize) -> DriverInput {
    let t = frame % 600;
    DriverInput {
        forward: t < 480,
        brake: t >= 540,
        turn_left: (120..160).contains(&t),
        turn_right: (300..340).contains(&t),
        nitro: (200..260).contains(&t),
        horn: t == 100,
        ..Default::default()
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let num_frames: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(6000);

    let mut sim = Simulation::new(SimulationAttributes::default(), seed);
    println!(
        "Simulating seed {} with {} buildings and {} agents...",
        seed,
        sim.world().building_count(),
        sim.population().len()
    );

    let start = Instant::now();
    let mut collisions = 0;
    for frame in 0..num_frames {
        sim.step(&scripted_input(frame), FRAME_DT);
        for event in sim.take_events() {
            match event {
                SimEvent::CollisionOccurred { kind, impact_force } => {
                    collisions += 1;
                    log::info!("frame {frame}: hit {kind:?} with force {impact_force:.1}");
                }
                SimEvent::Wrecked => println!("Wrecked at frame {frame}"),
                _ => {}
            }
        }
        if (frame + 1) % 1000 == 0 {
            let dash = sim.dashboard();
            println!(
                "frame {:>6}: {:>5.1} km/h, {:.3} km, health {:.0}%, nitro {:.0}%",
                frame + 1,
                dash.speed_kmh,
                dash.total_distance_km,
                dash.health_percent,
                dash.nitro_fuel_percent
            );
        }
    }

    let frame = start.elapsed() / num_frames.max(1) as u32;
    println!(
        "Avg. frame: {:?} --> {:.0}x real time, {} collisions",
        frame,
        FRAME_DT / frame.as_secs_f64().max(f64::EPSILON),
        collisions
    );
}
