use crate::collision::{self, CollisionAttributes};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::debug::{debug_circle, debug_footprint, debug_line};
use crate::events::SimEvent;
use crate::grid::GridSpec;
use crate::input::DriverInput;
use crate::math::Point2d;
use crate::player::{NitroAttributes, PlayerAttributes, PlayerVehicle, MAX_HEALTH};
use crate::population::{Population, PopulationAttributes};
use crate::pose::{PedestrianPose, Pose};
use crate::world::{LayoutAttributes, World};
use crate::{AgentId, BuildingId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The smallest change in displayed speed, in km/h, reported to the audio layer.
const ENGINE_SPEED_EPSILON: f64 = 1e-6;

/// Everything needed to start a session.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationAttributes {
    pub grid: GridSpec,
    pub layout: LayoutAttributes,
    pub population: PopulationAttributes,
    pub player: PlayerAttributes,
    pub nitro: NitroAttributes,
    pub collision: CollisionAttributes,
}

/// The read-only scalars shown on the instrument panel.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dashboard {
    pub speed_kmh: f64,
    pub total_distance_km: f64,
    pub health_percent: f64,
    pub nitro_fuel_percent: f64,
    /// The number of damaging collisions so far.
    pub collision_count: usize,
}

/// A driving session: the city, its inhabitants and the player's car.
pub struct Simulation {
    attributes: SimulationAttributes,
    world: World,
    population: Population,
    player: PlayerVehicle,
    rng: StdRng,
    /// The current frame of simulation.
    frame: usize,
    /// The input of the previous frame, for detecting presses and releases.
    prev_input: DriverInput,
    /// The displayed speed at the end of the previous frame.
    prev_speed_kmh: f64,
    /// The events raised during the most recent frame.
    events: SmallVec<[SimEvent; 8]>,
    collision_count: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Starts a new session, generating the city and its population from `seed`.
    pub fn new(attributes: SimulationAttributes, seed: u64) -> Self {
        Self::from_rng(attributes, StdRng::seed_from_u64(seed))
    }

    /// Starts a new session from a random seed.
    pub fn with_entropy(attributes: SimulationAttributes) -> Self {
        Self::from_rng(attributes, StdRng::from_entropy())
    }

    /// Assembles a session from prebuilt parts, e.g. for a hand-built scenario.
    pub fn from_parts(
        attributes: SimulationAttributes,
        world: World,
        population: Population,
        player: PlayerVehicle,
        seed: u64,
    ) -> Self {
        Self {
            attributes,
            world,
            population,
            prev_speed_kmh: player.speed_kmh(),
            player,
            rng: StdRng::seed_from_u64(seed),
            frame: 0,
            prev_input: DriverInput::default(),
            events: SmallVec::new(),
            collision_count: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    fn from_rng(attributes: SimulationAttributes, mut rng: StdRng) -> Self {
        let grid = attributes.grid;
        let world = World::generate(grid, &attributes.layout, &mut rng);
        let population = Population::spawn(&grid, &attributes.population, &mut rng);
        let player = spawn_player(&attributes, &mut rng);
        Self {
            rng,
            ..Self::from_parts(attributes, world, population, player, 0)
        }
    }

    /// Advances the simulation by one frame.
    ///
    /// # Parameters
    /// * `input` - The driver's intents for this frame
    /// * `dt` - The wall time since the previous frame in seconds
    pub fn step(&mut self, input: &DriverInput, dt: f64) {
        self.events.clear();
        let was_boosting = self.player.nitro().is_active();

        self.player.step(input, dt);
        self.handle_collisions();
        let turns = self.population.step(&self.attributes.grid, &mut self.rng);
        if turns > 0 {
            log::trace!("frame {}: {} vehicles turned", self.frame, turns);
        }
        self.emit_events(input, was_boosting);

        self.prev_input = *input;
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn attributes(&self) -> &SimulationAttributes {
        &self.attributes
    }

    /// The static city.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The ambient vehicles and pedestrians.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The player's car.
    pub fn player(&self) -> &PlayerVehicle {
        &self.player
    }

    /// A mutable reference to the player's car, e.g. to place it for a scenario.
    pub fn player_mut(&mut self) -> &mut PlayerVehicle {
        &mut self.player
    }

    /// The events raised during the most recent frame.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Takes the events raised during the most recent frame.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    /// The current instrument readouts.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            speed_kmh: self.player.speed_kmh(),
            total_distance_km: self.player.total_distance_km(),
            health_percent: 100.0 * self.player.health() / MAX_HEALTH,
            nitro_fuel_percent: self.player.nitro().fuel(),
            collision_count: self.collision_count,
        }
    }

    /// The pose of the player's car.
    pub fn player_pose(&self) -> Pose {
        self.player.pose()
    }

    /// Returns an iterator over the poses of every building.
    pub fn building_poses(&self) -> impl Iterator<Item = (BuildingId, Pose)> + '_ {
        self.world
            .iter_buildings()
            .map(|(id, building)| (id, building.pose()))
    }

    /// Returns an iterator over the poses of every vehicle.
    pub fn vehicle_poses(&self) -> impl Iterator<Item = (AgentId, Pose)> + '_ {
        self.population
            .iter_vehicles()
            .map(|(id, vehicle)| (id, vehicle.pose()))
    }

    /// Returns an iterator over the poses of every pedestrian.
    pub fn pedestrian_poses(&self) -> impl Iterator<Item = (AgentId, PedestrianPose)> + '_ {
        self.population
            .iter_pedestrians()
            .map(|(id, pedestrian)| (id, pedestrian.pose()))
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Detects and responds to at most one collision, unless the cooldown is running.
    fn handle_collisions(&mut self) {
        if self.player.tick_collision_cooldown() {
            return;
        }

        let footprint = self.player.footprint();
        debug_footprint("player", &footprint);

        let attributes = &self.attributes.collision;
        let Some(collision) = collision::detect(&self.player, &self.world, &self.population, attributes)
        else {
            return;
        };

        let obstacle = self.obstacle_position(&collision.obstacle);
        if let Some(obstacle) = obstacle {
            debug_line("collision", footprint.centre, obstacle);
            debug_circle("collision", obstacle, attributes.pedestrian_radius);
        }

        let response = collision::respond(
            &collision,
            &mut self.player,
            &self.world,
            &mut self.population,
            attributes,
        );
        if let Some(impact) = response {
            self.collision_count += 1;
            self.events.push(SimEvent::CollisionOccurred {
                kind: impact.kind,
                impact_force: impact.impact_force,
            });
            if impact.wrecked {
                log::info!("player wrecked at frame {}", self.frame);
                self.events.push(SimEvent::Wrecked);
            }
        }
    }

    /// The position of an obstacle, if it still exists.
    fn obstacle_position(&self, obstacle: &collision::Obstacle) -> Option<Point2d> {
        match *obstacle {
            collision::Obstacle::Building(id) => self.world.get_building(id).map(|b| b.centre),
            collision::Obstacle::Vehicle(id) | collision::Obstacle::Pedestrian(id) => {
                self.population.get(id).map(|agent| agent.position())
            }
        }
    }

    /// Raises the audio events implied by this frame's input and player state.
    fn emit_events(&mut self, input: &DriverInput, was_boosting: bool) {
        let speed_kmh = self.player.speed_kmh();
        if (speed_kmh - self.prev_speed_kmh).abs() > ENGINE_SPEED_EPSILON {
            self.events.push(SimEvent::EngineSpeedChanged { speed_kmh });
        }
        self.prev_speed_kmh = speed_kmh;

        match (self.prev_input.brake, input.brake) {
            (false, true) => self.events.push(SimEvent::BrakeEngaged),
            (true, false) => self.events.push(SimEvent::BrakeReleased),
            _ => {}
        }

        if input.horn && !self.prev_input.horn {
            self.events.push(SimEvent::HornPressed);
        }

        match (was_boosting, self.player.nitro().is_active()) {
            (false, true) => self.events.push(SimEvent::NitroEngaged),
            (true, false) => self.events.push(SimEvent::NitroDisengaged),
            _ => {}
        }
    }
}

/// Places the player's car on a random north-south road, at the middle of the city, facing `+z`.
fn spawn_player<R: Rng + ?Sized>(attributes: &SimulationAttributes, rng: &mut R) -> PlayerVehicle {
    let grid = &attributes.grid;
    let road = rng.gen_range(0..grid.road_count());
    PlayerVehicle::new(
        &attributes.player,
        &attributes.nitro,
        Point2d::new(grid.road_center(road), 0.0),
        0.0,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collision::CollisionKind;
    use crate::world::Building;

    fn empty_session(player_at: Point2d) -> Simulation {
        let attributes = SimulationAttributes::default();
        let world = World::empty(attributes.grid);
        let player = PlayerVehicle::new(&attributes.player, &attributes.nitro, player_at, 0.0);
        Simulation::from_parts(attributes, world, Population::new(), player, 1)
    }

    #[test]
    fn generated_session_is_populated() {
        let sim = Simulation::new(SimulationAttributes::default(), 42);
        assert!(sim.world().building_count() >= 15 * 15);
        assert_eq!(sim.population().len(), 130 + 25 + 200);
        let spawn = sim.player().position();
        assert_eq!(spawn.y, 0.0);
        assert_eq!(sim.attributes().grid.nearest_road(spawn.x), spawn.x);
        assert_eq!(sim.dashboard().health_percent, 100.0);
        assert_eq!(sim.dashboard().nitro_fuel_percent, 100.0);
    }

    #[test]
    fn same_seed_same_city() {
        let a = Simulation::new(SimulationAttributes::default(), 9);
        let b = Simulation::new(SimulationAttributes::default(), 9);
        let poses_a: Vec<_> = a.building_poses().map(|(_, pose)| pose).collect();
        let poses_b: Vec<_> = b.building_poses().map(|(_, pose)| pose).collect();
        assert_eq!(poses_a, poses_b);
        assert_eq!(a.player_pose(), b.player_pose());
    }

    #[test]
    fn brake_and_horn_events_fire_on_edges() {
        let mut sim = empty_session(Point2d::new(15.0, 0.0));
        let pressed = DriverInput {
            brake: true,
            horn: true,
            ..Default::default()
        };
        sim.step(&pressed, 0.016);
        assert!(sim.events().contains(&SimEvent::BrakeEngaged));
        assert!(sim.events().contains(&SimEvent::HornPressed));

        sim.step(&pressed, 0.016);
        assert!(sim.events().is_empty());

        sim.step(&DriverInput::default(), 0.016);
        assert_eq!(sim.take_events(), vec![SimEvent::BrakeReleased]);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn nitro_events() {
        let mut sim = empty_session(Point2d::new(15.0, 0.0));
        let boost = DriverInput {
            forward: true,
            nitro: true,
            ..Default::default()
        };
        sim.step(&boost, 0.016);
        assert!(sim.events().contains(&SimEvent::NitroEngaged));
        assert!(sim
            .events()
            .iter()
            .any(|e| matches!(e, SimEvent::EngineSpeedChanged { .. })));

        sim.step(
            &DriverInput {
                forward: true,
                ..Default::default()
            },
            0.016,
        );
        assert!(sim.events().contains(&SimEvent::NitroDisengaged));
    }

    #[test]
    fn crash_into_building_counts_once() {
        let mut sim = empty_session(Point2d::new(0.0, 0.0));
        let mut world = World::empty(GridSpec::default());
        world.add_building(Building {
            centre: Point2d::new(0.0, 7.0),
            width: 10.0,
            depth: 10.0,
            height: 20.0,
        });
        sim.world = world;
        sim.player_mut().set_speed(0.3);

        let forward = DriverInput {
            forward: true,
            ..Default::default()
        };
        let mut forces = vec![];
        for _ in 0..200 {
            sim.step(&forward, 0.016);
            for event in sim.events() {
                if let SimEvent::CollisionOccurred { kind, impact_force } = event {
                    assert_eq!(*kind, CollisionKind::Building);
                    forces.push(*impact_force);
                }
            }
        }
        assert!(!forces.is_empty());
        assert!(forces[0] > 80.0);
        assert_eq!(sim.dashboard().collision_count, forces.len());
        assert!(sim.dashboard().health_percent <= 60.0);
    }
}
