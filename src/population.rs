use crate::agent::{Agent, AgentEvent};
use crate::grid::{Axis, GridSpec};
use crate::math::Point2d;
use crate::pedestrian::Pedestrian;
use crate::util::Interval;
use crate::vehicle::{VehicleAgent, VehicleAttributes, VehicleClass};
use crate::{AgentId, AgentSet};
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A band of the speed distribution.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeedTier {
    /// The relative share of agents drawn from this tier.
    pub share: f64,
    /// The range speeds are drawn uniformly from, in units per frame.
    pub speed: Interval<f64>,
}

/// The attributes of the ambient population.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopulationAttributes {
    /// The number of cars.
    pub cars: usize,
    /// The number of buses.
    pub buses: usize,
    /// The number of pedestrians.
    pub pedestrians: usize,
    pub car_speeds: Vec<SpeedTier>,
    pub bus_speeds: Vec<SpeedTier>,
    pub walker_speeds: Vec<SpeedTier>,
    /// The range each car's turn probability is drawn from.
    pub car_turn_probability: Interval<f64>,
    /// The range each bus's turn probability is drawn from.
    pub bus_turn_probability: Interval<f64>,
}

/// The set of vehicles and pedestrians moving through the city.
#[derive(Clone, Debug, Default)]
pub struct Population {
    agents: AgentSet,
}

impl SpeedTier {
    pub const fn new(share: f64, min: f64, max: f64) -> Self {
        Self {
            share,
            speed: Interval::new(min, max),
        }
    }
}

impl Default for PopulationAttributes {
    fn default() -> Self {
        Self {
            cars: 130,
            buses: 25,
            pedestrians: 200,
            car_speeds: vec![
                SpeedTier::new(0.10, 0.03, 0.05),
                SpeedTier::new(0.65, 0.06, 0.15),
                SpeedTier::new(0.25, 0.09, 0.12),
            ],
            bus_speeds: vec![SpeedTier::new(1.0, 0.06, 0.10)],
            walker_speeds: vec![
                SpeedTier::new(0.15, 0.005, 0.015),
                SpeedTier::new(0.60, 0.02, 0.04),
                SpeedTier::new(0.25, 0.06, 0.09),
            ],
            car_turn_probability: Interval::new(0.01, 0.03),
            bus_turn_probability: Interval::new(0.005, 0.015),
        }
    }
}

impl Population {
    /// Creates an empty population.
    pub fn new() -> Self {
        Default::default()
    }

    /// Scatters the configured cars, buses and pedestrians over random roads and sidewalks.
    pub fn spawn<R: Rng + ?Sized>(
        grid: &GridSpec,
        attributes: &PopulationAttributes,
        rng: &mut R,
    ) -> Self {
        let mut population = Self::new();
        let fleets = [
            (
                VehicleClass::Car,
                attributes.cars,
                &attributes.car_speeds,
                attributes.car_turn_probability,
            ),
            (
                VehicleClass::Bus,
                attributes.buses,
                &attributes.bus_speeds,
                attributes.bus_turn_probability,
            ),
        ];
        for (class, count, speeds, turn_probability) in fleets {
            for _ in 0..count {
                let vehicle = random_vehicle(grid, class, speeds, turn_probability, rng);
                population.add_vehicle(vehicle);
            }
        }
        for _ in 0..attributes.pedestrians {
            let pedestrian = random_pedestrian(grid, &attributes.walker_speeds, rng);
            population.add_pedestrian(pedestrian);
        }
        log::debug!(
            "spawned {} cars, {} buses and {} pedestrians",
            attributes.cars,
            attributes.buses,
            attributes.pedestrians
        );
        population
    }

    /// Adds a vehicle to the population.
    pub fn add_vehicle(&mut self, vehicle: VehicleAgent) -> AgentId {
        self.agents.insert(vehicle.into())
    }

    /// Adds a pedestrian to the population.
    pub fn add_pedestrian(&mut self, pedestrian: Pedestrian) -> AgentId {
        self.agents.insert(pedestrian.into())
    }

    /// Advances every agent by one frame, returning the number of vehicles that turned.
    pub fn step<R: Rng + ?Sized>(&mut self, grid: &GridSpec, rng: &mut R) -> usize {
        let mut turns = 0;
        for agent in self.agents.values_mut() {
            if let AgentEvent::Turned(_) = agent.step(grid, rng) {
                turns += 1;
            }
        }
        turns
    }

    /// Gets a reference to the agent with the given ID.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Gets the vehicle with the given ID, if it is one.
    pub fn vehicle(&self, id: AgentId) -> Option<&VehicleAgent> {
        self.agents.get(id).and_then(Agent::as_vehicle)
    }

    /// Gets the pedestrian with the given ID, if it is one.
    pub fn pedestrian(&self, id: AgentId) -> Option<&Pedestrian> {
        self.agents.get(id).and_then(Agent::as_pedestrian)
    }

    pub(crate) fn vehicle_mut(&mut self, id: AgentId) -> Option<&mut VehicleAgent> {
        self.agents.get_mut(id).and_then(Agent::as_vehicle_mut)
    }

    pub(crate) fn pedestrian_mut(&mut self, id: AgentId) -> Option<&mut Pedestrian> {
        self.agents.get_mut(id).and_then(Agent::as_pedestrian_mut)
    }

    /// Returns an iterator over all the agents.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents.iter()
    }

    /// Returns an iterator over the vehicles.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = (AgentId, &VehicleAgent)> {
        self.agents
            .iter()
            .filter_map(|(id, agent)| agent.as_vehicle().map(|vehicle| (id, vehicle)))
    }

    /// Returns an iterator over the pedestrians.
    pub fn iter_pedestrians(&self) -> impl Iterator<Item = (AgentId, &Pedestrian)> {
        self.agents
            .iter()
            .filter_map(|(id, agent)| agent.as_pedestrian().map(|pedestrian| (id, pedestrian)))
    }

    /// The number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Draws a speed from a tiered distribution.
///
/// Falls back to the first tier if the shares cannot form a distribution,
/// and to a standstill if there are no tiers at all.
pub fn sample_speed<R: Rng + ?Sized>(tiers: &[SpeedTier], rng: &mut R) -> f64 {
    let tier = WeightedIndex::new(tiers.iter().map(|tier| tier.share))
        .ok()
        .map(|distr| &tiers[distr.sample(rng)])
        .or_else(|| tiers.first());
    match tier {
        Some(tier) => sample_interval(tier.speed, rng),
        None => 0.0,
    }
}

/// Samples uniformly from `[range.min, range.max)`.
fn sample_interval<R: Rng + ?Sized>(range: Interval<f64>, rng: &mut R) -> f64 {
    range.min + rng.gen::<f64>() * f64::max(range.length(), 0.0)
}

/// Draws `+1` or `-1` with equal probability.
fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

/// Places a vehicle at a random point on a random road, facing a random way.
fn random_vehicle<R: Rng + ?Sized>(
    grid: &GridSpec,
    class: VehicleClass,
    speeds: &[SpeedTier],
    turn_probability: Interval<f64>,
    rng: &mut R,
) -> VehicleAgent {
    let axis = if rng.gen_bool(0.5) {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };
    let sign = random_sign(rng);
    let road = rng.gen_range(0..grid.road_count());
    let along = (rng.gen::<f64>() - 0.5) * grid.city_size();

    let mut position = Point2d::new(0.0, 0.0);
    *axis.along_mut(&mut position) = along;
    *axis.across_mut(&mut position) = grid.road_center(road);

    VehicleAgent::new(&VehicleAttributes {
        class,
        axis,
        speed: sample_speed(speeds, rng) * sign,
        position,
        turn_probability: sample_interval(turn_probability, rng),
    })
}

/// Places a pedestrian at a random point on a random sidewalk.
fn random_pedestrian<R: Rng + ?Sized>(
    grid: &GridSpec,
    speeds: &[SpeedTier],
    rng: &mut R,
) -> Pedestrian {
    let axis = if rng.gen_bool(0.5) {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };
    let road = rng.gen_range(0..grid.road_count());
    let side = random_sign(rng);
    let along = (rng.gen::<f64>() - 0.5) * grid.city_size();
    let forward = rng.gen_bool(0.5);
    let speed = sample_speed(speeds, rng);
    Pedestrian::on_sidewalk(grid, axis, road, side, along, forward, speed)
        .with_walk_phase(rng.gen::<f64>() * TAU)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spawns_configured_counts_on_roads() {
        let grid = GridSpec::default();
        let mut rng = StdRng::seed_from_u64(1);
        let population = Population::spawn(&grid, &PopulationAttributes::default(), &mut rng);
        assert_eq!(population.len(), 130 + 25 + 200);
        assert_eq!(population.iter_vehicles().count(), 155);
        assert_eq!(population.iter_pedestrians().count(), 200);

        for (_, vehicle) in population.iter_vehicles() {
            let across = vehicle.axis().across(vehicle.position());
            assert_eq!(grid.nearest_road(across), across);
        }
    }

    #[test]
    fn buses_are_slow() {
        let grid = GridSpec::default();
        let mut rng = StdRng::seed_from_u64(2);
        let population = Population::spawn(&grid, &PopulationAttributes::default(), &mut rng);
        for (_, bus) in population
            .iter_vehicles()
            .filter(|(_, vehicle)| vehicle.class() == VehicleClass::Bus)
        {
            let speed = bus.speed().abs();
            assert!((0.06..0.10).contains(&speed), "{speed}");
        }
    }

    #[test]
    fn speeds_cover_every_tier() {
        let tiers = PopulationAttributes::default().walker_speeds;
        let mut rng = StdRng::seed_from_u64(3);
        let speeds: Vec<f64> = (0..2000).map(|_| sample_speed(&tiers, &mut rng)).collect();
        assert!(speeds.iter().any(|s| *s < 0.015));
        assert!(speeds.iter().any(|s| (0.02..0.04).contains(s)));
        assert!(speeds.iter().any(|s| *s >= 0.06));
    }

    #[test]
    fn degenerate_tiers_fall_back() {
        let mut rng = StdRng::seed_from_u64(4);
        let zero = [SpeedTier::new(0.0, 0.1, 0.2), SpeedTier::new(0.0, 0.5, 0.6)];
        let speed = sample_speed(&zero, &mut rng);
        assert!((0.1..0.2).contains(&speed));
        assert_eq!(sample_speed(&[], &mut rng), 0.0);
    }

    #[test]
    fn empty_population_steps() {
        let grid = GridSpec::default();
        let mut population = Population::new();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(population.step(&grid, &mut rng), 0);
        assert!(population.is_empty());
    }
}
