//! Collisions between the player's car and the rest of the city.
//!
//! The player's footprint is approximated by eight sample points. Each frame
//! the obstacles are tested in a fixed order (buildings, then vehicles, then
//! pedestrians) and only the first hit is handled.

pub use self::footprint::OrientedRect;
use crate::math::{heading_vector, Vector2d};
use crate::player::PlayerVehicle;
use crate::population::Population;
use crate::util::Rect;
use crate::vehicle::VehicleClass;
use crate::world::World;
use crate::{AgentId, BuildingId};
use cgmath::MetricSpace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod footprint;

/// The mass of the player's car, relative to the ambient vehicle classes.
const PLAYER_MASS: f64 = 1.0;

/// The gap left between the player's car and a building it is pushed out of.
const PUSH_OUT_CLEARANCE: f64 = 1e-6;

/// The most push-out passes made for a single building contact.
const MAX_PUSH_OUT_PASSES: usize = 4;

/// The attributes of the collision response.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionAttributes {
    /// The number of frames after a damaging collision during which no further collisions are checked.
    pub cooldown: u32,
    /// The player speed below which a collision does no damage.
    pub min_impact_speed: f64,
    /// Converts speeds in units per frame to impact forces.
    pub force_scale: f64,
    /// The radius of a pedestrian.
    pub pedestrian_radius: f64,
    /// The fraction of the player's speed kept, reversed, after hitting a building.
    pub building_rebound: f64,
    /// The rebound off a vehicle, per unit of mass ratio.
    pub vehicle_rebound: f64,
    /// The largest rebound off a vehicle.
    pub max_vehicle_rebound: f64,
    /// The fraction of the player's speed kept after hitting a pedestrian.
    pub pedestrian_slowdown: f64,
    /// How far a struck vehicle is shoved, per unit of player speed and inverse mass.
    pub vehicle_push: f64,
    /// How far a struck pedestrian is thrown, per unit of player speed.
    pub pedestrian_knockback: f64,
}

/// The object the player ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Obstacle {
    Building(BuildingId),
    Vehicle(AgentId),
    Pedestrian(AgentId),
}

/// The class of object involved in a collision, which sets how much damage it deals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionKind {
    Building,
    Car,
    Bus,
    Pedestrian,
}

/// A detected collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    pub obstacle: Obstacle,
    pub kind: CollisionKind,
    /// The speed-derived force of the impact.
    pub impact_force: f64,
}

/// The effect of a collision on the player's car.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    pub kind: CollisionKind,
    pub impact_force: f64,
    /// The health lost.
    pub damage: f64,
    /// Whether this impact brought the car's health to zero.
    pub wrecked: bool,
}

impl Default for CollisionAttributes {
    fn default() -> Self {
        Self {
            cooldown: 15,
            min_impact_speed: 0.02,
            force_scale: 300.0,
            pedestrian_radius: 0.5,
            building_rebound: 0.3,
            vehicle_rebound: 0.2,
            max_vehicle_rebound: 0.6,
            pedestrian_slowdown: 0.7,
            vehicle_push: 5.0,
            pedestrian_knockback: 10.0,
        }
    }
}

impl CollisionKind {
    /// The damage dealt per unit of impact force.
    pub fn damage_factor(self) -> f64 {
        match self {
            CollisionKind::Building => 1.5,
            CollisionKind::Car => 1.0,
            CollisionKind::Bus => 1.25,
            CollisionKind::Pedestrian => 0.5,
        }
    }

    /// The most damage a single collision can deal.
    pub fn damage_cap(self) -> f64 {
        match self {
            CollisionKind::Building => 40.0,
            CollisionKind::Car => 25.0,
            CollisionKind::Bus => 35.0,
            CollisionKind::Pedestrian => 15.0,
        }
    }

    /// The damage dealt by an impact of the given force.
    pub fn damage(self, impact_force: f64) -> f64 {
        f64::min((impact_force * self.damage_factor()).floor(), self.damage_cap()).max(0.0)
    }
}

impl From<VehicleClass> for CollisionKind {
    fn from(class: VehicleClass) -> Self {
        match class {
            VehicleClass::Car => CollisionKind::Car,
            VehicleClass::Bus => CollisionKind::Bus,
        }
    }
}

/// Finds the first obstacle the player's car overlaps, if any.
pub fn detect(
    player: &PlayerVehicle,
    world: &World,
    population: &Population,
    attributes: &CollisionAttributes,
) -> Option<Collision> {
    let footprint = player.footprint();
    let samples = footprint.sample_points();
    let player_speed = player.speed().abs();

    for (id, building) in world.iter_buildings() {
        let rect = building.footprint();
        if samples.iter().any(|p| rect.contains(*p)) {
            return Some(Collision {
                obstacle: Obstacle::Building(id),
                kind: CollisionKind::Building,
                impact_force: player_speed * attributes.force_scale,
            });
        }
    }

    for (id, vehicle) in population.iter_vehicles() {
        if footprint.intersects(&vehicle.footprint()) {
            return Some(Collision {
                obstacle: Obstacle::Vehicle(id),
                kind: vehicle.class().into(),
                impact_force: (player_speed + vehicle.speed().abs()) * attributes.force_scale,
            });
        }
    }

    let radius2 = attributes.pedestrian_radius * attributes.pedestrian_radius;
    for (id, pedestrian) in population.iter_pedestrians() {
        if pedestrian.is_down() {
            continue;
        }
        let centre = pedestrian.position();
        if samples.iter().any(|p| p.distance2(centre) <= radius2) {
            return Some(Collision {
                obstacle: Obstacle::Pedestrian(id),
                kind: CollisionKind::Pedestrian,
                impact_force: player_speed * attributes.force_scale,
            });
        }
    }

    None
}

/// Applies the physical response to a collision, and the damage if the car was moving fast enough.
///
/// Struck agents are shoved the way the player's car was travelling, which
/// is backwards when it reverses into them. A car that hits a building is
/// moved back out of it.
///
/// Returns the impact if damage was dealt, in which case the collision cooldown has started.
pub fn respond(
    collision: &Collision,
    player: &mut PlayerVehicle,
    world: &World,
    population: &mut Population,
    attributes: &CollisionAttributes,
) -> Option<Impact> {
    let speed = player.speed();
    let motion = heading_vector(player.heading()) * speed;
    let bounds = world.grid().bounds();

    match collision.obstacle {
        Obstacle::Building(id) => {
            player.set_speed(-speed * attributes.building_rebound);
            if let Some(building) = world.get_building(id) {
                push_out(player, &building.footprint());
            }
        }
        Obstacle::Vehicle(id) => {
            if let Some(vehicle) = population.vehicle_mut(id) {
                let mass = vehicle.class().mass();
                let rebound = f64::min(
                    attributes.vehicle_rebound * mass / PLAYER_MASS,
                    attributes.max_vehicle_rebound,
                );
                player.set_speed(-speed * rebound);
                vehicle.push(motion * attributes.vehicle_push / mass, &bounds);
            }
        }
        Obstacle::Pedestrian(id) => {
            player.set_speed(speed * attributes.pedestrian_slowdown);
            if let Some(pedestrian) = population.pedestrian_mut(id) {
                pedestrian.knock_down(motion * attributes.pedestrian_knockback, &bounds);
            }
        }
    }

    if speed.abs() <= attributes.min_impact_speed {
        return None;
    }

    let damage = collision.kind.damage(collision.impact_force);
    let wrecked = player.apply_damage(damage);
    player.start_collision_cooldown(attributes.cooldown);
    log::debug!(
        "collision with {:?}: force {:.1}, damage {}",
        collision.kind,
        collision.impact_force,
        damage
    );
    Some(Impact {
        kind: collision.kind,
        impact_force: collision.impact_force,
        damage,
        wrecked,
    })
}

/// Moves the player's car out of `rect` along the axis of least penetration,
/// so that none of its sample points remain inside.
fn push_out(player: &mut PlayerVehicle, rect: &Rect) {
    let sides = [
        Vector2d::new(-1.0, 0.0),
        Vector2d::new(1.0, 0.0),
        Vector2d::new(0.0, -1.0),
        Vector2d::new(0.0, 1.0),
    ];
    for _ in 0..MAX_PUSH_OUT_PASSES {
        // The distance each side's push must cover to clear every point inside.
        let mut depths = [0.0f64; 4];
        let mut inside = false;
        for p in player.footprint().sample_points() {
            if !rect.contains(p) {
                continue;
            }
            inside = true;
            depths[0] = depths[0].max(p.x - rect.x.min);
            depths[1] = depths[1].max(rect.x.max - p.x);
            depths[2] = depths[2].max(p.y - rect.z.min);
            depths[3] = depths[3].max(rect.z.max - p.y);
        }
        if !inside {
            return;
        }
        let (side, depth) = depths
            .into_iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0));
        player.set_position(player.position() + sides[side] * (depth + PUSH_OUT_CLEARANCE));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{Axis, GridSpec};
    use crate::math::Point2d;
    use crate::pedestrian::Pedestrian;
    use crate::player::{NitroAttributes, PlayerAttributes};
    use crate::vehicle::{VehicleAgent, VehicleAttributes};
    use crate::world::Building;
    use assert_approx_eq::assert_approx_eq;

    fn player_at(x: f64, z: f64, speed: f64) -> PlayerVehicle {
        let mut player = PlayerVehicle::new(
            &PlayerAttributes::default(),
            &NitroAttributes::default(),
            Point2d::new(x, z),
            0.0,
        );
        player.set_speed(speed);
        player
    }

    fn bus_at(x: f64, z: f64) -> VehicleAgent {
        VehicleAgent::new(&VehicleAttributes {
            class: VehicleClass::Bus,
            axis: Axis::Horizontal,
            speed: 0.08,
            position: Point2d::new(x, z),
            turn_probability: 0.0,
        })
    }

    #[test]
    fn damage_ordering() {
        for force in [0.0, 5.0, 12.5, 30.0, 60.0, 1000.0] {
            let building = CollisionKind::Building.damage(force);
            let bus = CollisionKind::Bus.damage(force);
            let car = CollisionKind::Car.damage(force);
            let person = CollisionKind::Pedestrian.damage(force);
            assert!(building >= bus && bus >= car && car >= person, "{force}");
        }
        assert_eq!(CollisionKind::Building.damage(1000.0), 40.0);
        assert_eq!(CollisionKind::Pedestrian.damage(1000.0), 15.0);
        assert_eq!(CollisionKind::Car.damage(10.9), 10.0);
    }

    #[test]
    fn building_hit_bounces_back() {
        let grid = GridSpec::default();
        let mut world = World::empty(grid);
        world.add_building(Building {
            centre: Point2d::new(0.0, 6.0),
            width: 10.0,
            depth: 10.0,
            height: 20.0,
        });
        let mut population = Population::new();
        let mut player = player_at(0.0, 0.5, 0.2);
        let attributes = CollisionAttributes::default();

        let collision = detect(&player, &world, &population, &attributes).unwrap();
        assert_eq!(collision.kind, CollisionKind::Building);
        assert_approx_eq!(collision.impact_force, 60.0);

        let impact = respond(&collision, &mut player, &world, &mut population, &attributes).unwrap();
        assert_eq!(impact.damage, 40.0);
        assert_approx_eq!(player.speed(), -0.06);
        assert_eq!(player.health(), 60.0);
        assert_eq!(player.collision_cooldown(), 15);

        let footprint = world.iter_buildings().next().unwrap().1.footprint();
        assert!(player
            .footprint()
            .sample_points()
            .iter()
            .all(|p| !footprint.contains(*p)));
        assert!(detect(&player, &world, &population, &attributes).is_none());
    }

    #[test]
    fn buildings_take_priority() {
        let grid = GridSpec::default();
        let mut world = World::empty(grid);
        world.add_building(Building {
            centre: Point2d::new(0.0, 6.0),
            width: 10.0,
            depth: 10.0,
            height: 20.0,
        });
        let mut population = Population::new();
        population.add_vehicle(bus_at(0.0, 1.0));
        let player = player_at(0.0, 0.5, 0.1);
        let collision = detect(&player, &world, &population, &CollisionAttributes::default());
        assert_eq!(collision.map(|c| c.kind), Some(CollisionKind::Building));
    }

    #[test]
    fn bus_pushes_player_back_harder() {
        let grid = GridSpec::default();
        let world = World::empty(grid);
        let mut population = Population::new();
        let id = population.add_vehicle(bus_at(0.0, 1.5));
        let mut player = player_at(0.0, 0.0, 0.1);
        let attributes = CollisionAttributes::default();

        let collision = detect(&player, &world, &population, &attributes).unwrap();
        assert_eq!(collision.obstacle, Obstacle::Vehicle(id));
        assert_eq!(collision.kind, CollisionKind::Bus);
        assert_approx_eq!(collision.impact_force, 54.0);

        let impact = respond(&collision, &mut player, &world, &mut population, &attributes).unwrap();
        assert_eq!(impact.damage, 35.0);
        assert_approx_eq!(player.speed(), -0.06);
        let bus = population.vehicle(id).unwrap();
        assert_approx_eq!(bus.position().y, 1.5 + 0.1 * 5.0 / 3.0);
    }

    #[test]
    fn pedestrian_is_knocked_down() {
        let grid = GridSpec::default();
        let world = World::empty(grid);
        let mut population = Population::new();
        let pedestrian = Pedestrian::on_sidewalk(&grid, Axis::Horizontal, 7, 1.0, 0.0, true, 0.03);
        let z = pedestrian.position().y;
        let id = population.add_pedestrian(pedestrian);
        let mut player = player_at(0.0, z - 1.2, 0.1);
        let attributes = CollisionAttributes::default();

        let collision = detect(&player, &world, &population, &attributes).unwrap();
        assert_eq!(collision.obstacle, Obstacle::Pedestrian(id));
        let impact = respond(&collision, &mut player, &world, &mut population, &attributes).unwrap();
        assert_eq!(impact.damage, 15.0);
        assert_approx_eq!(player.speed(), 0.07);

        let pedestrian = population.pedestrian(id).unwrap();
        assert!(pedestrian.is_down());
        assert_approx_eq!(pedestrian.position().y, z + 1.0);
        assert!(detect(&player, &world, &population, &attributes).is_none());
    }

    #[test]
    fn reversing_pushes_vehicle_backwards() {
        let grid = GridSpec::default();
        let world = World::empty(grid);
        let mut population = Population::new();
        let id = population.add_vehicle(VehicleAgent::new(&VehicleAttributes {
            class: VehicleClass::Car,
            axis: Axis::Horizontal,
            speed: 0.08,
            position: Point2d::new(0.0, -1.3),
            turn_probability: 0.0,
        }));
        let mut player = player_at(0.0, 0.0, -0.2);
        let attributes = CollisionAttributes::default();

        let collision = detect(&player, &world, &population, &attributes).unwrap();
        assert_eq!(collision.obstacle, Obstacle::Vehicle(id));
        respond(&collision, &mut player, &world, &mut population, &attributes).unwrap();
        assert_approx_eq!(player.speed(), 0.04);
        let car = population.vehicle(id).unwrap();
        assert_approx_eq!(car.position().x, 0.0);
        assert_approx_eq!(car.position().y, -2.3);
    }

    #[test]
    fn reversing_throws_pedestrian_backwards() {
        let grid = GridSpec::default();
        let world = World::empty(grid);
        let mut population = Population::new();
        let pedestrian = Pedestrian::on_sidewalk(&grid, Axis::Horizontal, 7, 1.0, 0.0, true, 0.03);
        let z = pedestrian.position().y;
        let id = population.add_pedestrian(pedestrian);
        let mut player = player_at(0.0, z + 1.2, -0.2);
        let attributes = CollisionAttributes::default();

        let collision = detect(&player, &world, &population, &attributes).unwrap();
        assert_eq!(collision.obstacle, Obstacle::Pedestrian(id));
        respond(&collision, &mut player, &world, &mut population, &attributes).unwrap();
        assert_approx_eq!(player.speed(), -0.14);

        let pedestrian = population.pedestrian(id).unwrap();
        assert!(pedestrian.is_down());
        assert_approx_eq!(pedestrian.position().y, z - 2.0);
        assert!(pedestrian.position().y < player.position().y);
    }

    #[test]
    fn slow_contact_does_no_damage() {
        let grid = GridSpec::default();
        let world = World::empty(grid);
        let mut population = Population::new();
        population.add_vehicle(bus_at(0.0, 1.5));
        let mut player = player_at(0.0, 0.0, 0.01);
        let attributes = CollisionAttributes::default();

        let collision = detect(&player, &world, &population, &attributes).unwrap();
        assert!(respond(&collision, &mut player, &world, &mut population, &attributes).is_none());
        assert_eq!(player.health(), 100.0);
        assert_eq!(player.collision_cooldown(), 0);
    }

    #[test]
    fn empty_city_has_no_collisions() {
        let grid = GridSpec::default();
        let world = World::empty(grid);
        let population = Population::new();
        let player = player_at(0.0, 0.0, 0.3);
        assert!(detect(&player, &world, &population, &CollisionAttributes::default()).is_none());
    }
}
