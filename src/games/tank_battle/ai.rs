//=========================================================================
// Enemy AI
//=========================================================================
//
// Wander-and-shoot behaviour, one enemy at a time, no coordination.
//
// Per tick:
//   heading_timer elapsed → random heading, new interval in [1, 3)
//   move along heading, clamp to the world, re-pick heading on contact
//   fire_timer elapsed    → aim at the nearer live player, new interval
//
// All randomness comes from the battle's seeded RNG, so a seeded game
// replays identically.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::entity::{EnemyBrain, EnemyTank, Tank};
use super::tuning::{
    AI_INTERVAL_MAX, AI_INTERVAL_MIN, MAX_PLAYERS, TANK_RADIUS, WORLD_HEIGHT, WORLD_WIDTH,
};

//=== FireOrder ===========================================================

/// Shot requested by an enemy this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOrder {
    pub origin: Vec2,
    pub direction: Vec2,
}

//=== Brain Construction ==================================================

pub fn random_interval<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(AI_INTERVAL_MIN..AI_INTERVAL_MAX)
}

fn random_heading<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..TAU)
}

impl EnemyBrain {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            last_move_angle: random_heading(rng),
            heading_timer: random_interval(rng),
            fire_timer: random_interval(rng),
        }
    }
}

//=== Update ==============================================================

/// Advances one enemy by `dt` seconds.
pub fn update_enemy<R: Rng>(
    enemy: &mut EnemyTank,
    players: &[Tank],
    speed: f32,
    dt: f32,
    rng: &mut R,
) -> Option<FireOrder> {
    if !enemy.tank.active {
        return None;
    }

    let brain = &mut enemy.brain;
    let tank = &mut enemy.tank;

    //--- Heading ----------------------------------------------------------

    brain.heading_timer -= dt;
    if brain.heading_timer <= 0.0 {
        brain.last_move_angle = random_heading(rng);
        brain.heading_timer = random_interval(rng);
    }

    //--- Movement ---------------------------------------------------------

    tank.rotation = brain.last_move_angle;
    tank.velocity = Vec2::from_angle(brain.last_move_angle) * speed;

    let moved = tank.position + tank.velocity * dt;
    let clamped = clamp_to_world(moved);
    tank.position = clamped;

    if clamped != moved {
        brain.last_move_angle = random_heading(rng);
    }

    //--- Firing -----------------------------------------------------------

    brain.fire_timer -= dt;
    if brain.fire_timer > 0.0 {
        return None;
    }
    brain.fire_timer = random_interval(rng);

    let target = nearest_player(tank.position, players)?;
    let direction = (target - tank.position).normalize_or_zero();
    if direction == Vec2::ZERO {
        return None;
    }

    tank.rotation = direction.y.atan2(direction.x);
    Some(FireOrder {
        origin: tank.position + direction * TANK_RADIUS,
        direction,
    })
}

/// Position of the closest active player among the first two.
pub fn nearest_player(from: Vec2, players: &[Tank]) -> Option<Vec2> {
    players
        .iter()
        .take(MAX_PLAYERS)
        .filter(|p| p.active)
        .map(|p| p.position)
        .min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}

/// Keeps a tank fully inside the world.
pub fn clamp_to_world(position: Vec2) -> Vec2 {
    position.clamp(
        Vec2::splat(TANK_RADIUS),
        Vec2::new(WORLD_WIDTH - TANK_RADIUS, WORLD_HEIGHT - TANK_RADIUS),
    )
}

//=========================================================================
// Unit Tests
//=========================================================================
