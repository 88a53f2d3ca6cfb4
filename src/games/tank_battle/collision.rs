//=========================================================================
// Collision & Damage
//=========================================================================
//
// Bullet vs tank resolution.
//
// For every active bullet, targets are checked in update order (players,
// then enemies). The first overlapping live tank on the opposing side
// takes the bullet's damage and the bullet is recycled, so one bullet
// damages at most one tank.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;
use log::trace;

//=== Internal Dependencies ===============================================

use super::entity::{Bullet, DamageOutcome, EnemyTank, Tank};
use super::pool::{EntityPool, PoolHandle};
use super::tuning::{BULLET_RADIUS, TANK_RADIUS};

//=== Types ===============================================================

/// Index into the battle's player or enemy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Player(usize),
    Enemy(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: TargetRef,
    pub position: Vec2,
    pub damage: u32,
    /// This hit brought the target's health to zero.
    pub defeated: bool,
}

//=== Resolution ==========================================================

pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) < reach * reach
}

/// Applies every bullet hit for this tick and recycles spent bullets.
pub fn resolve(
    bullets: &mut EntityPool<Bullet>,
    players: &mut [Tank],
    enemies: &mut [EnemyTank],
) -> Vec<Hit> {
    let mut hits = Vec::new();
    let live: Vec<(PoolHandle, Bullet)> = bullets.iter().map(|(h, b)| (h, b.clone())).collect();

    for (handle, bullet) in live {
        let player_targets = players
            .iter_mut()
            .enumerate()
            .map(|(i, tank)| (TargetRef::Player(i), tank));
        let enemy_targets = enemies
            .iter_mut()
            .enumerate()
            .map(|(i, enemy)| (TargetRef::Enemy(i), &mut enemy.tank));

        let struck = player_targets.chain(enemy_targets).find(|(_, tank)| {
            tank.active
                && bullet.targets(tank.side)
                && circles_overlap(bullet.position, BULLET_RADIUS, tank.position, TANK_RADIUS)
        });

        let Some((target, tank)) = struck else {
            continue;
        };

        let outcome = tank.apply_damage(bullet.damage);
        trace!(
            target: "tank_battle",
            "{} bullet hit {:?} for {} ({:?}, {} hp left)",
            if bullet.is_enemy { "enemy" } else { "player" },
            target, bullet.damage, outcome, tank.health
        );

        hits.push(Hit {
            target,
            position: tank.position,
            damage: bullet.damage,
            defeated: outcome == DamageOutcome::Defeated,
        });
        bullets.release(handle);
    }

    hits
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tank_battle::entity::{EnemyBrain, TankId};
    use crate::games::tank_battle::tuning::{ENEMY_BULLET_DAMAGE, PLAYER_BULLET_DAMAGE};

    fn brain() -> EnemyBrain {
        EnemyBrain {
            last_move_angle: 0.0,
            heading_timer: 1.0,
            fire_timer: 1.0,
        }
    }

    fn enemy(id: u32, position: Vec2) -> EnemyTank {
        EnemyTank {
            tank: Tank::enemy(TankId(id), position),
            brain: brain(),
        }
    }

    fn fire(pool: &mut EntityPool<Bullet>, position: Vec2, is_enemy: bool) -> PoolHandle {
        let (handle, bullet) = pool.acquire();
        bullet.position = position;
        bullet.is_enemy = is_enemy;
        bullet.damage = if is_enemy { ENEMY_BULLET_DAMAGE } else { PLAYER_BULLET_DAMAGE };
        handle
    }

    #[test]
    fn overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 4.0, Vec2::new(19.9, 0.0), 16.0));
        assert!(!circles_overlap(Vec2::ZERO, 4.0, Vec2::new(20.0, 0.0), 16.0));
    }

    #[test]
    fn two_hits_defeat_an_enemy_exactly_once() {
        let mut pool = EntityPool::new("bullets", 4);
        let mut players = vec![Tank::player(TankId(0), Vec2::new(400.0, 560.0))];
        let mut enemies = vec![enemy(1, Vec2::new(100.0, 100.0))];

        fire(&mut pool, Vec2::new(100.0, 100.0), false);
        let first = resolve(&mut pool, &mut players, &mut enemies);
        assert_eq!(first.len(), 1);
        assert!(!first[0].defeated);
        assert_eq!(enemies[0].tank.health, 20);

        fire(&mut pool, Vec2::new(100.0, 100.0), false);
        fire(&mut pool, Vec2::new(100.0, 100.0), false);
        let second = resolve(&mut pool, &mut players, &mut enemies);

        assert_eq!(second.len(), 1);
        assert!(second[0].defeated);
        assert_eq!(enemies[0].tank.health, 0);
        assert_eq!(pool.active_count(), 1, "bullet passing a defeated tank stays live");
    }

    #[test]
    fn friendly_fire_is_ignored() {
        let mut pool = EntityPool::new("bullets", 4);
        let mut players = vec![Tank::player(TankId(0), Vec2::new(200.0, 200.0))];
        let mut enemies = vec![enemy(1, Vec2::new(500.0, 100.0))];

        let own = fire(&mut pool, Vec2::new(200.0, 200.0), false);
        let theirs = fire(&mut pool, Vec2::new(500.0, 100.0), true);

        assert!(resolve(&mut pool, &mut players, &mut enemies).is_empty());
        assert!(pool.is_active(own) && pool.is_active(theirs));
    }

    #[test]
    fn first_target_in_update_order_wins() {
        let mut pool = EntityPool::new("bullets", 4);
        let mut players = vec![Tank::player(TankId(0), Vec2::new(300.0, 300.0))];
        let mut enemies = vec![enemy(1, Vec2::new(300.0, 300.0)), enemy(2, Vec2::new(305.0, 300.0))];

        fire(&mut pool, Vec2::new(302.0, 300.0), false);
        let hits = resolve(&mut pool, &mut players, &mut enemies);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, TargetRef::Enemy(0));
        assert_eq!(enemies[1].tank.health, enemies[1].tank.max_health);
    }
}
