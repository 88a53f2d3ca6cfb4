//=========================================================================
// Battle
//=========================================================================
//
// Complete Tank Battle simulation for one game session.
//
// Tick order (fixed):
//   1. players    movement, firing
//   2. enemies    AI, firing
//   3. bullets    flight, expiry, collisions, defeats
//   4. particles  flight, expiry
//   5. outcome    wave cleared / game over
//   6. HUD        snapshot of the counters
//
// The Game scene owns the battle; nothing else mutates it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::TAU;

use glam::Vec2;
use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::ai::{self, FireOrder};
use super::collision::{self, TargetRef};
use super::entity::{Bullet, EnemyBrain, EnemyTank, Particle, Side, Tank, TankId};
use super::pool::EntityPool;
use super::tuning::*;
use crate::settings::Difficulty;

//=== GameState ===========================================================

/// Counters for the running game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    pub level: u32,
    pub enemies_remaining: u32,
    /// Defeats in the current wave.
    pub enemies_defeated: u32,
    /// Defeats across all waves.
    pub total_defeated: u32,
    pub paused: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            enemies_remaining: 0,
            enemies_defeated: 0,
            total_defeated: 0,
            paused: false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

//=== Cross-Scene Data ====================================================

/// Snapshot written on exit so the menu can offer "continue".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub score: u32,
    pub level: u32,
}

/// Handed from the Game scene to the GameOver scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverPayload {
    pub score: u32,
    pub level: u32,
    pub total_defeated: u32,
}

/// Per-tick counters for the HUD.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HudSnapshot {
    pub score: u32,
    pub level: u32,
    pub enemies_remaining: u32,
    pub player_health: Vec<u32>,
    pub active_bullets: usize,
    pub active_particles: usize,
}

//=== Input & Events ======================================================

/// One player's controls for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// Desired direction; normalized by the battle.
    pub movement: Vec2,
    pub fire: bool,
}

/// Something that happened during a tick, for feedback and logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BattleEvent {
    Fired { side: Side },
    Hit { side: Side, position: Vec2 },
    TankDefeated { side: Side, position: Vec2 },
    WaveCleared { next_level: u32 },
    GameOver(GameOverPayload),
}

//=== Battle ==============================================================

pub struct Battle {
    state: GameState,
    profile: DifficultyProfile,
    players: Vec<Tank>,
    enemies: Vec<EnemyTank>,
    bullets: EntityPool<Bullet>,
    particles: EntityPool<Particle>,
    rng: ChaCha8Rng,
    next_tank_id: u32,
    hud: HudSnapshot,
    over: bool,
}

impl Battle {
    //--- Construction -----------------------------------------------------

    /// New game at level 1 with `players` (1 or 2) player tanks.
    pub fn new(difficulty: Difficulty, players: usize, seed: u64) -> Self {
        Self::start(difficulty, players, seed, GameState::new())
    }

    /// Continues a saved game at its level and score.
    ///
    /// The level is clamped to `1..=MAX_LEVEL`.
    pub fn resume(difficulty: Difficulty, players: usize, seed: u64, saved: SavedGame) -> Self {
        let state = GameState {
            score: saved.score,
            level: saved.level.clamp(1, MAX_LEVEL),
            ..GameState::new()
        };
        Self::start(difficulty, players, seed, state)
    }

    fn start(difficulty: Difficulty, players: usize, seed: u64, state: GameState) -> Self {
        let mut battle = Self {
            state,
            profile: DifficultyProfile::for_difficulty(difficulty),
            players: Vec::with_capacity(MAX_PLAYERS),
            enemies: Vec::new(),
            bullets: EntityPool::new("bullet", BULLET_POOL_SIZE),
            particles: EntityPool::new("particle", PARTICLE_POOL_SIZE),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_tank_id: 0,
            hud: HudSnapshot::default(),
            over: false,
        };

        let count = players.clamp(1, MAX_PLAYERS);
        for i in 0..count {
            let x = WORLD_WIDTH * (i as f32 + 1.0) / (count as f32 + 1.0);
            let id = battle.allocate_id();
            battle.players.push(Tank::player(id, Vec2::new(x, WORLD_HEIGHT - 60.0)));
        }

        battle.spawn_wave();
        battle.refresh_hud();

        info!(
            target: "tank_battle",
            "Battle started: {:?}, {} player(s), level {}, seed {}",
            difficulty, count, battle.state.level, seed
        );
        battle
    }

    fn allocate_id(&mut self) -> TankId {
        let id = TankId(self.next_tank_id);
        self.next_tank_id += 1;
        id
    }

    /// Replaces the enemy list with a fresh wave for the current level.
    fn spawn_wave(&mut self) {
        let count = self.profile.enemies_for_level(self.state.level);
        self.enemies.clear();
        self.bullets.release_all();

        for i in 0..count {
            let column = i % 8;
            let row = i / 8;
            let per_row = count.min(8) as f32;
            let x = WORLD_WIDTH * (column as f32 + 1.0) / (per_row + 1.0);
            let y = 60.0 + row as f32 * 50.0;

            let id = self.allocate_id();
            let brain = EnemyBrain::new(&mut self.rng);
            self.enemies.push(EnemyTank {
                tank: Tank::enemy(id, Vec2::new(x, y)),
                brain,
            });
        }

        self.state.enemies_remaining = count;
        self.state.enemies_defeated = 0;
        debug!(target: "tank_battle", "Level {}: spawned {} enemies", self.state.level, count);
    }

    //--- Tick -------------------------------------------------------------

    /// Advances the simulation by `dt` seconds.
    ///
    /// `inputs[i]` drives player `i`; missing entries mean no input.
    pub fn update(&mut self, dt: f32, inputs: &[PlayerInput]) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        if self.state.paused || self.over {
            return events;
        }

        self.update_players(dt, inputs, &mut events);
        self.update_enemies(dt, &mut events);
        self.update_bullets(dt, &mut events);
        self.update_particles(dt);
        self.check_outcome(&mut events);
        self.refresh_hud();

        events
    }

    fn update_players(&mut self, dt: f32, inputs: &[PlayerInput], events: &mut Vec<BattleEvent>) {
        let mut orders = Vec::new();

        for (i, tank) in self.players.iter_mut().enumerate() {
            if !tank.active {
                continue;
            }
            let input = inputs.get(i).copied().unwrap_or_default();

            let direction = input.movement.normalize_or_zero();
            tank.velocity = direction * PLAYER_SPEED;
            tank.position = ai::clamp_to_world(tank.position + tank.velocity * dt);
            if direction != Vec2::ZERO {
                tank.rotation = direction.y.atan2(direction.x);
            }

            tank.fire_cooldown = (tank.fire_cooldown - dt).max(0.0);
            if input.fire && tank.fire_cooldown <= 0.0 {
                tank.fire_cooldown = PLAYER_FIRE_COOLDOWN;
                let facing = tank.facing();
                orders.push((
                    tank.id,
                    FireOrder {
                        origin: tank.position + facing * TANK_RADIUS,
                        direction: facing,
                    },
                ));
            }
        }

        for (owner, order) in orders {
            self.spawn_bullet(owner, order, false);
            events.push(BattleEvent::Fired { side: Side::Player });
        }
    }

    fn update_enemies(&mut self, dt: f32, events: &mut Vec<BattleEvent>) {
        let mut orders = Vec::new();

        for enemy in &mut self.enemies {
            if let Some(order) =
                ai::update_enemy(enemy, &self.players, self.profile.enemy_speed, dt, &mut self.rng)
            {
                orders.push((enemy.tank.id, order));
            }
        }

        for (owner, order) in orders {
            self.spawn_bullet(owner, order, true);
            events.push(BattleEvent::Fired { side: Side::Enemy });
        }
    }

    fn update_bullets(&mut self, dt: f32, events: &mut Vec<BattleEvent>) {
        let mut expired = Vec::new();
        for (handle, bullet) in self.bullets.iter_mut() {
            bullet.position += bullet.velocity * dt;
            bullet.age += dt;

            let outside = bullet.position.x < 0.0
                || bullet.position.x > WORLD_WIDTH
                || bullet.position.y < 0.0
                || bullet.position.y > WORLD_HEIGHT;
            if outside || bullet.age >= BULLET_LIFETIME {
                expired.push(handle);
            }
        }
        for handle in expired {
            self.bullets.release(handle);
        }

        let hits = collision::resolve(&mut self.bullets, &mut self.players, &mut self.enemies);

        for hit in hits {
            let side = match hit.target {
                TargetRef::Player(_) => Side::Player,
                TargetRef::Enemy(_) => Side::Enemy,
            };

            self.spawn_particles(hit.position, HIT_PARTICLES);
            events.push(BattleEvent::Hit { side, position: hit.position });

            if hit.defeated {
                self.spawn_particles(hit.position, EXPLOSION_PARTICLES);
                events.push(BattleEvent::TankDefeated { side, position: hit.position });

                if side == Side::Enemy {
                    self.on_enemy_defeated();
                } else {
                    info!(target: "tank_battle", "Player tank {:?} destroyed", hit.target);
                }
            }
        }
    }

    fn update_particles(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for (handle, particle) in self.particles.iter_mut() {
            particle.position += particle.velocity * dt;
            particle.age += dt;
            if particle.age >= particle.lifetime {
                expired.push(handle);
            }
        }
        for handle in expired {
            self.particles.release(handle);
        }
    }

    fn check_outcome(&mut self, events: &mut Vec<BattleEvent>) {
        if self.players.iter().all(|p| !p.active) {
            self.over = true;
            let payload = self.game_over_payload();
            info!(
                target: "tank_battle",
                "Game over: score {}, level {}, {} enemies destroyed",
                payload.score, payload.level, payload.total_defeated
            );
            events.push(BattleEvent::GameOver(payload));
            return;
        }

        if self.state.enemies_remaining == 0 {
            self.state.level = self.state.level.saturating_add(1);
            info!(target: "tank_battle", "Wave cleared, advancing to level {}", self.state.level);
            self.spawn_wave();
            events.push(BattleEvent::WaveCleared { next_level: self.state.level });
        }
    }

    fn on_enemy_defeated(&mut self) {
        let state = &mut self.state;
        state.score = state
            .score
            .saturating_add(POINTS_PER_LEVEL.saturating_mul(state.level));
        state.enemies_defeated += 1;
        state.total_defeated += 1;
        state.enemies_remaining = state.enemies_remaining.saturating_sub(1);
        debug!(
            target: "tank_battle",
            "Enemy destroyed: score {}, {} remaining",
            state.score, state.enemies_remaining
        );
    }

    fn refresh_hud(&mut self) {
        self.hud = HudSnapshot {
            score: self.state.score,
            level: self.state.level,
            enemies_remaining: self.state.enemies_remaining,
            player_health: self.players.iter().map(|p| p.health).collect(),
            active_bullets: self.bullets.active_count(),
            active_particles: self.particles.active_count(),
        };
        trace!(target: "tank_battle", "HUD {:?}", self.hud);
    }

    //--- Spawning ---------------------------------------------------------

    fn spawn_bullet(&mut self, owner: TankId, order: FireOrder, is_enemy: bool) {
        let (_, bullet) = self.bullets.acquire();
        bullet.position = order.origin;
        bullet.velocity = order.direction * BULLET_SPEED;
        bullet.rotation = order.direction.y.atan2(order.direction.x);
        bullet.owner = Some(owner);
        bullet.is_enemy = is_enemy;
        bullet.damage = if is_enemy { ENEMY_BULLET_DAMAGE } else { PLAYER_BULLET_DAMAGE };
        bullet.age = 0.0;
    }

    fn spawn_particles(&mut self, at: Vec2, count: usize) {
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(0.5..1.0) * PARTICLE_SPEED;
            let (_, particle) = self.particles.acquire();
            particle.position = at;
            particle.velocity = Vec2::from_angle(angle) * speed;
            particle.age = 0.0;
            particle.lifetime = PARTICLE_LIFETIME;
        }
    }

    //--- Queries & Control ------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn hud(&self) -> &HudSnapshot {
        &self.hud
    }

    pub fn players(&self) -> &[Tank] {
        &self.players
    }

    pub fn enemies(&self) -> &[EnemyTank] {
        &self.enemies
    }

    pub fn bullets(&self) -> &EntityPool<Bullet> {
        &self.bullets
    }

    pub fn particles(&self) -> &EntityPool<Particle> {
        &self.particles
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    pub fn snapshot(&self) -> SavedGame {
        SavedGame {
            score: self.state.score,
            level: self.state.level,
        }
    }

    pub fn game_over_payload(&self) -> GameOverPayload {
        GameOverPayload {
            score: self.state.score,
            level: self.state.level,
            total_defeated: self.state.total_defeated,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    /// Parks a stationary bullet on top of `target`.
    fn plant_bullet(battle: &mut Battle, target: Vec2, is_enemy: bool) {
        let (_, bullet) = battle.bullets.acquire();
        bullet.position = target;
        bullet.velocity = Vec2::ZERO;
        bullet.is_enemy = is_enemy;
        bullet.damage = if is_enemy { ENEMY_BULLET_DAMAGE } else { PLAYER_BULLET_DAMAGE };
    }

    fn hold_fire(battle: &mut Battle) {
        for enemy in &mut battle.enemies {
            enemy.brain.fire_timer = 10.0;
        }
    }

    #[test]
    fn difficulty_sets_first_wave_size() {
        assert_eq!(Battle::new(Difficulty::Easy, 1, 1).enemies().len(), 3);
        assert_eq!(Battle::new(Difficulty::Medium, 1, 1).enemies().len(), 5);
        assert_eq!(Battle::new(Difficulty::Hard, 2, 1).enemies().len(), 7);

        let battle = Battle::new(Difficulty::Easy, 1, 1);
        assert_eq!(battle.state().enemies_remaining, 3);
        assert_eq!(battle.state().level, 1);
    }

    #[test]
    fn clearing_a_wave_advances_the_level() {
        let mut battle = Battle::new(Difficulty::Easy, 1, 42);
        hold_fire(&mut battle);

        let targets: Vec<Vec2> = battle.enemies.iter().map(|e| e.tank.position).collect();
        for target in targets {
            plant_bullet(&mut battle, target, false);
            plant_bullet(&mut battle, target, false);
        }

        let events = battle.update(DT, &[]);

        assert!(events.contains(&BattleEvent::WaveCleared { next_level: 2 }));
        assert_eq!(battle.state().level, 2);
        assert_eq!(battle.state().enemies_defeated, 0);
        assert_eq!(battle.state().total_defeated, 3);
        assert_eq!(battle.state().score, 300);
        assert_eq!(battle.enemies().len(), 4);
        assert_eq!(battle.state().enemies_remaining, 4);
    }

    #[test]
    fn defeat_path_fires_once() {
        let mut battle = Battle::new(Difficulty::Easy, 1, 7);
        hold_fire(&mut battle);

        let target = battle.enemies[0].tank.position;
        plant_bullet(&mut battle, target, false);
        battle.update(DT, &[]);
        assert_eq!(battle.enemies[0].tank.health, 20);

        let target = battle.enemies[0].tank.position;
        plant_bullet(&mut battle, target, false);
        plant_bullet(&mut battle, target, false);
        let events = battle.update(DT, &[]);

        let defeats = events
            .iter()
            .filter(|e| matches!(e, BattleEvent::TankDefeated { side: Side::Enemy, .. }))
            .count();
        assert_eq!(defeats, 1);
        assert_eq!(battle.enemies[0].tank.health, 0);
        assert_eq!(battle.state().enemies_defeated, 1);
        assert_eq!(battle.particles().active_count(), HIT_PARTICLES * 2 + EXPLOSION_PARTICLES);
    }

    #[test]
    fn losing_every_player_ends_the_game() {
        let mut battle = Battle::new(Difficulty::Easy, 1, 3);
        hold_fire(&mut battle);

        let target = battle.players[0].position;
        for _ in 0..5 {
            plant_bullet(&mut battle, target, true);
        }
        let events = battle.update(DT, &[]);

        assert!(battle.is_over());
        assert!(events.contains(&BattleEvent::GameOver(GameOverPayload {
            score: 0,
            level: 1,
            total_defeated: 0,
        })));
        assert!(battle.update(DT, &[]).is_empty());
    }

    #[test]
    fn player_moves_and_fires_with_cooldown() {
        let mut battle = Battle::new(Difficulty::Easy, 1, 5);
        hold_fire(&mut battle);
        let start = battle.players[0].position;

        let input = PlayerInput { movement: Vec2::new(1.0, 0.0), fire: true };
        let events = battle.update(DT, &[input]);
        assert!(events.contains(&BattleEvent::Fired { side: Side::Player }));
        assert!(battle.players[0].position.x > start.x);

        let events = battle.update(DT, &[input]);
        assert!(!events.contains(&BattleEvent::Fired { side: Side::Player }));
        assert_eq!(battle.bullets().active_count(), 1);
    }

    #[test]
    fn paused_battle_is_frozen() {
        let mut battle = Battle::new(Difficulty::Medium, 1, 9);
        let before: Vec<Vec2> = battle.enemies.iter().map(|e| e.tank.position).collect();

        battle.set_paused(true);
        battle.update(DT, &[]);
        let after: Vec<Vec2> = battle.enemies.iter().map(|e| e.tank.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn same_seed_same_battle() {
        let mut a = Battle::new(Difficulty::Hard, 2, 1234);
        let mut b = Battle::new(Difficulty::Hard, 2, 1234);

        for _ in 0..600 {
            a.update(DT, &[]);
            b.update(DT, &[]);
        }

        assert_eq!(a.enemies(), b.enemies());
        assert_eq!(a.state(), b.state());
        assert_eq!(a.hud(), b.hud());
    }

    #[test]
    fn resume_restores_score_and_level() {
        let battle = Battle::resume(Difficulty::Easy, 1, 0, SavedGame { score: 1500, level: 3 });
        assert_eq!(battle.state().score, 1500);
        assert_eq!(battle.state().level, 3);
        assert_eq!(battle.enemies().len(), 5);
        assert_eq!(battle.snapshot(), SavedGame { score: 1500, level: 3 });
    }

    #[test]
    fn resume_clamps_out_of_range_level() {
        let battle = Battle::resume(
            Difficulty::Easy,
            1,
            0,
            SavedGame { score: u32::MAX, level: u32::MAX },
        );
        assert_eq!(battle.state().level, MAX_LEVEL);
        assert_eq!(battle.enemies().len(), (3 + MAX_LEVEL - 1) as usize);

        let battle = Battle::resume(Difficulty::Easy, 1, 0, SavedGame { score: 0, level: 0 });
        assert_eq!(battle.state().level, 1);
    }
}
