//=========================================================================
// Tank Battle Tuning
//=========================================================================
//
// Gameplay constants and the difficulty table.
//
// World units are window pixels with a top-left origin; times are in
// seconds.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::settings::Difficulty;

//=== World ===============================================================

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;

//=== Tanks ===============================================================

pub const TANK_RADIUS: f32 = 16.0;
pub const PLAYER_HEALTH: u32 = 100;
pub const PLAYER_SPEED: f32 = 150.0;
pub const PLAYER_FIRE_COOLDOWN: f32 = 0.3;
pub const ENEMY_HEALTH: u32 = 50;
pub const MAX_PLAYERS: usize = 2;

//=== Projectiles =========================================================

pub const BULLET_RADIUS: f32 = 4.0;
pub const BULLET_SPEED: f32 = 400.0;
pub const BULLET_LIFETIME: f32 = 2.0;
pub const PLAYER_BULLET_DAMAGE: u32 = 30;
pub const ENEMY_BULLET_DAMAGE: u32 = 20;

//=== Effects =============================================================

pub const EXPLOSION_PARTICLES: usize = 8;
pub const HIT_PARTICLES: usize = 3;
pub const PARTICLE_LIFETIME: f32 = 0.5;
pub const PARTICLE_SPEED: f32 = 120.0;

//=== Pools ===============================================================

pub const BULLET_POOL_SIZE: usize = 30;
pub const PARTICLE_POOL_SIZE: usize = 50;

//=== AI & Scoring ========================================================

/// Bounds of the randomized heading and fire intervals, `[min, max)`.
pub const AI_INTERVAL_MIN: f32 = 1.0;
pub const AI_INTERVAL_MAX: f32 = 3.0;

pub const POINTS_PER_LEVEL: u32 = 100;

/// Highest level a saved game may resume at.
pub const MAX_LEVEL: u32 = 999;

//=== Difficulty ==========================================================

/// Wave parameters for one difficulty setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Enemies in the first wave.
    pub base_enemies: u32,
    pub enemy_speed: f32,
}

impl DifficultyProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self { base_enemies: 3, enemy_speed: 60.0 },
            Difficulty::Medium => Self { base_enemies: 5, enemy_speed: 80.0 },
            Difficulty::Hard => Self { base_enemies: 7, enemy_speed: 100.0 },
        }
    }

    /// One extra enemy per level after the first.
    pub fn enemies_for_level(&self, level: u32) -> u32 {
        self.base_enemies.saturating_add(level.saturating_sub(1))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_table() {
        let easy = DifficultyProfile::for_difficulty(Difficulty::Easy);
        let hard = DifficultyProfile::for_difficulty(Difficulty::Hard);

        assert_eq!(easy.enemies_for_level(1), 3);
        assert_eq!(easy.enemies_for_level(4), 6);
        assert_eq!(hard.enemies_for_level(1), 7);
        assert_eq!(DifficultyProfile::for_difficulty(Difficulty::Medium).enemy_speed, 80.0);
        assert_eq!(easy.enemies_for_level(u32::MAX), u32::MAX);
    }
}
