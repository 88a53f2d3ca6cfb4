//=========================================================================
// Tank Battle Entities
//=========================================================================
//
// Fixed entity structs. Every field exists from creation; nothing is
// attached later.
//
//   Tank       players and enemies, owned by the battle for the whole scene
//   EnemyTank  Tank + EnemyBrain (AI bookkeeping)
//   Bullet     pooled, owned by the tank that fired it
//   Particle   pooled, purely cosmetic
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::pool::Poolable;
use super::tuning::{ENEMY_HEALTH, PLAYER_HEALTH};

//=== Side & Identity =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Player,
    Enemy,
}

/// Stable identifier of a tank within one battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TankId(pub u32);

//=== Tank ================================================================

/// Result of applying damage to a tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Damaged,
    /// Health reached zero on this hit.
    Defeated,
    /// The tank was already down; nothing changed.
    AlreadyDown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    pub id: TankId,
    pub side: Side,
    pub position: Vec2,
    /// Facing, radians, 0 pointing right, clockwise (y grows downward).
    pub rotation: f32,
    pub velocity: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub active: bool,
    pub visible: bool,
    /// Seconds until this tank may fire again.
    pub fire_cooldown: f32,
}

impl Tank {
    pub fn player(id: TankId, position: Vec2) -> Self {
        Self::new(id, Side::Player, position, -std::f32::consts::FRAC_PI_2, PLAYER_HEALTH)
    }

    pub fn enemy(id: TankId, position: Vec2) -> Self {
        Self::new(id, Side::Enemy, position, std::f32::consts::FRAC_PI_2, ENEMY_HEALTH)
    }

    fn new(id: TankId, side: Side, position: Vec2, rotation: f32, health: u32) -> Self {
        Self {
            id,
            side,
            position,
            rotation,
            velocity: Vec2::ZERO,
            health,
            max_health: health,
            active: true,
            visible: true,
            fire_cooldown: 0.0,
        }
    }

    /// Unit vector along the barrel.
    pub fn facing(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// Subtracts `amount`, saturating at zero.
    ///
    /// The hit that brings health to zero deactivates and hides the tank
    /// and reports `Defeated`; later hits report `AlreadyDown`.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.active {
            return DamageOutcome::AlreadyDown;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.active = false;
            self.visible = false;
            self.velocity = Vec2::ZERO;
            DamageOutcome::Defeated
        } else {
            DamageOutcome::Damaged
        }
    }
}

//--- Enemy ---------------------------------------------------------------

/// AI timers and heading for one enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyBrain {
    /// Heading picked at the last direction change, radians.
    pub last_move_angle: f32,
    /// Seconds until the next heading change.
    pub heading_timer: f32,
    /// Seconds until the next shot.
    pub fire_timer: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTank {
    pub tank: Tank,
    pub brain: EnemyBrain,
}

//=== Bullet ==============================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bullet {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    /// Tank that fired it.
    pub owner: Option<TankId>,
    pub is_enemy: bool,
    pub damage: u32,
    /// Seconds since it was fired.
    pub age: f32,
}

impl Bullet {
    /// Whether this bullet may damage a tank on `side`.
    pub fn targets(&self, side: Side) -> bool {
        match side {
            Side::Player => self.is_enemy,
            Side::Enemy => !self.is_enemy,
        }
    }
}

impl Poolable for Bullet {
    fn reset(&mut self) {
        self.owner = None;
        self.velocity = Vec2::ZERO;
        self.age = 0.0;
        self.damage = 0;
    }
}

//=== Particle ============================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub age: f32,
    pub lifetime: f32,
}

impl Poolable for Particle {
    fn reset(&mut self) {
        self.velocity = Vec2::ZERO;
        self.age = 0.0;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_player_shots_defeat_an_enemy_once() {
        let mut enemy = Tank::enemy(TankId(7), Vec2::new(100.0, 100.0));

        assert_eq!(enemy.apply_damage(30), DamageOutcome::Damaged);
        assert_eq!(enemy.health, 20);
        assert_eq!(enemy.apply_damage(30), DamageOutcome::Defeated);
        assert_eq!(enemy.health, 0);
        assert!(!enemy.active && !enemy.visible);
        assert_eq!(enemy.apply_damage(30), DamageOutcome::AlreadyDown);
        assert_eq!(enemy.health, 0);
    }

    #[test]
    fn bullets_only_target_the_other_side() {
        let player_shot = Bullet { is_enemy: false, ..Bullet::default() };
        let enemy_shot = Bullet { is_enemy: true, ..Bullet::default() };

        assert!(player_shot.targets(Side::Enemy));
        assert!(!player_shot.targets(Side::Player));
        assert!(enemy_shot.targets(Side::Player));
    }

    #[test]
    fn player_faces_up() {
        let tank = Tank::player(TankId(0), Vec2::ZERO);
        assert!((tank.facing() - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }
}
