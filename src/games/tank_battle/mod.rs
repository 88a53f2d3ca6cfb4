//=========================================================================
// Tank Battle
//=========================================================================
//
// Top-down tank shooter for one or two players against waves of AI
// tanks.
//
// Module map:
//   tuning     constants and the difficulty table
//   pool       recyclable bullet/particle storage
//   entity     Tank, EnemyTank, Bullet, Particle
//   ai         enemy wander-and-shoot behaviour
//   collision  bullet vs tank damage
//   battle     the per-tick simulation and GameState
//   actions    action enum, key bindings, touch layout
//   feedback   sound/vibration cues
//   scenes     Preload, Menu, Game, Pause, GameOver
//
//=========================================================================

//=== Module Declarations =================================================

pub mod actions;
pub mod ai;
pub mod battle;
pub mod collision;
pub mod entity;
pub mod feedback;
pub mod pool;
pub mod scenes;
pub mod tuning;

//=== Public API ==========================================================

pub use actions::TankAction;
pub use battle::{Battle, BattleEvent, GameOverPayload, GameState, HudSnapshot, PlayerInput, SavedGame};
pub use scenes::{GameSetup, TankScene, TankServices};

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::info;

//=== Internal Dependencies ===============================================

use crate::config::{ArcadeConfig, EngineConfig};
use crate::engine::{Engine, EngineBuilder};
use crate::scores::Leaderboard;
use crate::storage::{DataManager, StorageError};

//=== Engine Assembly =====================================================

/// Opens storage and the leaderboard from `config` and builds the engine.
pub fn build_engine(config: &ArcadeConfig) -> Result<Engine<TankScene, TankAction>, StorageError> {
    let data = Arc::new(DataManager::open(&config.storage)?);
    let leaderboard = Leaderboard::from_config(&config.leaderboard).with_local_cache(Arc::clone(&data));

    let services = TankServices::new(data, leaderboard)
        .with_player(config.game.player_name.clone())
        .with_locale(config.game.locale.clone())
        .with_seed(config.game.seed);

    Ok(build_engine_with(&config.engine, services))
}

/// Builds the engine around already-constructed services.
pub fn build_engine_with(config: &EngineConfig, services: TankServices) -> Engine<TankScene, TankAction> {
    info!(
        target: "tank_battle",
        "Assembling Tank Battle (player {}, locale {})",
        services.player_name, services.locale
    );

    EngineBuilder::new()
        .with_tps(config.tps)
        .with_channel_capacity(config.channel_capacity)
        .with_window(config.window_title.clone(), config.window_width, config.window_height)
        .build()
        .init(|systems| {
            actions::bind_defaults(&mut systems.input);
            scenes::register_scenes(&mut systems.scene_manager, &services);
        })
}

//=========================================================================
// Unit Tests
//=========================================================================
