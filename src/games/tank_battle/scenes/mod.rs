//=========================================================================
// Tank Battle Scenes
//=========================================================================
//
// Scene flow:
//
//   Preload ──> Menu ──> Game ──push──> Pause
//                ^         │              │
//                │         └──> GameOver <┘ (to menu)
//                └────────────────┘
//
// Scenes share `TankServices` (storage, scores, settings, strings).
// Data crossing a transition travels as a typed message pushed in the
// same tick as the transition, read by the next scene's `on_enter`:
//
//   Menu → Game:      GameSetup
//   Game → GameOver:  GameOverPayload + GameSetup (for "play again")
//
//=========================================================================

//=== Module Declarations =================================================

mod game;
mod game_over;
mod menu;
mod pause;
mod preload;

//=== Public API ==========================================================

pub use game::GameScene;
pub use game_over::GameOverScene;
pub use menu::MenuScene;
pub use pause::PauseScene;
pub use preload::PreloadScene;

//=== External Dependencies ===============================================

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

//=== Internal Dependencies ===============================================

use super::battle::SavedGame;
use crate::core::input::{ContextSwitch, InputContext};
use crate::core::{GlobalContext, SceneKey, SceneManager, SceneTransition};
use crate::i18n::Catalog;
use crate::scores::{Leaderboard, ScoreManager};
use crate::settings::{Difficulty, SettingsStore};
use crate::storage::{DataManager, GameId};

//=== TankScene ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TankScene {
    Preload,
    Menu,
    Game,
    Pause,
    GameOver,
}

impl SceneKey for TankScene {}

//=== Shared Services =====================================================

/// Handles every scene needs, cloned into each scene at registration.
#[derive(Clone)]
pub struct TankServices {
    pub data: Arc<DataManager>,
    pub scores: ScoreManager,
    pub leaderboard: Arc<Leaderboard>,
    pub settings: Arc<Mutex<SettingsStore>>,
    pub catalog: Arc<RwLock<Catalog>>,
    pub player_name: String,
    pub locale: String,
    /// Base RNG seed; `None` draws a fresh seed per game.
    pub seed: Option<u64>,
}

impl TankServices {
    pub const GAME: GameId = GameId::TankBattle;

    pub fn new(data: Arc<DataManager>, leaderboard: Leaderboard) -> Self {
        let settings = SettingsStore::load(Self::GAME, Arc::clone(&data));
        Self {
            scores: ScoreManager::new(Arc::clone(&data)),
            leaderboard: Arc::new(leaderboard),
            settings: Arc::new(Mutex::new(settings)),
            catalog: Arc::new(RwLock::new(Catalog::new(Catalog::FALLBACK_LOCALE))),
            player_name: "Player".to_string(),
            locale: Catalog::FALLBACK_LOCALE.to_string(),
            seed: None,
            data,
        }
    }

    pub fn with_player(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn text(&self, key: &str) -> String {
        self.catalog.read().t(key)
    }

    pub fn text_with(&self, key: &str, args: &[(&str, String)]) -> String {
        self.catalog.read().t_with(key, args)
    }
}

//=== Cross-Scene Messages ================================================

/// How the Game scene should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSetup {
    pub difficulty: Difficulty,
    pub players: usize,
    pub resume: Option<SavedGame>,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            players: 1,
            resume: None,
        }
    }
}

//=== Helpers =============================================================

/// Queues a transition together with the input context of the scene
/// that will be on top afterwards.
fn transition(context: &mut GlobalContext, change: SceneTransition<TankScene>, input: InputContext) {
    context.message_bus.push(change);
    context.message_bus.push(ContextSwitch(input));
}

/// Registers every scene, with Preload as the initial one.
pub fn register_scenes(manager: &mut SceneManager<TankScene>, services: &TankServices) {
    manager.register_default(TankScene::Preload, PreloadScene::new(services.clone()));
    manager.register_scene(TankScene::Menu, MenuScene::new(services.clone()));
    manager.register_scene(TankScene::Game, GameScene::new(services.clone()));
    manager.register_scene(TankScene::Pause, PauseScene::new(services.clone()));
    manager.register_scene(TankScene::GameOver, GameOverScene::new(services.clone()));
}
