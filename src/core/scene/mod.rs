//=========================================================================
// Scene System
//=========================================================================
//
// Manages scene lifecycle and stack-based scene switching.
//
// Architecture:
//   SceneManager
//     ├─ scenes: HashMap<S, Box<dyn Scene<S>>>
//     └─ stack: Vec<S>
//
// Flow:
//   update() → collect_active_scenes() → Scene::update()
//   process_transitions() → on_exit()/on_enter()
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::globals::GlobalContext;

//=== Module Declarations =================================================

mod scene_manager;

//=== Public API ==========================================================

pub use scene_manager::{SceneKey, SceneManager, SceneTransition};

//=== Scene Trait =========================================================

/// Scene behavior with lifecycle hooks and per-tick update.
///
/// Scenes are registered once and keep their own state between
/// activations. Only `update()` is required:
///
/// ```rust
/// # use woodcat_arcade::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum ArcadeScene { Menu }
/// # impl SceneKey for ArcadeScene {}
/// struct MenuScene;
///
/// impl Scene<ArcadeScene> for MenuScene {
///     fn update(&mut self, context: &mut GlobalContext) {
///         let _dt = context.time.delta;
///     }
/// }
/// ```
pub trait Scene<S: SceneKey>: Send {
    /// Called when the scene enters the stack.
    ///
    /// Payload messages pushed during the same tick (e.g. a final score)
    /// are still readable from `context.message_bus` here.
    fn on_enter(&mut self, _context: &GlobalContext) {}

    /// Called when the scene leaves the stack.
    fn on_exit(&mut self, _context: &GlobalContext) {}

    /// Called once for every scene still on the stack when the engine stops.
    ///
    /// Exit-time saves belong here; the process may end right after.
    fn on_shutdown(&mut self, _context: &GlobalContext) {}

    /// Called every tick while the scene is active.
    fn update(&mut self, context: &mut GlobalContext);

    /// Whether scenes below this one keep updating.
    ///
    /// Opaque scenes (the default) block updates to lower stack entries,
    /// which is how Pause freezes Game.
    fn is_transparent(&self) -> bool {
        false
    }
}
