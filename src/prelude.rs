//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use woodcat_arcade::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};

// Global systems and context
pub use crate::core::globals::{FrameTime, GlobalContext, GlobalSystems};

// Input system
pub use crate::core::input::{
    Action, ActionEvent, ActionPhase, ActionQuery, ContextSwitch, InputContext, InputEvent,
    KeyCode, Modifiers, PointerButton,
};

// Scene system
pub use crate::core::scene::{Scene, SceneKey, SceneTransition};

// Message bus
pub use crate::core::message_bus::MessageBus;

// Shared services
pub use crate::scores::{ScoreManager, ScoreKind};
pub use crate::settings::{Difficulty, SettingsConfig, SettingsStore};
pub use crate::storage::{DataManager, DataType, GameId, StorageKey};
