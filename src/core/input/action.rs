//=========================================================================
// Actions & Input Contexts
//=========================================================================
//
// Game-defined action trait, input contexts and the per-frame action
// events the input system publishes on the message bus.
//
// Actions: opaque identifiers routed by the engine, interpreted by games.
// Contexts: separate binding sets (gameplay vs menu) sharing one keyboard.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Debug;
use std::hash::Hash;

//=== Action Trait ========================================================

/// Marker trait for game-defined action enums.
///
/// ```
/// use woodcat_arcade::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum MenuAction { Confirm, Back }
///
/// impl Action for MenuAction {}
/// ```
pub trait Action: 'static + Send + Copy + Eq + Hash + Debug {}

//=== InputContext ========================================================

/// Identifies which set of bindings is active.
///
/// The Tank Battle menu and gameplay both use Enter, but for different
/// actions; switching the context swaps which binding resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputContext {
    /// Default context for core gameplay.
    #[default]
    Primary,

    /// User-defined context (menus, pause screen, ...).
    Custom(u32),
}

impl InputContext {
    #[inline]
    pub const fn custom(id: u32) -> Self {
        Self::Custom(id)
    }
}

//=== ActionEvent =========================================================

/// Lifecycle of an action within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionPhase {
    /// Bound input went down this frame.
    Pressed,

    /// Bound input is being held (also reported on the press frame).
    Held,

    /// Bound input went up this frame.
    Released,
}

/// Action occurrence published on the message bus each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionEvent<A: Action> {
    pub action: A,
    pub phase: ActionPhase,
}

impl<A: Action> ActionEvent<A> {
    pub fn pressed(action: A) -> Self {
        Self { action, phase: ActionPhase::Pressed }
    }

    pub fn held(action: A) -> Self {
        Self { action, phase: ActionPhase::Held }
    }

    pub fn released(action: A) -> Self {
        Self { action, phase: ActionPhase::Released }
    }
}

/// Query helpers over a frame's action events.
pub trait ActionQuery<A: Action> {
    /// `true` if `action` was pressed this frame.
    fn was_pressed(&self, action: A) -> bool;

    /// `true` if `action` is held this frame.
    fn is_held(&self, action: A) -> bool;
}

impl<A: Action> ActionQuery<A> for [ActionEvent<A>] {
    fn was_pressed(&self, action: A) -> bool {
        self.iter()
            .any(|e| e.action == action && e.phase == ActionPhase::Pressed)
    }

    fn is_held(&self, action: A) -> bool {
        self.iter()
            .any(|e| e.action == action && e.phase == ActionPhase::Held)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
