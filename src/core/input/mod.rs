//=========================================================================
// Input System
//
// High-level interface for input handling within the engine.
//
// Responsibilities:
// - Fold each frame's raw input batches into the shared `StateTracker`
// - Resolve bindings in the active context into `ActionEvent`s
// - Expose the binding API used during engine initialization
//
// Notes:
// This system is owned by `GlobalSystems` and updated once per tick,
// before any scene runs.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod action;
mod action_mapper;
pub mod event;
pub mod pointer;
mod state_tracker;

//=== Public API ==========================================================

pub use action::{Action, ActionEvent, ActionPhase, ActionQuery, InputContext};
pub use event::{InputEvent, KeyCode, Modifiers, PointerButton};
pub use pointer::{PointerSubscriptions, ScreenRect, SubscriptionId, SubscriptionOwner};
pub use state_tracker::StateTracker;

//=== Internal Imports ====================================================

use action_mapper::ActionMapper;

//=== External Crates =====================================================

use log::{debug, trace};

//=== ContextSwitch =======================================================

/// Message a scene pushes to change the active input context.
///
/// Applied by the engine after the scene update, so the new bindings take
/// effect on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSwitch(pub InputContext);

//=== InputSystem =========================================================

/// Owns the action bindings and the current frame's resolved actions.
pub struct InputSystem<A: Action> {
    mapper: ActionMapper<A>,
    frame_actions: Vec<ActionEvent<A>>,
}

impl<A: Action> InputSystem<A> {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            mapper: ActionMapper::new(),
            frame_actions: Vec::with_capacity(16),
        }
    }

    //--- Binding API ------------------------------------------------------

    /// Binds a key (no modifiers) to an action in `context`.
    pub fn bind_key(&mut self, key: KeyCode, action: A, context: InputContext) {
        self.mapper.bind_key(key, action, context);
    }

    /// Binds a key with an exact modifier combination.
    pub fn bind_key_with_mods(
        &mut self,
        key: KeyCode,
        modifiers: Modifiers,
        action: A,
        context: InputContext,
    ) {
        self.mapper.bind_key_with_mods(key, modifiers, action, context);
    }

    /// Binds a pointer button (or touch contact) to an action.
    pub fn bind_pointer(&mut self, button: PointerButton, action: A, context: InputContext) {
        self.mapper.bind_pointer(button, action, context);
    }

    pub fn unbind_key(&mut self, key: KeyCode, context: InputContext) {
        self.mapper.unbind_key(key, context);
    }

    pub fn clear_context(&mut self, context: InputContext) {
        self.mapper.clear_context(context);
    }

    pub fn set_context(&mut self, context: InputContext) {
        if self.mapper.current_context() != context {
            debug!(target: "input", "Input context switched to {:?}", context);
        }
        self.mapper.set_context(context);
    }

    pub fn context(&self) -> InputContext {
        self.mapper.current_context()
    }

    //--- Frame Processing -------------------------------------------------

    /// Consumes the frame's input batches and resolves actions.
    pub fn process_frame(&mut self, state: &mut StateTracker, batches: &[Vec<InputEvent>]) {
        state.begin_frame();
        for batch in batches {
            state.process_events(batch);
        }
        state.finalize_frame();
        self.resolve(state);
    }

    /// Releases every held input (focus lost) and resolves the releases.
    pub fn release_all(&mut self, state: &mut StateTracker) {
        state.begin_frame();
        state.release_all();
        state.finalize_frame();
        self.resolve(state);
    }

    /// Actions resolved during the last processed frame.
    pub fn actions(&self) -> &[ActionEvent<A>] {
        &self.frame_actions
    }

    fn resolve(&mut self, state: &StateTracker) {
        self.frame_actions.clear();
        self.mapper.resolve(state, &mut self.frame_actions);

        if !self.frame_actions.is_empty() {
            trace!(target: "input", "Frame actions: {:?}", self.frame_actions);
        }
    }
}

impl<A: Action> Default for InputSystem<A> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestAction {
        Fire,
        Select,
    }

    impl Action for TestAction {}

    #[test]
    fn process_frame_resolves_bound_keys() {
        let mut input = InputSystem::new();
        let mut state = StateTracker::new();
        input.bind_key(KeyCode::Space, TestAction::Fire, InputContext::Primary);

        input.process_frame(&mut state, &[vec![InputEvent::key_down(KeyCode::Space)]]);

        assert!(input.actions().was_pressed(TestAction::Fire));
        assert!(state.is_key_down(KeyCode::Space));
    }

    #[test]
    fn actions_reset_every_frame() {
        let mut input = InputSystem::new();
        let mut state = StateTracker::new();
        input.bind_key(KeyCode::Space, TestAction::Fire, InputContext::Primary);

        input.process_frame(&mut state, &[vec![InputEvent::key_down(KeyCode::Space)]]);
        input.process_frame(&mut state, &[]);

        assert!(!input.actions().was_pressed(TestAction::Fire));
        assert!(input.actions().is_held(TestAction::Fire));
    }

    #[test]
    fn release_all_emits_releases() {
        let mut input = InputSystem::new();
        let mut state = StateTracker::new();
        input.bind_key(KeyCode::Space, TestAction::Fire, InputContext::Primary);

        input.process_frame(&mut state, &[vec![InputEvent::key_down(KeyCode::Space)]]);
        input.release_all(&mut state);

        assert_eq!(input.actions(), &[ActionEvent::released(TestAction::Fire)]);
        assert!(!state.is_key_down(KeyCode::Space));
    }

    #[test]
    fn context_switch_selects_bindings() {
        let menu = InputContext::custom(1);
        let mut input = InputSystem::new();
        let mut state = StateTracker::new();
        input.bind_key(KeyCode::Enter, TestAction::Fire, InputContext::Primary);
        input.bind_key(KeyCode::Enter, TestAction::Select, menu);

        input.set_context(menu);
        input.process_frame(&mut state, &[vec![InputEvent::key_down(KeyCode::Enter)]]);

        assert_eq!(input.context(), menu);
        assert!(input.actions().was_pressed(TestAction::Select));
        assert!(!input.actions().was_pressed(TestAction::Fire));
    }
}
