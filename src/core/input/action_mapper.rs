//=========================================================================
// Action Mapper
//=========================================================================
//
// Maps input state to game actions based on bindings and context.
//
// Architecture:
//   (key/button, modifiers, context) → HashMap → Action
//
// Presses and releases match modifiers exactly. Held actions ignore the
// modifier state so a tank keeps driving while Shift is down.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::{
    action::{Action, ActionEvent, InputContext},
    event::{KeyCode, Modifiers, PointerButton},
    state_tracker::StateTracker,
};

//=== ActionMapper ========================================================

/// Resolves bindings in the active context into [`ActionEvent`]s.
pub(crate) struct ActionMapper<A: Action> {
    key_bindings: HashMap<(KeyCode, Modifiers, InputContext), A>,
    pointer_bindings: HashMap<(PointerButton, Modifiers, InputContext), A>,
    current_context: InputContext,
}

impl<A: Action> ActionMapper<A> {
    pub(crate) fn new() -> Self {
        Self {
            key_bindings: HashMap::new(),
            pointer_bindings: HashMap::new(),
            current_context: InputContext::Primary,
        }
    }

    //--- Binding API ------------------------------------------------------

    pub(crate) fn bind_key(&mut self, key: KeyCode, action: A, context: InputContext) {
        self.bind_key_with_mods(key, Modifiers::NONE, action, context);
    }

    pub(crate) fn bind_key_with_mods(
        &mut self,
        key: KeyCode,
        modifiers: Modifiers,
        action: A,
        context: InputContext,
    ) {
        self.key_bindings.insert((key, modifiers, context), action);
    }

    pub(crate) fn bind_pointer(&mut self, button: PointerButton, action: A, context: InputContext) {
        self.pointer_bindings
            .insert((button, Modifiers::NONE, context), action);
    }

    pub(crate) fn unbind_key(&mut self, key: KeyCode, context: InputContext) {
        self.key_bindings
            .retain(|&(k, _, ctx), _| !(k == key && ctx == context));
    }

    /// Clears all bindings for a context.
    pub(crate) fn clear_context(&mut self, context: InputContext) {
        self.key_bindings.retain(|&(_, _, ctx), _| ctx != context);
        self.pointer_bindings.retain(|&(_, _, ctx), _| ctx != context);
    }

    pub(crate) fn set_context(&mut self, context: InputContext) {
        self.current_context = context;
    }

    pub(crate) fn current_context(&self) -> InputContext {
        self.current_context
    }

    //--- Resolution -------------------------------------------------------

    /// Resolves the frame's input state into action events.
    ///
    /// Emission order is pressed, held, released; duplicates (two keys
    /// bound to one action) are collapsed.
    pub(crate) fn resolve(&self, state: &StateTracker, out: &mut Vec<ActionEvent<A>>) {
        let modifiers = state.modifiers();

        for key in state.keys_pressed() {
            if let Some(action) = self.map_key(*key, modifiers) {
                push_unique(out, ActionEvent::pressed(action));
            }
        }
        for button in state.buttons_pressed() {
            if let Some(action) = self.map_button(*button, modifiers) {
                push_unique(out, ActionEvent::pressed(action));
            }
        }

        for key in state.keys_down() {
            for action in self.held_key_actions(*key) {
                push_unique(out, ActionEvent::held(action));
            }
        }
        for button in state.buttons_down() {
            for action in self.held_button_actions(*button) {
                push_unique(out, ActionEvent::held(action));
            }
        }

        for key in state.keys_released() {
            for action in self.held_key_actions(*key) {
                push_unique(out, ActionEvent::released(action));
            }
        }
        for button in state.buttons_released() {
            for action in self.held_button_actions(*button) {
                push_unique(out, ActionEvent::released(action));
            }
        }
    }

    //--- Internal Mapping Helpers -----------------------------------------

    pub(super) fn map_key(&self, key: KeyCode, modifiers: Modifiers) -> Option<A> {
        self.key_bindings
            .get(&(key, modifiers, self.current_context))
            .copied()
    }

    pub(super) fn map_button(&self, button: PointerButton, modifiers: Modifiers) -> Option<A> {
        self.pointer_bindings
            .get(&(button, modifiers, self.current_context))
            .copied()
    }

    fn held_key_actions(&self, key: KeyCode) -> impl Iterator<Item = A> + '_ {
        let context = self.current_context;
        self.key_bindings
            .iter()
            .filter(move |((k, _, ctx), _)| *k == key && *ctx == context)
            .map(|(_, action)| *action)
    }

    fn held_button_actions(&self, button: PointerButton) -> impl Iterator<Item = A> + '_ {
        let context = self.current_context;
        self.pointer_bindings
            .iter()
            .filter(move |((b, _, ctx), _)| *b == button && *ctx == context)
            .map(|(_, action)| *action)
    }
}

fn push_unique<A: Action>(out: &mut Vec<ActionEvent<A>>, event: ActionEvent<A>) {
    if !out.contains(&event) {
        out.push(event);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::action::{ActionPhase, ActionQuery};
    use crate::core::input::event::InputEvent;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestAction {
        Up,
        Fire,
        Save,
        Confirm,
    }

    impl Action for TestAction {}

    const MENU: InputContext = InputContext::custom(0);

    fn resolve_frame(
        mapper: &ActionMapper<TestAction>,
        tracker: &mut StateTracker,
        events: &[InputEvent],
    ) -> Vec<ActionEvent<TestAction>> {
        tracker.begin_frame();
        tracker.process_events(events);
        tracker.finalize_frame();
        let mut out = Vec::new();
        mapper.resolve(tracker, &mut out);
        out
    }

    //=====================================================================
    // Binding Tests
    //=====================================================================

    #[test]
    fn bind_and_resolve_simple_key() {
        let mut mapper = ActionMapper::new();
        let mut tracker = StateTracker::new();
        mapper.bind_key(KeyCode::Space, TestAction::Fire, InputContext::Primary);

        let events = resolve_frame(&mapper, &mut tracker, &[InputEvent::key_down(KeyCode::Space)]);

        assert!(events.was_pressed(TestAction::Fire));
        assert!(events.is_held(TestAction::Fire));
    }

    #[test]
    fn unbound_key_produces_nothing() {
        let mapper = ActionMapper::<TestAction>::new();
        let mut tracker = StateTracker::new();

        let events = resolve_frame(&mapper, &mut tracker, &[InputEvent::key_down(KeyCode::KeyQ)]);
        assert!(events.is_empty());
    }

    #[test]
    fn modifiers_must_match_for_press() {
        let mut mapper = ActionMapper::new();
        mapper.bind_key_with_mods(KeyCode::KeyS, Modifiers::CTRL, TestAction::Save, InputContext::Primary);

        assert_eq!(mapper.map_key(KeyCode::KeyS, Modifiers::NONE), None);
        assert_eq!(mapper.map_key(KeyCode::KeyS, Modifiers::CTRL), Some(TestAction::Save));
    }

    #[test]
    fn held_ignores_modifiers() {
        let mut mapper = ActionMapper::new();
        let mut tracker = StateTracker::new();
        mapper.bind_key(KeyCode::KeyW, TestAction::Up, InputContext::Primary);

        resolve_frame(&mapper, &mut tracker, &[InputEvent::key_down(KeyCode::KeyW)]);
        let events = resolve_frame(
            &mapper,
            &mut tracker,
            &[InputEvent::KeyDown { key: KeyCode::KeyA, modifiers: Modifiers::SHIFT }],
        );

        assert!(events.is_held(TestAction::Up));
        assert!(!events.was_pressed(TestAction::Up));
    }

    #[test]
    fn release_reported_once() {
        let mut mapper = ActionMapper::new();
        let mut tracker = StateTracker::new();
        mapper.bind_key(KeyCode::KeyW, TestAction::Up, InputContext::Primary);

        resolve_frame(&mapper, &mut tracker, &[InputEvent::key_down(KeyCode::KeyW)]);
        let events = resolve_frame(&mapper, &mut tracker, &[InputEvent::key_up(KeyCode::KeyW)]);

        assert_eq!(events, vec![ActionEvent::released(TestAction::Up)]);
        assert!(resolve_frame(&mapper, &mut tracker, &[]).is_empty());
    }

    #[test]
    fn two_keys_for_one_action_collapse() {
        let mut mapper = ActionMapper::new();
        let mut tracker = StateTracker::new();
        mapper.bind_key(KeyCode::Enter, TestAction::Confirm, InputContext::Primary);
        mapper.bind_key(KeyCode::Space, TestAction::Confirm, InputContext::Primary);

        let events = resolve_frame(
            &mapper,
            &mut tracker,
            &[InputEvent::key_down(KeyCode::Enter), InputEvent::key_down(KeyCode::Space)],
        );

        let pressed = events
            .iter()
            .filter(|e| e.phase == ActionPhase::Pressed)
            .count();
        assert_eq!(pressed, 1);
    }

    #[test]
    fn pointer_binding_resolves() {
        let mut mapper = ActionMapper::new();
        let mut tracker = StateTracker::new();
        mapper.bind_pointer(PointerButton::Primary, TestAction::Fire, InputContext::Primary);

        let events = resolve_frame(&mapper, &mut tracker, &[InputEvent::tap_down()]);
        assert!(events.was_pressed(TestAction::Fire));
    }

    //=====================================================================
    // Context Tests
    //=====================================================================

    #[test]
    fn context_switch_changes_resolution() {
        let mut mapper = ActionMapper::new();
        mapper.bind_key(KeyCode::Enter, TestAction::Fire, InputContext::Primary);
        mapper.bind_key(KeyCode::Enter, TestAction::Confirm, MENU);

        assert_eq!(mapper.map_key(KeyCode::Enter, Modifiers::NONE), Some(TestAction::Fire));

        mapper.set_context(MENU);
        assert_eq!(mapper.current_context(), MENU);
        assert_eq!(mapper.map_key(KeyCode::Enter, Modifiers::NONE), Some(TestAction::Confirm));
    }

    #[test]
    fn clear_context_only_affects_that_context() {
        let mut mapper = ActionMapper::new();
        mapper.bind_key(KeyCode::Enter, TestAction::Fire, InputContext::Primary);
        mapper.bind_key(KeyCode::Enter, TestAction::Confirm, MENU);

        mapper.clear_context(MENU);

        assert_eq!(mapper.map_key(KeyCode::Enter, Modifiers::NONE), Some(TestAction::Fire));
        mapper.set_context(MENU);
        assert_eq!(mapper.map_key(KeyCode::Enter, Modifiers::NONE), None);
    }

    #[test]
    fn unbind_key_removes_binding() {
        let mut mapper = ActionMapper::new();
        mapper.bind_key(KeyCode::KeyW, TestAction::Up, InputContext::Primary);
        mapper.unbind_key(KeyCode::KeyW, InputContext::Primary);
        assert_eq!(mapper.map_key(KeyCode::KeyW, Modifiers::NONE), None);
    }
}
