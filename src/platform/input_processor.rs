//=========================================================================
// Input Processor
//=========================================================================
//
// Converts winit window events into engine InputEvents.
//
// Architecture:
//   winit events → InputProcessor → InputEvent → InputBuffer
//
// Modifier state is cached from ModifiersChanged and stamped onto every
// key and pointer event. Touch contacts drive the primary pointer, so a
// finger behaves like a left click and drag. Only the first active touch
// is tracked.
//
// winit reports cursor and touch positions in physical pixels; they are
// divided by the window's scale factor so games work in logical pixels.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    dpi::{LogicalPosition, PhysicalPosition},
    event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::event::{InputEvent, KeyCode, Modifiers, PointerButton};

//=== InputProcessor ======================================================

pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
    active_touch: Option<u64>,
    scale_factor: f64,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
            active_touch: None,
            scale_factor: 1.0,
        }
    }

    pub(crate) fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    //--- Modifier State Management ----------------------------------------

    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a keyboard event, filtering keys the engine does not map.
    pub(crate) fn process_key_event(&self, key_event: &KeyEvent) -> Option<InputEvent> {
        let key = match key_event.physical_key {
            PhysicalKey::Code(code) => KeyCode::from(code),
            _ => return None,
        };

        if key == KeyCode::Unidentified {
            return None;
        }

        Some(self.key_input(key, key_event.state))
    }

    pub(crate) fn process_mouse_button(
        &self,
        button: MouseButton,
        state: ElementState,
    ) -> InputEvent {
        self.pointer_input(PointerButton::from(button), state)
    }

    pub(crate) fn process_pointer_move(&self, position: PhysicalPosition<f64>) -> InputEvent {
        let logical: LogicalPosition<f32> = position.to_logical(self.scale_factor);
        InputEvent::PointerMoved { x: logical.x, y: logical.y }
    }

    /// Converts a touch into pointer events: a move to the contact point,
    /// then a press or release for start and end phases.
    pub(crate) fn process_touch(&mut self, touch: &Touch) -> Vec<InputEvent> {
        self.touch_contact(touch.id, touch.phase, touch.location)
    }

    fn touch_contact(
        &mut self,
        id: u64,
        phase: TouchPhase,
        location: PhysicalPosition<f64>,
    ) -> Vec<InputEvent> {
        match self.active_touch {
            Some(active) if active != id => return Vec::new(),
            _ => {}
        }

        let moved = self.process_pointer_move(location);

        match phase {
            TouchPhase::Started => {
                self.active_touch = Some(id);
                vec![moved, self.pointer_input(PointerButton::Primary, ElementState::Pressed)]
            }
            TouchPhase::Moved => vec![moved],
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.active_touch = None;
                vec![moved, self.pointer_input(PointerButton::Primary, ElementState::Released)]
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn key_input(&self, key: KeyCode, state: ElementState) -> InputEvent {
        let modifiers = self.current_modifiers;
        match state {
            ElementState::Pressed => InputEvent::KeyDown { key, modifiers },
            ElementState::Released => InputEvent::KeyUp { key, modifiers },
        }
    }

    fn pointer_input(&self, button: PointerButton, state: ElementState) -> InputEvent {
        let modifiers = self.current_modifiers;
        match state {
            ElementState::Pressed => InputEvent::PointerDown { button, modifiers },
            ElementState::Released => InputEvent::PointerUp { button, modifiers },
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Maps digits, letters, arrows and the handful of control keys the games
/// bind. Everything else is `Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode as W;
        match code {
            W::Digit0 => KeyCode::Digit0,
            W::Digit1 => KeyCode::Digit1,
            W::Digit2 => KeyCode::Digit2,
            W::Digit3 => KeyCode::Digit3,
            W::Digit4 => KeyCode::Digit4,
            W::Digit5 => KeyCode::Digit5,
            W::Digit6 => KeyCode::Digit6,
            W::Digit7 => KeyCode::Digit7,
            W::Digit8 => KeyCode::Digit8,
            W::Digit9 => KeyCode::Digit9,

            W::KeyA => KeyCode::KeyA,
            W::KeyB => KeyCode::KeyB,
            W::KeyC => KeyCode::KeyC,
            W::KeyD => KeyCode::KeyD,
            W::KeyE => KeyCode::KeyE,
            W::KeyF => KeyCode::KeyF,
            W::KeyG => KeyCode::KeyG,
            W::KeyH => KeyCode::KeyH,
            W::KeyI => KeyCode::KeyI,
            W::KeyJ => KeyCode::KeyJ,
            W::KeyK => KeyCode::KeyK,
            W::KeyL => KeyCode::KeyL,
            W::KeyM => KeyCode::KeyM,
            W::KeyN => KeyCode::KeyN,
            W::KeyO => KeyCode::KeyO,
            W::KeyP => KeyCode::KeyP,
            W::KeyQ => KeyCode::KeyQ,
            W::KeyR => KeyCode::KeyR,
            W::KeyS => KeyCode::KeyS,
            W::KeyT => KeyCode::KeyT,
            W::KeyU => KeyCode::KeyU,
            W::KeyV => KeyCode::KeyV,
            W::KeyW => KeyCode::KeyW,
            W::KeyX => KeyCode::KeyX,
            W::KeyY => KeyCode::KeyY,
            W::KeyZ => KeyCode::KeyZ,

            W::ArrowUp => KeyCode::ArrowUp,
            W::ArrowDown => KeyCode::ArrowDown,
            W::ArrowLeft => KeyCode::ArrowLeft,
            W::ArrowRight => KeyCode::ArrowRight,

            W::Space => KeyCode::Space,
            W::Enter | W::NumpadEnter => KeyCode::Enter,
            W::Escape => KeyCode::Escape,
            W::Tab => KeyCode::Tab,
            W::Backspace => KeyCode::Backspace,

            _ => KeyCode::Unidentified,
        }
    }
}

impl From<MouseButton> for PointerButton {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => PointerButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift { state.insert(ModifiersState::SHIFT); }
        if ctrl { state.insert(ModifiersState::CONTROL); }
        if alt { state.insert(ModifiersState::ALT); }
        state
    }

    fn position(event: &InputEvent) -> (f32, f32) {
        match event {
            InputEvent::PointerMoved { x, y } => (*x, *y),
            other => panic!("Expected PointerMoved, got {:?}", other),
        }
    }

    #[test]
    fn modifiers_are_stamped_on_keys_and_buttons() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(modifiers(true, false, true));

        assert_eq!(
            processor.key_input(KeyCode::KeyS, ElementState::Pressed),
            InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers { shift: true, ctrl: false, alt: true } }
        );
        match processor.process_mouse_button(MouseButton::Left, ElementState::Released) {
            InputEvent::PointerUp { button, modifiers } => {
                assert_eq!(button, PointerButton::Primary);
                assert!(modifiers.shift && modifiers.alt);
            }
            other => panic!("Expected PointerUp, got {:?}", other),
        }
    }

    #[test]
    fn pointer_positions_are_logical() {
        let mut processor = InputProcessor::new();
        processor.set_scale_factor(2.0);

        let moved = processor.process_pointer_move(PhysicalPosition::new(1440.0, 1040.0));
        assert_eq!(position(&moved), (720.0, 520.0));

        // Nonsense factors keep the last good one.
        processor.set_scale_factor(0.0);
        let moved = processor.process_pointer_move(PhysicalPosition::new(300.0, 100.0));
        assert_eq!(position(&moved), (150.0, 50.0));
    }

    #[test]
    fn touch_is_scaled_and_single_contact() {
        let mut processor = InputProcessor::new();
        processor.set_scale_factor(1.5);

        let started = processor.touch_contact(7, TouchPhase::Started, PhysicalPosition::new(150.0, 300.0));
        assert_eq!(position(&started[0]), (100.0, 200.0));
        assert!(matches!(
            started[1],
            InputEvent::PointerDown { button: PointerButton::Primary, .. }
        ));

        assert!(processor
            .touch_contact(8, TouchPhase::Started, PhysicalPosition::new(0.0, 0.0))
            .is_empty());

        let ended = processor.touch_contact(7, TouchPhase::Ended, PhysicalPosition::new(150.0, 300.0));
        assert!(matches!(ended[1], InputEvent::PointerUp { .. }));
    }

    #[test]
    fn starts_with_no_modifiers() {
        let processor = InputProcessor::new();
        assert_eq!(processor.current_modifiers(), Modifiers::NONE);
    }

    #[test]
    fn keycode_conversion() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyW), KeyCode::KeyW);
        assert_eq!(KeyCode::from(WinitKeyCode::ArrowLeft), KeyCode::ArrowLeft);
        assert_eq!(KeyCode::from(WinitKeyCode::NumpadEnter), KeyCode::Enter);
        assert_eq!(KeyCode::from(WinitKeyCode::F13), KeyCode::Unidentified);
    }

    #[test]
    fn mouse_button_conversion() {
        assert_eq!(PointerButton::from(MouseButton::Left), PointerButton::Primary);
        assert_eq!(PointerButton::from(MouseButton::Right), PointerButton::Secondary);
        assert_eq!(PointerButton::from(MouseButton::Back), PointerButton::Other);
    }
}
