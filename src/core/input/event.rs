//=========================================================================
// Input Event Types
//
// Portable representation of low-level input coming from the platform.
//
// Keyboard, mouse and touch all arrive here in one vocabulary: keys are
// physical key codes, and mouse buttons and touch contacts are both
// "pointer" events so the game treats a tap and a click the same way.
//
// Event Flow:
// ```text
// Platform Layer (winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    StateTracker (held / pressed / released)
//         ↓
//    ActionEvent<A> (game actions)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::hash::{Hash, Hasher};

//=== PointerButton =======================================================

/// Pointer button identifier.
///
/// Touch contacts are reported as [`PointerButton::Primary`], so a finger
/// on the screen behaves like a held left mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button or a touch contact.
    Primary,

    /// Right mouse button.
    Secondary,

    /// Wheel click.
    Middle,

    /// Side buttons and anything exotic.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the produced character, so
/// WASD stays WASD on an AZERTY layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,

    /// Key reported by the platform but not mapped by the input layer.
    Unidentified,
}

//=== InputEvent ==========================================================

/// Low-level input event from the platform layer.
///
/// # Equality & Hashing Semantics
///
/// Events compare by kind and payload. `PointerMoved` events are equal
/// regardless of coordinates so the platform buffer can coalesce them
/// (last position wins).
///
/// ```text
/// KeyDown{A, CTRL}    == KeyDown{A, CTRL}     ✓
/// KeyDown{A, CTRL}    == KeyDown{A, NONE}     ✗
/// PointerMoved{1,2}   == PointerMoved{9,9}    ✓
/// ```
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown {
        key: KeyCode,
        modifiers: Modifiers,
    },

    KeyUp {
        key: KeyCode,
        modifiers: Modifiers,
    },

    PointerDown {
        button: PointerButton,
        modifiers: Modifiers,
    },

    PointerUp {
        button: PointerButton,
        modifiers: Modifiers,
    },

    /// Pointer (cursor or touch contact) moved, in window pixels with a
    /// top-left origin.
    PointerMoved { x: f32, y: f32 },

    /// Unsupported platform event, ignored by the input system.
    Unidentified,
}

//--- Implementation ------------------------------------------------------

impl InputEvent {
    /// Convenience constructor for an unmodified key press.
    pub fn key_down(key: KeyCode) -> Self {
        Self::KeyDown { key, modifiers: Modifiers::NONE }
    }

    /// Convenience constructor for an unmodified key release.
    pub fn key_up(key: KeyCode) -> Self {
        Self::KeyUp { key, modifiers: Modifiers::NONE }
    }

    /// Convenience constructor for a primary pointer press (click or tap).
    pub fn tap_down() -> Self {
        Self::PointerDown { button: PointerButton::Primary, modifiers: Modifiers::NONE }
    }

    /// Convenience constructor for a primary pointer release.
    pub fn tap_up() -> Self {
        Self::PointerUp { button: PointerButton::Primary, modifiers: Modifiers::NONE }
    }

    /// Returns `true` for events that must keep their relative order.
    pub fn is_discrete(&self) -> bool {
        !matches!(self, Self::PointerMoved { .. } | Self::Unidentified)
    }
}

//--- Trait Implementations -----------------------------------------------

impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        use InputEvent::*;
        match (self, other) {
            (KeyDown { key: a, modifiers: ma }, KeyDown { key: b, modifiers: mb })
            | (KeyUp { key: a, modifiers: ma }, KeyUp { key: b, modifiers: mb }) => {
                a == b && ma == mb
            }
            (
                PointerDown { button: a, modifiers: ma },
                PointerDown { button: b, modifiers: mb },
            )
            | (
                PointerUp { button: a, modifiers: ma },
                PointerUp { button: b, modifiers: mb },
            ) => a == b && ma == mb,
            (PointerMoved { .. }, PointerMoved { .. }) => true,
            (Unidentified, Unidentified) => true,
            _ => false,
        }
    }
}

impl Eq for InputEvent {}

impl Hash for InputEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::KeyDown { key, modifiers } | Self::KeyUp { key, modifiers } => {
                key.hash(state);
                modifiers.hash(state);
            }
            Self::PointerDown { button, modifiers } | Self::PointerUp { button, modifiers } => {
                button.hash(state);
                modifiers.hash(state);
            }
            // Coordinates are deliberately excluded, matching PartialEq.
            _ => {}
        }
    }
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// Bindings match modifiers exactly: `Ctrl+S` does not fire on
/// `Ctrl+Shift+S`, and plain `S` does not fire on `Ctrl+S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn pointer_moves_are_equal_regardless_of_position() {
        let a = InputEvent::PointerMoved { x: 1.0, y: 2.0 };
        let b = InputEvent::PointerMoved { x: 300.0, y: 40.0 };
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn key_events_respect_modifiers() {
        let plain = InputEvent::key_down(KeyCode::KeyS);
        let ctrl = InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::CTRL };
        assert_ne!(plain, ctrl);
        assert_ne!(plain, InputEvent::key_up(KeyCode::KeyS));
    }

    #[test]
    fn pointer_moves_coalesce_in_sets() {
        let mut set = HashSet::new();
        set.insert(InputEvent::PointerMoved { x: 1.0, y: 1.0 });
        set.replace(InputEvent::PointerMoved { x: 5.0, y: 6.0 });
        assert_eq!(set.len(), 1);

        match set.iter().next() {
            Some(InputEvent::PointerMoved { x, y }) => assert_eq!((*x, *y), (5.0, 6.0)),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn discrete_classification() {
        assert!(InputEvent::tap_down().is_discrete());
        assert!(InputEvent::key_up(KeyCode::Enter).is_discrete());
        assert!(!InputEvent::PointerMoved { x: 0.0, y: 0.0 }.is_discrete());
        assert!(!InputEvent::Unidentified.is_discrete());
    }
}
