//=========================================================================
// State Tracker
//=========================================================================
//
// Low-level input state with per-frame deltas.
//
// Architecture:
//   InputEvent → process_events() → HashSet (keys/buttons held) → query
//
// Frame lifecycle: begin_frame() → process_events() → finalize_frame() → query
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, Modifiers, PointerButton};

//=== StateTracker ========================================================

/// Tracks persistent state (keys held) and per-frame deltas (pressed/released).
pub struct StateTracker {
    //--- Persistent State (survives frame boundary) ----------------------
    keys_down: HashSet<KeyCode>,
    buttons_down: HashSet<PointerButton>,
    pointer_position: (f32, f32),
    modifiers: Modifiers,

    //--- Frame Deltas (reset each frame) ---------------------------------
    keys_pressed_this_frame: HashSet<KeyCode>,
    keys_released_this_frame: HashSet<KeyCode>,
    buttons_pressed_this_frame: HashSet<PointerButton>,
    buttons_released_this_frame: HashSet<PointerButton>,

    //--- Continuous Input ------------------------------------------------
    pointer_delta: (f32, f32),
    last_pointer_position: (f32, f32),
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            buttons_down: HashSet::new(),
            pointer_position: (0.0, 0.0),
            modifiers: Modifiers::NONE,
            keys_pressed_this_frame: HashSet::new(),
            keys_released_this_frame: HashSet::new(),
            buttons_pressed_this_frame: HashSet::new(),
            buttons_released_this_frame: HashSet::new(),
            pointer_delta: (0.0, 0.0),
            last_pointer_position: (0.0, 0.0),
        }
    }

    //--- Frame Processing -------------------------------------------------

    /// Clears frame-specific deltas.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed_this_frame.clear();
        self.keys_released_this_frame.clear();
        self.buttons_pressed_this_frame.clear();
        self.buttons_released_this_frame.clear();
        self.last_pointer_position = self.pointer_position;
    }

    pub(crate) fn process_events(&mut self, events: &[InputEvent]) {
        for event in events {
            self.process_event(event);
        }
    }

    /// Computes the pointer delta for the frame.
    pub(crate) fn finalize_frame(&mut self) {
        self.pointer_delta = (
            self.pointer_position.0 - self.last_pointer_position.0,
            self.pointer_position.1 - self.last_pointer_position.1,
        );
    }

    /// Releases every held input, emitting release deltas.
    ///
    /// Used when the window loses the event stream (e.g. engine pause) so no
    /// key stays stuck down.
    pub(crate) fn release_all(&mut self) {
        self.keys_released_this_frame.extend(self.keys_down.drain());
        self.buttons_released_this_frame.extend(self.buttons_down.drain());
    }

    //--- Internal Helpers -------------------------------------------------

    fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown { key, modifiers } => {
                self.modifiers = *modifiers;
                if self.keys_down.insert(*key) {
                    self.keys_pressed_this_frame.insert(*key);
                }
            }

            InputEvent::KeyUp { key, modifiers } => {
                self.modifiers = *modifiers;
                if self.keys_down.remove(key) {
                    self.keys_released_this_frame.insert(*key);
                }
            }

            InputEvent::PointerDown { button, modifiers } => {
                self.modifiers = *modifiers;
                if self.buttons_down.insert(*button) {
                    self.buttons_pressed_this_frame.insert(*button);
                }
            }

            InputEvent::PointerUp { button, modifiers } => {
                self.modifiers = *modifiers;
                if self.buttons_down.remove(button) {
                    self.buttons_released_this_frame.insert(*button);
                }
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_position = (*x, *y);
            }

            InputEvent::Unidentified => {}
        }
    }

    //=====================================================================
    // Query API - Keyboard
    //=====================================================================

    /// `true` only on the frame the key went UP → DOWN.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed_this_frame.contains(&key)
    }

    /// `true` while the key is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// `true` only on the frame the key went DOWN → UP.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released_this_frame.contains(&key)
    }

    //=====================================================================
    // Query API - Pointer
    //=====================================================================

    pub fn is_button_pressed(&self, button: PointerButton) -> bool {
        self.buttons_pressed_this_frame.contains(&button)
    }

    pub fn is_button_down(&self, button: PointerButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn is_button_released(&self, button: PointerButton) -> bool {
        self.buttons_released_this_frame.contains(&button)
    }

    /// Pointer position in window pixels (top-left origin).
    pub fn pointer_position(&self) -> (f32, f32) {
        self.pointer_position
    }

    /// Pointer movement since the previous frame.
    pub fn pointer_delta(&self) -> (f32, f32) {
        self.pointer_delta
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    //=====================================================================
    // Query API - Iteration
    //=====================================================================

    pub fn keys_down(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys_down.iter()
    }

    pub fn keys_pressed(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys_pressed_this_frame.iter()
    }

    pub fn keys_released(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys_released_this_frame.iter()
    }

    pub fn buttons_down(&self) -> impl Iterator<Item = &PointerButton> {
        self.buttons_down.iter()
    }

    pub fn buttons_pressed(&self) -> impl Iterator<Item = &PointerButton> {
        self.buttons_pressed_this_frame.iter()
    }

    pub fn buttons_released(&self) -> impl Iterator<Item = &PointerButton> {
        self.buttons_released_this_frame.iter()
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
