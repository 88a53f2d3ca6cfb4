//=========================================================================
// Global Context
//=========================================================================
//
// Shared data container for scenes.
//
// Contains state data that scenes read/write:
// - input_state: Low-level input state (keys, pointer, modifiers)
// - message_bus: Actions, scene transitions, payloads, feedback cues
// - time: Fixed tick delta and tick counter
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, StateTracker};
use crate::core::message_bus::MessageBus;

//=== FrameTime ===========================================================

/// Simulation clock for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds simulated by this tick (`1 / tps`).
    pub delta: f32,

    /// Number of ticks completed before this one.
    pub tick: u64,
}

impl FrameTime {
    pub fn from_tps(tps: f64) -> Self {
        Self {
            delta: Duration::from_secs_f64(1.0 / tps).as_secs_f32(),
            tick: 0,
        }
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::from_tps(60.0)
    }
}

//=== GlobalContext =======================================================

/// Shared context data accessible to scenes during updates.
///
/// Scenes receive `&GlobalContext` in lifecycle hooks and
/// `&mut GlobalContext` in `update()`.
pub struct GlobalContext {
    /// Raw input state for low-level queries.
    ///
    /// For bound actions, read `ActionEvent<A>` from the message bus.
    pub input_state: StateTracker,

    /// Frame-scoped typed messages. Cleared at the start of every tick.
    pub message_bus: MessageBus,

    pub time: FrameTime,

    /// Input batches for the current frame, consumed by the input system.
    pub(crate) frame_input_events: Vec<Vec<InputEvent>>,

    /// Set when the window lost focus since the last tick.
    pub(crate) focus_lost: bool,
}

impl GlobalContext {
    /// Creates a new context with empty state.
    pub fn new() -> Self {
        Self {
            input_state: StateTracker::new(),
            message_bus: MessageBus::new(),
            time: FrameTime::default(),
            frame_input_events: Vec::new(),
            focus_lost: false,
        }
    }

    pub(crate) fn with_tps(tps: f64) -> Self {
        Self {
            time: FrameTime::from_tps(tps),
            ..Self::new()
        }
    }
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new()
    }
}
