//=========================================================================
// Global Systems
//=========================================================================
//
// Container for engine-level systems with logic.
//
// Contains systems that process input, manage scenes, and coordinate
// game logic. Systems operate on GlobalContext data.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::GlobalContext;
use crate::core::input::{Action, ContextSwitch, InputSystem};
use crate::core::scene::{SceneKey, SceneManager};

//=== GlobalSystems =======================================================

/// Container for engine-level logic systems.
///
/// - `input`: action bindings and per-frame resolution
/// - `scene_manager`: stack-based scene lifecycle manager
pub struct GlobalSystems<S: SceneKey, A: Action> {
    pub input: InputSystem<A>,
    pub scene_manager: SceneManager<S>,
}

impl<S: SceneKey, A: Action> GlobalSystems<S, A> {
    pub(crate) fn new() -> Self {
        Self {
            input: InputSystem::new(),
            scene_manager: SceneManager::new(),
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs one tick.
    ///
    /// # Processing Pipeline
    ///
    /// 1. Clear last tick's messages
    /// 2. Fold input batches into state and resolve actions
    /// 3. Publish `ActionEvent<A>`s on the message bus
    /// 4. Update active scenes
    /// 5. Apply the latest `ContextSwitch` request
    /// 6. Apply queued scene transitions
    /// 7. Advance the tick counter
    pub(crate) fn update(&mut self, context: &mut GlobalContext) {
        context.message_bus.clear_all();

        if context.focus_lost {
            debug!(target: "input", "Focus lost, releasing held inputs");
            context.frame_input_events.clear();
            context.focus_lost = false;
            self.input.release_all(&mut context.input_state);
        } else {
            self.input
                .process_frame(&mut context.input_state, &context.frame_input_events);
            context.frame_input_events.clear();
        }

        for action in self.input.actions() {
            context.message_bus.push(*action);
        }

        self.scene_manager.update(context);

        if let Some(&ContextSwitch(next)) = context.message_bus.latest::<ContextSwitch>() {
            self.input.set_context(next);
        }

        self.scene_manager.process_transitions(context);

        context.time.tick += 1;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
