//=========================================================================
// Core Systems Orchestrator
//
// Central coordinator for all engine subsystems running on the logic
// (non-platform) thread.
//
// Responsibilities:
// - Own GlobalSystems (input, scenes) and the GlobalContext they share
// - Receive platform events via the bounded crossbeam channel
// - Maintain deterministic pacing using a fixed tick rate (TPS)
// - Notify stacked scenes on shutdown so they can save
//
// Notes:
// The orchestrator runs independently from the platform layer.
// Communication with the platform occurs only through message passing,
// and the same tick pipeline can be stepped headless for tests and
// simulations.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================

use crossbeam_channel::Receiver;
use log::{debug, info};

//=== Module Declarations =================================================

pub mod globals;
pub mod input;
pub mod message_bus;
pub(crate) mod platform_bridge;
pub mod scene;

//=== Public API ==========================================================

pub use globals::{FrameTime, GlobalContext, GlobalSystems};
pub use input::{Action, ActionEvent, ContextSwitch, InputEvent};
pub use message_bus::{Message, MessageBus};
pub use platform_bridge::PlatformError;
pub use scene::{Scene, SceneKey, SceneManager, SceneTransition};

//=== Internal Imports ====================================================

use platform_bridge::{CoreLiveness, EventCollector, PlatformEvent, TickControl};

//=== CoreSystemsOrchestrator =============================================

/// Owns the simulation state and drives the tick pipeline.
pub(crate) struct CoreSystemsOrchestrator<S: SceneKey, A: Action> {
    systems: GlobalSystems<S, A>,
    context: GlobalContext,
    tps: f64,
    started: bool,
}

impl<S: SceneKey, A: Action> CoreSystemsOrchestrator<S, A> {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(tps: f64) -> Self {
        Self {
            systems: GlobalSystems::new(),
            context: GlobalContext::with_tps(tps),
            tps,
            started: false,
        }
    }

    pub(crate) fn init_systems<F>(&mut self, init_fn: F)
    where
        F: FnOnce(&mut GlobalSystems<S, A>),
    {
        init_fn(&mut self.systems);
    }

    //--- Accessors --------------------------------------------------------

    pub(crate) fn systems(&self) -> &GlobalSystems<S, A> {
        &self.systems
    }

    pub(crate) fn context(&self) -> &GlobalContext {
        &self.context
    }

    //--- Tick API ---------------------------------------------------------

    /// Enters the initial scene once.
    pub(crate) fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.systems.scene_manager.start(&self.context);
        }
    }

    /// Runs one tick with the given input batches.
    pub(crate) fn tick(&mut self, batches: Vec<Vec<InputEvent>>, focus_lost: bool) {
        self.start();
        self.context.frame_input_events = batches;
        self.context.focus_lost |= focus_lost;
        self.systems.update(&mut self.context);
    }

    /// `true` once every scene has left the stack.
    pub(crate) fn is_idle(&self) -> bool {
        self.started && self.systems.scene_manager.stack().is_empty()
    }

    pub(crate) fn shutdown(&mut self) {
        info!(target: "engine", "Core systems shutting down after {} ticks", self.context.time.tick);
        self.systems.scene_manager.shutdown(&self.context);
    }

    //--- spawn_core_thread() ---------------------------------------------
    //
    // Each tick:
    //  1. Collects platform events
    //  2. Runs the global update pipeline
    //  3. Sleeps to maintain fixed pacing
    //  4. Exits on WindowClosed, channel disconnect or an empty scene stack
    //
    // `liveness` is cleared after the scenes have shut down.
    //
    pub(crate) fn spawn_core_thread(
        mut self,
        receiver: Receiver<PlatformEvent>,
        liveness: CoreLiveness,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.tps);

        thread::spawn(move || {
            let mut collector = EventCollector::new(receiver);
            self.start();

            loop {
                let frame_start = Instant::now();

                //--- Step 1: Gather platform events ------------------------
                if collector.collect_frame() == TickControl::Exit {
                    info!(target: "engine", "Core thread exiting.");
                    break;
                }

                //--- Step 2: Update systems --------------------------------
                let batches = collector.take_batches();
                let focus_lost = collector.take_focus_lost();
                self.tick(batches, focus_lost);

                if self.is_idle() {
                    debug!(target: "engine", "Scene stack empty, stopping core thread");
                    break;
                }

                //--- Step 3: Maintain deterministic pacing ----------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            self.shutdown();
            liveness.mark_stopped();
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestScene {
        Only,
    }

    impl SceneKey for TestScene {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestAction {
        Quit,
    }

    impl Action for TestAction {}

    struct QuitAfter(u64);

    impl Scene<TestScene> for QuitAfter {
        fn update(&mut self, context: &mut GlobalContext) {
            if context.time.tick + 1 >= self.0 {
                context.message_bus.push(SceneTransition::<TestScene>::Clear);
            }
        }
    }

    fn orchestrator(quit_after: u64) -> CoreSystemsOrchestrator<TestScene, TestAction> {
        let mut core = CoreSystemsOrchestrator::new(240.0);
        core.init_systems(|systems| {
            systems
                .scene_manager
                .register_default(TestScene::Only, QuitAfter(quit_after));
        });
        core
    }

    #[test]
    fn tick_advances_clock() {
        let mut core = orchestrator(100);
        core.tick(Vec::new(), false);
        core.tick(Vec::new(), false);

        assert_eq!(core.context().time.tick, 2);
        assert!(!core.is_idle());
    }

    #[test]
    fn empty_stack_marks_idle() {
        let mut core = orchestrator(3);
        for _ in 0..3 {
            core.tick(Vec::new(), false);
        }
        assert!(core.is_idle());
        assert!(core.systems().scene_manager.stack().is_empty());
    }

    #[test]
    fn core_thread_stops_when_scenes_finish() {
        let (_tx, rx) = unbounded::<PlatformEvent>();
        let liveness = CoreLiveness::new();
        let handle = orchestrator(5).spawn_core_thread(rx, liveness.clone());
        assert!(handle.join().is_ok());
        assert!(!liveness.is_alive());
    }

    #[test]
    fn core_thread_stops_on_window_closed() {
        let (tx, rx) = unbounded();
        let handle = orchestrator(u64::MAX).spawn_core_thread(rx, CoreLiveness::new());
        tx.send(PlatformEvent::WindowClosed).unwrap();
        assert!(handle.join().is_ok());
    }
}
