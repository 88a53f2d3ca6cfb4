//=========================================================================
// Woodcat Engine
//
// Main entry point and coordinator for the runtime.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──────────>  [Windowed]
//         │                          │                          spawns logic thread
//         ├─ with_tps()              │                          runs platform
//         ├─ with_channel_capacity() │                          blocks until exit
//         └─ with_window()           │
//                                    └──step() / run_headless()  [Headless]
//                                        same tick pipeline, caller's thread
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{CoreLiveness, PlatformEvent};
use crate::core::{Action, CoreSystemsOrchestrator, GlobalContext, GlobalSystems, InputEvent, SceneKey};
use crate::platform::{Platform, WindowSpec};

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic updates per second)
/// - **Channel capacity**: 128 events
/// - **Window**: "Woodcat Arcade", 800×600
///
/// # Examples
///
/// ```no_run
/// use woodcat_arcade::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum ArcadeScene { Main }
/// impl SceneKey for ArcadeScene {}
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum ArcadeAction { Fire }
/// impl Action for ArcadeAction {}
///
/// EngineBuilder::<ArcadeScene, ArcadeAction>::new()
///     .with_tps(120.0)
///     .with_window("Tank Battle", 800, 600)
///     .build()
///     .init(|systems| {
///         systems.input.bind_key(KeyCode::Space, ArcadeAction::Fire, InputContext::Primary);
///     })
///     .run();
/// ```
pub struct EngineBuilder<S: SceneKey, A: Action> {
    tps: f64,
    channel_capacity: usize,
    window: WindowSpec,
    _phantom: std::marker::PhantomData<(S, A)>,
}

impl<S: SceneKey, A: Action> EngineBuilder<S, A> {
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            window: WindowSpec::default(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the channel capacity for platform → core communication.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Sets the window title and logical size.
    pub fn with_window(mut self, title: impl Into<String>, width: u32, height: u32) -> Self {
        self.window = WindowSpec {
            title: title.into(),
            width,
            height,
        };
        self
    }

    pub fn build(self) -> Engine<S, A> {
        info!(target: "engine", "Building engine (TPS: {}, channel: {})", self.tps, self.channel_capacity);

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(self.tps),
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            window: self.window,
        }
    }
}

impl<S: SceneKey, A: Action> Default for EngineBuilder<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Arcade runtime.
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreSystemsOrchestrator (Logic Thread @ TPS)
///   │     └─► InputSystem, SceneManager
///   │
///   └─► Platform (winit Event Loop)
///         └─► Window, Input Polling
///
/// Communication: bounded crossbeam channel (PlatformEvent)
/// ```
pub struct Engine<S: SceneKey, A: Action> {
    orchestrator: CoreSystemsOrchestrator<S, A>,
    tps: f64,
    channel_capacity: usize,
    window: WindowSpec,
}

impl<S: SceneKey, A: Action> Engine<S, A> {
    //--- Initialization ---------------------------------------------------

    /// Configures input bindings and scenes before the first tick.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut GlobalSystems<S, A>),
    {
        info!(target: "engine", "Initializing engine systems");
        self.orchestrator.init_systems(init_fn);
        self
    }

    //--- Windowed Execution -----------------------------------------------

    /// Starts the runtime and blocks until the window closes.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the platform → core channel
    /// 2. Spawns the logic thread at the configured TPS
    /// 3. Runs the platform event loop (blocks here)
    /// 4. On close: joins the logic thread, which shuts scenes down
    pub fn run(self) {
        info!(target: "engine", "Starting engine runtime (TPS: {})", self.tps);

        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);

        let liveness = CoreLiveness::new();
        let core_handle = self.orchestrator.spawn_core_thread(rx, liveness.clone());
        info!(target: "engine", "Core logic thread spawned");

        let platform = Platform::new(tx, self.window, liveness);
        if let Err(e) = platform.run() {
            error!(target: "engine", "Platform error: {}", e);
        }

        info!(target: "engine", "Platform event loop exited");

        match core_handle.join() {
            Ok(()) => info!(target: "engine", "Core thread terminated cleanly"),
            Err(e) => error!(target: "engine", "Core thread panicked: {:?}", e),
        }

        info!(target: "engine", "Engine shutdown complete");
    }

    //--- Headless Execution -----------------------------------------------

    /// Runs one tick on the caller's thread with a single input batch.
    pub fn step(&mut self, events: Vec<InputEvent>) {
        let batches = if events.is_empty() { Vec::new() } else { vec![events] };
        self.orchestrator.tick(batches, false);
    }

    /// Runs one tick after the window lost focus.
    pub fn step_focus_lost(&mut self) {
        self.orchestrator.tick(Vec::new(), true);
    }

    /// Runs up to `ticks` ticks without input, then shuts down.
    ///
    /// Stops early once the scene stack is empty. Returns ticks executed.
    pub fn run_headless(mut self, ticks: u64) -> u64 {
        info!(target: "engine", "Running headless for up to {} ticks", ticks);

        let mut executed = 0;
        while executed < ticks && !self.orchestrator.is_idle() {
            self.step(Vec::new());
            executed += 1;
        }

        self.shutdown();
        executed
    }

    /// Delivers `on_shutdown` to every stacked scene.
    pub fn shutdown(&mut self) {
        self.orchestrator.shutdown();
    }

    //--- Accessors --------------------------------------------------------

    pub fn context(&self) -> &GlobalContext {
        self.orchestrator.context()
    }

    pub fn scene_stack(&self) -> &[S] {
        self.orchestrator.systems().scene_manager.stack()
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{ActionEvent, ActionQuery, InputContext, KeyCode};
    use crate::core::{Scene, SceneTransition};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestScene {
        Main,
        Next,
    }

    impl SceneKey for TestScene {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestAction {
        Jump,
    }

    impl Action for TestAction {}

    struct Jumper {
        jumps: Arc<Mutex<u32>>,
        shutdowns: Arc<Mutex<u32>>,
    }

    impl Scene<TestScene> for Jumper {
        fn update(&mut self, context: &mut GlobalContext) {
            if context
                .message_bus
                .read::<ActionEvent<TestAction>>()
                .was_pressed(TestAction::Jump)
            {
                *self.jumps.lock() += 1;
            }
        }

        fn on_shutdown(&mut self, _context: &GlobalContext) {
            *self.shutdowns.lock() += 1;
        }
    }

    struct Finisher;

    impl Scene<TestScene> for Finisher {
        fn update(&mut self, context: &mut GlobalContext) {
            context.message_bus.push(SceneTransition::<TestScene>::Clear);
        }
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::<TestScene, TestAction>::new();
        assert_eq!(builder.tps, 60.0);
        assert_eq!(builder.channel_capacity, 128);
        assert_eq!(builder.window, WindowSpec::default());
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = EngineBuilder::<TestScene, TestAction>::new()
            .with_tps(120.0)
            .with_channel_capacity(256)
            .with_window("Tank Battle", 640, 480)
            .build();

        assert_eq!(engine.tps, 120.0);
        assert_eq!(engine.channel_capacity, 256);
        assert_eq!(engine.window.title, "Tank Battle");
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::<TestScene, TestAction>::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::<TestScene, TestAction>::new().with_channel_capacity(0);
    }

    //=====================================================================
    // Headless Tests
    //=====================================================================

    #[test]
    fn step_delivers_bound_actions() {
        let jumps = Arc::new(Mutex::new(0));
        let shutdowns = Arc::new(Mutex::new(0));
        let scene = Jumper { jumps: Arc::clone(&jumps), shutdowns: Arc::clone(&shutdowns) };

        let mut engine = EngineBuilder::<TestScene, TestAction>::new()
            .build()
            .init(|systems| {
                systems.input.bind_key(KeyCode::Space, TestAction::Jump, InputContext::Primary);
                systems.scene_manager.register_default(TestScene::Main, scene);
            });

        engine.step(vec![InputEvent::key_down(KeyCode::Space)]);
        engine.step(Vec::new());
        engine.shutdown();

        assert_eq!(*jumps.lock(), 1);
        assert_eq!(*shutdowns.lock(), 1);
        assert_eq!(engine.context().time.tick, 2);
        assert_eq!(engine.scene_stack(), &[TestScene::Main]);
    }

    #[test]
    fn run_headless_stops_on_empty_stack() {
        let engine = EngineBuilder::<TestScene, TestAction>::new()
            .build()
            .init(|systems| {
                systems.scene_manager.register_default(TestScene::Next, Finisher);
            });

        assert_eq!(engine.run_headless(100), 1);
    }
}
