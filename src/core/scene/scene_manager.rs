//=========================================================================
// Scene Manager
//=========================================================================
//
// Manages scene registration, stack operations, and lifecycle.
//
// Scenes are stored in a HashMap by key and referenced via a stack
// of keys. This allows scenes to maintain state between activations,
// e.g. Game keeps running state while Pause sits on top of it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::Scene;
use crate::core::globals::GlobalContext;

//=== Scene Transition ====================================================

/// Scene stack operation, queued on the message bus during updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneTransition<K: SceneKey> {
    /// Adds a scene to the top of the stack.
    Push(K),

    /// Removes a specific scene from the stack.
    Remove(K),

    /// Replaces a scene in place.
    Replace(K, K),

    /// Empties the stack.
    Clear,

    #[default]
    Empty,
}

//=== Scene Key Trait =====================================================

/// Marker trait for scene identifiers (typically a game's scene enum).
pub trait SceneKey: Clone + Copy + Eq + Hash + Debug + Send + 'static {}

//=== Scene Manager =======================================================

/// Stack-based scene lifecycle manager.
pub struct SceneManager<S: SceneKey> {
    scenes: HashMap<S, Box<dyn Scene<S>>>,
    stack: Vec<S>,
}

impl<S: SceneKey> SceneManager<S> {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            scenes: HashMap::new(),
            stack: Vec::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a scene. Scenes must be registered before being pushed.
    pub fn register_scene<T>(&mut self, key: S, scene: T)
    where
        T: Scene<S> + 'static,
    {
        if self.scenes.insert(key, Box::new(scene)).is_some() {
            warn!(target: "scene", "Scene {:?} was already registered and has been replaced", key);
        }
    }

    /// Registers a scene and places it on the stack as the initial scene.
    ///
    /// `on_enter` runs when the engine calls [`SceneManager::start`].
    pub fn register_default<T>(&mut self, key: S, scene: T)
    where
        T: Scene<S> + 'static,
    {
        self.register_scene(key, scene);

        if self.stack.contains(&key) {
            warn!(target: "scene", "Scene {:?} is already in the stack", key);
        } else {
            debug!(target: "scene", "Registered scene {:?} as default and added to stack", key);
            self.stack.push(key);
        }
    }

    /// Calls `on_enter` on the initial scene.
    pub fn start(&mut self, context: &GlobalContext) {
        if let Some(&initial) = self.stack.first() {
            debug!(target: "scene", "Starting scene manager with initial scene: {:?}", initial);
            match self.scenes.get_mut(&initial) {
                Some(scene) => scene.on_enter(context),
                None => warn!(target: "scene", "Initial scene {:?} not registered", initial),
            }
        }
    }

    /// Notifies every stacked scene that the engine is stopping, top first.
    pub fn shutdown(&mut self, context: &GlobalContext) {
        info!(target: "scene", "Shutting down {} stacked scene(s)", self.stack.len());
        for &key in self.stack.iter().rev() {
            if let Some(scene) = self.scenes.get_mut(&key) {
                scene.on_shutdown(context);
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Current stack, bottom first.
    pub fn stack(&self) -> &[S] {
        &self.stack
    }

    pub fn top(&self) -> Option<S> {
        self.stack.last().copied()
    }

    pub fn is_registered(&self, key: S) -> bool {
        self.scenes.contains_key(&key)
    }

    //--- Update Loop ------------------------------------------------------

    /// Updates all transparent scenes and the topmost opaque scene.
    pub fn update(&mut self, context: &mut GlobalContext) {
        if self.stack.is_empty() {
            return;
        }

        let scenes_to_update = self.collect_active_scenes();

        for key in scenes_to_update {
            if let Some(scene) = self.scenes.get_mut(&key) {
                scene.update(context);
            }
        }
    }

    //--- Transition Processing --------------------------------------------

    /// Applies queued transitions in FIFO order.
    ///
    /// Called at the tick boundary after scene updates.
    pub fn process_transitions(&mut self, context: &mut GlobalContext) {
        let transitions = context.message_bus.drain::<SceneTransition<S>>();

        for transition in transitions {
            match transition {
                SceneTransition::Push(key) => self.push_internal(key, context),
                SceneTransition::Remove(key) => self.remove_internal(key, context),
                SceneTransition::Replace(old_key, new_key) => {
                    self.replace_internal(old_key, new_key, context)
                }
                SceneTransition::Clear => self.clear_internal(context),
                SceneTransition::Empty => {}
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn push_internal(&mut self, key: S, context: &GlobalContext) {
        if self.stack.contains(&key) {
            warn!(target: "scene", "Scene {:?} is already in the stack, skipping push", key);
            return;
        }

        if !self.scenes.contains_key(&key) {
            warn!(target: "scene", "Attempted to push unregistered scene {:?}", key);
            return;
        }

        debug!(target: "scene", "Pushing scene {:?} onto stack", key);
        self.stack.push(key);

        if let Some(scene) = self.scenes.get_mut(&key) {
            scene.on_enter(context);
        }
    }

    fn remove_internal(&mut self, key: S, context: &GlobalContext) {
        let Some(pos) = self.stack.iter().position(|&k| k == key) else {
            debug!(target: "scene", "Scene {:?} not found in stack, skipping removal", key);
            return;
        };

        debug!(target: "scene", "Removing scene {:?} from stack at position {}", key, pos);
        self.stack.remove(pos);

        if let Some(scene) = self.scenes.get_mut(&key) {
            scene.on_exit(context);
        }
    }

    fn replace_internal(&mut self, old_key: S, new_key: S, context: &GlobalContext) {
        let Some(pos) = self.stack.iter().position(|&k| k == old_key) else {
            warn!(target: "scene", "Scene {:?} not found in stack, skipping replacement", old_key);
            return;
        };

        if self.stack.contains(&new_key) {
            warn!(target: "scene", "Scene {:?} is already in the stack, skipping replacement", new_key);
            return;
        }

        if !self.scenes.contains_key(&new_key) {
            warn!(target: "scene", "Attempted to replace with unregistered scene {:?}", new_key);
            return;
        }

        debug!(target: "scene", "Replacing scene {:?} with {:?} at position {}", old_key, new_key, pos);

        if let Some(scene) = self.scenes.get_mut(&old_key) {
            scene.on_exit(context);
        }

        self.stack[pos] = new_key;

        if let Some(scene) = self.scenes.get_mut(&new_key) {
            scene.on_enter(context);
        }
    }

    fn clear_internal(&mut self, context: &GlobalContext) {
        debug!(target: "scene", "Clearing all scenes from stack");

        // Exit top-down, mirroring the order scenes were entered.
        for &key in self.stack.iter().rev() {
            if let Some(scene) = self.scenes.get_mut(&key) {
                scene.on_exit(context);
            }
        }

        self.stack.clear();
    }

    fn collect_active_scenes(&self) -> Vec<S> {
        let mut active = Vec::new();

        // Walk top-down, stop at the first opaque scene.
        for &key in self.stack.iter().rev() {
            active.insert(0, key);

            if let Some(scene) = self.scenes.get(&key) {
                if !scene.is_transparent() {
                    break;
                }
            }
        }

        active
    }
}

impl<S: SceneKey> Default for SceneManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
    enum TestScene {
        Menu,
        Game,
        Pause,
        Overlay,
    }

    impl SceneKey for TestScene {}

    type Journal = Arc<Mutex<Vec<String>>>;

    struct RecordingScene {
        name: &'static str,
        journal: Journal,
        transparent: bool,
        on_update: Option<SceneTransition<TestScene>>,
    }

    impl RecordingScene {
        fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: Arc::clone(journal),
                transparent: false,
                on_update: None,
            }
        }

        fn transparent(mut self) -> Self {
            self.transparent = true;
            self
        }

        fn requesting(mut self, transition: SceneTransition<TestScene>) -> Self {
            self.on_update = Some(transition);
            self
        }

        fn log(&self, event: &str) {
            self.journal.lock().push(format!("{}:{}", self.name, event));
        }
    }

    impl Scene<TestScene> for RecordingScene {
        fn on_enter(&mut self, _context: &GlobalContext) {
            self.log("enter");
        }

        fn on_exit(&mut self, _context: &GlobalContext) {
            self.log("exit");
        }

        fn on_shutdown(&mut self, _context: &GlobalContext) {
            self.log("shutdown");
        }

        fn update(&mut self, context: &mut GlobalContext) {
            self.log("update");
            if let Some(transition) = self.on_update.take() {
                context.message_bus.push(transition);
            }
        }

        fn is_transparent(&self) -> bool {
            self.transparent
        }
    }

    fn drain(journal: &Journal) -> Vec<String> {
        std::mem::take(&mut *journal.lock())
    }

    //--- SceneTransition Tests --------------------------------------------

    #[test]
    fn transition_default_is_empty() {
        let transition: SceneTransition<TestScene> = SceneTransition::default();
        assert_eq!(transition, SceneTransition::Empty);
    }

    //--- SceneManager Tests -----------------------------------------------

    #[test]
    fn start_enters_default_scene() {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        let context = GlobalContext::new();
        manager.register_default(TestScene::Menu, RecordingScene::new("menu", &journal));

        manager.start(&context);

        assert_eq!(drain(&journal), vec!["menu:enter"]);
        assert_eq!(manager.top(), Some(TestScene::Menu));
    }

    #[test]
    fn replace_runs_exit_then_enter() {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        let mut context = GlobalContext::new();
        manager.register_default(
            TestScene::Menu,
            RecordingScene::new("menu", &journal)
                .requesting(SceneTransition::Replace(TestScene::Menu, TestScene::Game)),
        );
        manager.register_scene(TestScene::Game, RecordingScene::new("game", &journal));
        manager.start(&context);
        drain(&journal);

        manager.update(&mut context);
        manager.process_transitions(&mut context);

        assert_eq!(drain(&journal), vec!["menu:update", "menu:exit", "game:enter"]);
        assert_eq!(manager.stack(), &[TestScene::Game]);
        assert!(!context.message_bus.has_messages::<SceneTransition<TestScene>>());
    }

    #[test]
    fn opaque_scene_blocks_updates_below() {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        let mut context = GlobalContext::new();
        manager.register_default(TestScene::Game, RecordingScene::new("game", &journal));
        manager.register_scene(TestScene::Pause, RecordingScene::new("pause", &journal));

        context.message_bus.push(SceneTransition::Push(TestScene::Pause));
        manager.process_transitions(&mut context);
        drain(&journal);

        manager.update(&mut context);
        assert_eq!(drain(&journal), vec!["pause:update"]);
    }

    #[test]
    fn transparent_scene_lets_lower_scene_update() {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        let mut context = GlobalContext::new();
        manager.register_default(TestScene::Game, RecordingScene::new("game", &journal));
        manager.register_scene(
            TestScene::Overlay,
            RecordingScene::new("overlay", &journal).transparent(),
        );

        context.message_bus.push(SceneTransition::Push(TestScene::Overlay));
        manager.process_transitions(&mut context);
        drain(&journal);

        manager.update(&mut context);
        assert_eq!(drain(&journal), vec!["game:update", "overlay:update"]);
    }

    #[test]
    fn duplicate_and_unregistered_pushes_are_ignored() {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        let mut context = GlobalContext::new();
        manager.register_default(TestScene::Game, RecordingScene::new("game", &journal));

        context.message_bus.push(SceneTransition::Push(TestScene::Game));
        context.message_bus.push(SceneTransition::Push(TestScene::Pause));
        manager.process_transitions(&mut context);

        assert_eq!(manager.stack(), &[TestScene::Game]);
        assert!(drain(&journal).is_empty());
    }

    #[test]
    fn clear_then_push_processes_fifo() {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        let mut context = GlobalContext::new();
        manager.register_default(TestScene::Game, RecordingScene::new("game", &journal));
        manager.register_scene(TestScene::Pause, RecordingScene::new("pause", &journal));
        manager.register_scene(TestScene::Menu, RecordingScene::new("menu", &journal));

        context.message_bus.push(SceneTransition::Push(TestScene::Pause));
        manager.process_transitions(&mut context);
        drain(&journal);

        context.message_bus.push(SceneTransition::<TestScene>::Clear);
        context.message_bus.push(SceneTransition::Push(TestScene::Menu));
        manager.process_transitions(&mut context);

        assert_eq!(drain(&journal), vec!["pause:exit", "game:exit", "menu:enter"]);
        assert_eq!(manager.stack(), &[TestScene::Menu]);
    }

    #[test]
    fn shutdown_visits_stack_top_down() {
        let journal = Journal::default();
        let mut manager = SceneManager::new();
        let mut context = GlobalContext::new();
        manager.register_default(TestScene::Game, RecordingScene::new("game", &journal));
        manager.register_scene(TestScene::Pause, RecordingScene::new("pause", &journal));
        context.message_bus.push(SceneTransition::Push(TestScene::Pause));
        manager.process_transitions(&mut context);
        drain(&journal);

        manager.shutdown(&context);

        assert_eq!(drain(&journal), vec!["pause:shutdown", "game:shutdown"]);
    }
}
