//=========================================================================
// Game Scene
//=========================================================================
//
// Owns the running `Battle` and drives it once per tick.
//
// Per tick:
//   1. Gather actions (bus + on-screen buttons) → PlayerInput per player
//   2. Pause requested? push Pause and stop
//   3. Battle::update
//   4. Feedback cues for enabled settings → message bus
//   5. Game over? hand the payload to GameOver
//
// Leaving mid-game (menu or shutdown) writes a {score, level} snapshot
// immediately so the menu can continue from it.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, info, trace};

//=== Internal Dependencies ===============================================

use super::{transition, GameSetup, TankScene, TankServices};
use crate::core::input::{
    ActionEvent, ActionQuery, PointerSubscriptions, SubscriptionOwner,
};
use crate::core::{GlobalContext, Scene, SceneTransition};
use crate::games::tank_battle::actions::{player_inputs, touch_layout, TankAction, MENU};
use crate::games::tank_battle::battle::{Battle, BattleEvent};
use crate::games::tank_battle::feedback;
use crate::settings::SettingsConfig;
use crate::storage::DataType;

//=== GameScene ===========================================================

pub struct GameScene {
    services: TankServices,
    battle: Option<Battle>,
    setup: GameSetup,
    settings: SettingsConfig,
    pointer: PointerSubscriptions<TankAction>,
    games_started: u64,
    music_started: bool,
}

impl GameScene {
    const POINTER_OWNER: SubscriptionOwner = SubscriptionOwner(1);

    pub fn new(services: TankServices) -> Self {
        Self {
            services,
            battle: None,
            setup: GameSetup::default(),
            settings: SettingsConfig::default(),
            pointer: PointerSubscriptions::new(),
            games_started: 0,
            music_started: false,
        }
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    /// HUD text in the active locale.
    pub fn hud_lines(&self) -> Vec<String> {
        let Some(battle) = &self.battle else {
            return Vec::new();
        };
        let hud = battle.hud();
        let s = &self.services;

        let mut lines = vec![
            s.text_with("hud.score", &[("score", hud.score.to_string())]),
            s.text_with("hud.level", &[("level", hud.level.to_string())]),
            s.text_with("hud.enemies", &[("count", hud.enemies_remaining.to_string())]),
        ];
        for (i, health) in hud.player_health.iter().enumerate() {
            lines.push(s.text_with(
                "hud.health",
                &[("player", (i + 1).to_string()), ("health", health.to_string())],
            ));
        }
        lines
    }

    fn next_seed(&mut self) -> u64 {
        let seed = match self.services.seed {
            Some(base) => base.wrapping_add(self.games_started),
            None => rand::random(),
        };
        self.games_started += 1;
        seed
    }

    /// Writes the running game's snapshot, skipping finished games.
    fn save_snapshot(&self) {
        let Some(battle) = self.battle.as_ref().filter(|b| !b.is_over()) else {
            return;
        };

        let snapshot = battle.snapshot();
        match self
            .services
            .data
            .save_data_immediate(TankServices::GAME, DataType::SavedGame, &snapshot)
        {
            Ok(()) => info!(target: "tank_battle", "Saved game at level {}, score {}", snapshot.level, snapshot.score),
            Err(e) => error!(target: "tank_battle", "Could not save game snapshot: {}", e),
        }
    }

    fn teardown(&mut self) {
        self.pointer.unsubscribe_owner(Self::POINTER_OWNER);
    }

    fn finish(&mut self, context: &mut GlobalContext, events: &[BattleEvent]) {
        let Some(payload) = events.iter().find_map(|e| match e {
            BattleEvent::GameOver(payload) => Some(*payload),
            _ => None,
        }) else {
            return;
        };

        if let Err(e) = self.services.data.delete_data(TankServices::GAME, DataType::SavedGame) {
            error!(target: "tank_battle", "Could not clear saved game: {}", e);
        }

        context.message_bus.push(payload);
        context.message_bus.push(GameSetup { resume: None, ..self.setup });
        transition(
            context,
            SceneTransition::Replace(TankScene::Game, TankScene::GameOver),
            MENU,
        );
    }
}

impl Scene<TankScene> for GameScene {
    fn on_enter(&mut self, context: &GlobalContext) {
        self.setup = context.message_bus.latest::<GameSetup>().copied().unwrap_or_default();
        self.settings = self.services.settings.lock().get();
        self.music_started = false;

        let seed = self.next_seed();
        let setup = self.setup;
        self.battle = Some(match setup.resume {
            Some(saved) => Battle::resume(setup.difficulty, setup.players, seed, saved),
            None => Battle::new(setup.difficulty, setup.players, seed),
        });

        self.teardown();
        for (region, action) in touch_layout() {
            self.pointer.subscribe(Self::POINTER_OWNER, region, action);
        }
        debug!(target: "tank_battle", "Game scene entered with {:?}", setup);
    }

    fn on_exit(&mut self, _context: &GlobalContext) {
        self.save_snapshot();
        self.teardown();
    }

    fn on_shutdown(&mut self, _context: &GlobalContext) {
        self.save_snapshot();
        self.teardown();
    }

    fn update(&mut self, context: &mut GlobalContext) {
        if !self.music_started {
            self.music_started = true;
            context.message_bus.push(feedback::music_cue(&self.settings));
        }

        let Some(battle) = self.battle.as_mut() else {
            return;
        };

        // Back from Pause.
        if battle.state().paused {
            battle.set_paused(false);
        }

        let mut actions: Vec<ActionEvent<TankAction>> =
            context.message_bus.read::<ActionEvent<TankAction>>().to_vec();
        self.pointer.resolve(&context.input_state, &mut actions);

        if actions.was_pressed(TankAction::Pause) {
            battle.set_paused(true);
            transition(context, SceneTransition::Push(TankScene::Pause), MENU);
            return;
        }

        let inputs = player_inputs(&actions);
        let events = battle.update(context.time.delta, &inputs);

        let hud_changed = events.iter().any(|e| {
            matches!(e, BattleEvent::TankDefeated { .. } | BattleEvent::WaveCleared { .. })
        });
        if hud_changed {
            debug!(target: "tank_battle", "[hud] {}", self.hud_lines().join(" | "));
        }

        for cue in feedback::cues_for(&events, &self.settings) {
            trace!(target: "tank_battle", "Feedback {:?}", cue);
            context.message_bus.push(cue);
        }

        self.finish(context, &events);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
