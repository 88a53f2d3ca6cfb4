//=========================================================================
// Menu Scene
//=========================================================================
//
// Start, continue, sound, music, vibration, difficulty, player count,
// quit.
//
// Every settings change is saved through the settings store as it
// happens. "Continue" is offered only when an exit-time snapshot exists.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::{transition, GameSetup, TankScene, TankServices};
use crate::core::input::{ActionEvent, ActionQuery};
use crate::core::{GlobalContext, Scene, SceneTransition};
use crate::games::tank_battle::actions::{TankAction, GAMEPLAY, MENU};
use crate::games::tank_battle::battle::SavedGame;
use crate::games::tank_battle::feedback::{music_cue, FeedbackCue};
use crate::games::tank_battle::tuning::MAX_PLAYERS;
use crate::storage::DataType;

//=== MenuScene ===========================================================

pub struct MenuScene {
    services: TankServices,
    players: usize,
    saved: Option<SavedGame>,
}

impl MenuScene {
    pub fn new(services: TankServices) -> Self {
        Self {
            services,
            players: 1,
            saved: None,
        }
    }

    /// Menu text in the active locale, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        let s = &self.services;
        let settings = s.settings.lock().get();

        let mut lines = vec![s.text("menu.title"), s.text("menu.start")];

        if let Some(saved) = self.saved {
            lines.push(s.text_with(
                "menu.continue",
                &[("level", saved.level.to_string()), ("score", saved.score.to_string())],
            ));
        }

        lines.push(s.text(if settings.sound { "menu.sound_on" } else { "menu.sound_off" }));
        lines.push(s.text(if settings.music { "menu.music_on" } else { "menu.music_off" }));
        lines.push(s.text(if settings.vibration {
            "menu.vibration_on"
        } else {
            "menu.vibration_off"
        }));
        let difficulty = s.text(&format!("difficulty.{}", settings.difficulty));
        lines.push(s.text_with("menu.difficulty", &[("difficulty", difficulty)]));
        lines.push(s.text_with("menu.players", &[("count", self.players.to_string())]));
        lines
    }

    fn show(&self) {
        for line in self.lines() {
            info!(target: "tank_battle", "[menu] {}", line);
        }
    }

    fn start(&self, context: &mut GlobalContext, resume: Option<SavedGame>) {
        let setup = GameSetup {
            difficulty: self.services.settings.lock().get().difficulty,
            players: self.players,
            resume,
        };
        debug!(target: "tank_battle", "Starting game: {:?}", setup);

        context.message_bus.push(setup);
        transition(context, SceneTransition::Replace(TankScene::Menu, TankScene::Game), GAMEPLAY);
    }
}

impl Scene<TankScene> for MenuScene {
    fn on_enter(&mut self, _context: &GlobalContext) {
        self.saved = self
            .services
            .data
            .load_data(TankServices::GAME, DataType::SavedGame, None);
        self.show();
    }

    fn update(&mut self, context: &mut GlobalContext) {
        let actions: Vec<ActionEvent<TankAction>> =
            context.message_bus.read::<ActionEvent<TankAction>>().to_vec();

        if actions.was_pressed(TankAction::Confirm) {
            self.start(context, None);
            return;
        }

        if actions.was_pressed(TankAction::Continue) {
            match self.saved {
                Some(saved) => self.start(context, Some(saved)),
                None => debug!(target: "tank_battle", "Nothing to continue"),
            }
            return;
        }

        if actions.was_pressed(TankAction::Back) {
            info!(target: "tank_battle", "Leaving the arcade");
            transition(context, SceneTransition::Clear, MENU);
            return;
        }

        let mut changed = false;
        let mut cues: Vec<FeedbackCue> = Vec::new();
        {
            let mut settings = self.services.settings.lock();
            if actions.was_pressed(TankAction::ToggleSound) {
                settings.toggle_sound();
                changed = true;
            }
            if actions.was_pressed(TankAction::ToggleMusic) {
                settings.toggle_music();
                cues.push(music_cue(&settings.get()));
                changed = true;
            }
            if actions.was_pressed(TankAction::ToggleVibration) {
                settings.toggle_vibration();
                changed = true;
            }
            if actions.was_pressed(TankAction::CycleDifficulty) {
                settings.cycle_difficulty();
                changed = true;
            }
        }
        if actions.was_pressed(TankAction::TogglePlayers) {
            self.players = if self.players >= MAX_PLAYERS { 1 } else { self.players + 1 };
            changed = true;
        }

        for cue in cues {
            context.message_bus.push(cue);
        }
        if changed {
            self.show();
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::{Leaderboard, OfflineLeaderboard};
    use crate::storage::DataManager;
    use std::sync::Arc;
    use std::time::Duration;

    fn services() -> TankServices {
        let data = Arc::new(DataManager::in_memory().unwrap());
        let board = Leaderboard::new(Box::new(OfflineLeaderboard), 0, Duration::ZERO);
        TankServices::new(data, board)
    }

    #[test]
    fn continue_line_only_with_a_snapshot() {
        let services = services();
        let mut menu = MenuScene::new(services.clone());
        menu.on_enter(&GlobalContext::new());
        assert!(!menu.lines().iter().any(|l| l.starts_with("menu.continue")));

        services
            .data
            .save_data(TankServices::GAME, DataType::SavedGame, &SavedGame { score: 900, level: 2 })
            .unwrap();
        menu.on_enter(&GlobalContext::new());
        assert!(menu.lines().iter().any(|l| l == "menu.continue"));
        assert_eq!(menu.saved, Some(SavedGame { score: 900, level: 2 }));
    }

    #[test]
    fn music_and_vibration_toggles_save_and_show() {
        let services = services();
        let mut menu = MenuScene::new(services.clone());
        let mut context = GlobalContext::new();

        context.message_bus.push(ActionEvent::pressed(TankAction::ToggleMusic));
        context.message_bus.push(ActionEvent::pressed(TankAction::ToggleVibration));
        menu.update(&mut context);

        let settings = services.settings.lock().get();
        assert!(!settings.music);
        assert!(!settings.vibration);
        assert_eq!(context.message_bus.latest::<FeedbackCue>(), Some(&FeedbackCue::Music(false)));

        let lines = menu.lines();
        assert!(lines.iter().any(|l| l == "menu.music_off"));
        assert!(lines.iter().any(|l| l == "menu.vibration_off"));
    }

    #[test]
    fn confirm_starts_a_game_with_current_settings() {
        let services = services();
        services.settings.lock().cycle_difficulty();
        let mut menu = MenuScene::new(services);
        let mut context = GlobalContext::new();

        context.message_bus.push(ActionEvent::pressed(TankAction::TogglePlayers));
        menu.update(&mut context);
        context.message_bus.clear_all();

        context.message_bus.push(ActionEvent::pressed(TankAction::Confirm));
        menu.update(&mut context);

        let setup = context.message_bus.latest::<GameSetup>().copied().unwrap();
        assert_eq!(setup.players, 2);
        assert_eq!(setup.difficulty, crate::settings::Difficulty::Hard);
        assert_eq!(
            context.message_bus.latest::<SceneTransition<TankScene>>(),
            Some(&SceneTransition::Replace(TankScene::Menu, TankScene::Game))
        );
    }
}
