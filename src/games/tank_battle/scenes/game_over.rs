//=========================================================================
// Game Over Scene
//=========================================================================
//
// Records the finished game and offers a restart or the menu.
//
// On enter:
//   GameOverPayload → ScoreManager::record_game_result (local, sync)
//                   → Leaderboard::submit (remote, background thread)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{transition, GameSetup, TankScene, TankServices};
use crate::core::input::{ActionEvent, ActionQuery};
use crate::core::{GlobalContext, Scene, SceneTransition};
use crate::games::tank_battle::actions::{TankAction, GAMEPLAY, MENU};
use crate::games::tank_battle::battle::GameOverPayload;
use crate::scores::{GameResult, LeaderboardEntry, Outcome};

//=== GameOverScene =======================================================

pub struct GameOverScene {
    services: TankServices,
    payload: Option<GameOverPayload>,
    restart: GameSetup,
    new_best: bool,
    submission: Option<JoinHandle<bool>>,
}

impl GameOverScene {
    pub fn new(services: TankServices) -> Self {
        Self {
            services,
            payload: None,
            restart: GameSetup::default(),
            new_best: false,
            submission: None,
        }
    }

    pub fn payload(&self) -> Option<GameOverPayload> {
        self.payload
    }

    pub fn is_new_best(&self) -> bool {
        self.new_best
    }

    /// Records locally; returns whether the score beat the stored best.
    fn record(&self, payload: GameOverPayload) -> bool {
        let scores = &self.services.scores;
        let previous = scores.high_score(TankServices::GAME);
        let score = f64::from(payload.score);

        let result = GameResult::scored(Outcome::Loss, score);
        if !scores.record_game_result(TankServices::GAME, &self.services.player_name, result) {
            warn!(target: "tank_battle", "Result for this game was not saved");
        }

        score > previous
    }

    fn submit_remote(&mut self, payload: GameOverPayload) {
        if self.services.leaderboard.is_local_only() {
            return;
        }

        self.join_submission();

        let board = Arc::clone(&self.services.leaderboard);
        let entry = LeaderboardEntry::new(
            TankServices::GAME,
            self.services.player_name.clone(),
            i64::from(payload.score),
        );

        let spawned = thread::Builder::new()
            .name("woodcat-leaderboard".to_string())
            .spawn(move || board.submit(&entry));

        match spawned {
            Ok(handle) => self.submission = Some(handle),
            Err(e) => warn!(target: "tank_battle", "Could not start leaderboard upload: {}", e),
        }
    }

    fn join_submission(&mut self) {
        if let Some(handle) = self.submission.take() {
            match handle.join() {
                Ok(accepted) => debug!(target: "tank_battle", "Leaderboard upload finished: {}", accepted),
                Err(_) => warn!(target: "tank_battle", "Leaderboard upload thread panicked"),
            }
        }
    }

    fn show(&self, payload: GameOverPayload) {
        let s = &self.services;
        info!(target: "tank_battle", "[game over] {}", s.text("gameover.title"));
        info!(
            target: "tank_battle",
            "[game over] {}",
            s.text_with(
                "gameover.summary",
                &[
                    ("score", payload.score.to_string()),
                    ("level", payload.level.to_string()),
                    ("defeated", payload.total_defeated.to_string()),
                ],
            )
        );
        if self.new_best {
            info!(target: "tank_battle", "[game over] {}", s.text("gameover.new_best"));
        }
        info!(target: "tank_battle", "[game over] {}", s.text("gameover.restart"));
    }
}

impl Scene<TankScene> for GameOverScene {
    fn on_enter(&mut self, context: &GlobalContext) {
        self.restart = context.message_bus.latest::<GameSetup>().copied().unwrap_or_default();
        self.payload = context.message_bus.latest::<GameOverPayload>().copied();

        let Some(payload) = self.payload else {
            warn!(target: "tank_battle", "Game over without a result");
            return;
        };

        self.new_best = self.record(payload);
        self.submit_remote(payload);
        self.show(payload);
    }

    fn on_shutdown(&mut self, _context: &GlobalContext) {
        self.join_submission();
    }

    fn update(&mut self, context: &mut GlobalContext) {
        let actions = context.message_bus.read::<ActionEvent<TankAction>>();

        if actions.was_pressed(TankAction::Confirm) {
            let setup = GameSetup {
                difficulty: self.services.settings.lock().get().difficulty,
                ..self.restart
            };
            context.message_bus.push(setup);
            transition(
                context,
                SceneTransition::Replace(TankScene::GameOver, TankScene::Game),
                GAMEPLAY,
            );
        } else if actions.was_pressed(TankAction::Back) || actions.was_pressed(TankAction::ToMenu) {
            transition(
                context,
                SceneTransition::Replace(TankScene::GameOver, TankScene::Menu),
                MENU,
            );
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
    use std::time::Duration;

    fn services() -> TankServices {
        let data = Arc::new(DataManager::in_memory().unwrap());
        let board = Leaderboard::new(Box::new(OfflineLeaderboard), 0, Duration::ZERO);
        TankServices::new(data, board).with_player("Ada")
    }

    fn enter_with(scene: &mut GameOverScene, score: u32) {
        let mut context = GlobalContext::new();
        context.message_bus.push(GameOverPayload { score, level: 2, total_defeated: 4 });
        scene.on_enter(&context);
    }

    #[test]
    fn records_result_and_detects_new_best() {
        let services = services();
        let mut scene = GameOverScene::new(services.clone());

        enter_with(&mut scene, 800);
        assert!(scene.is_new_best());
        assert_eq!(services.scores.high_score(TankServices::GAME), 800.0);

        enter_with(&mut scene, 500);
        assert!(!scene.is_new_best());
        assert_eq!(services.scores.high_score(TankServices::GAME), 800.0);
        assert_eq!(services.scores.stats(TankServices::GAME).total_games, 2);
    }

    #[test]
    fn confirm_restarts_with_previous_setup() {
        let mut scene = GameOverScene::new(services());
        let mut context = GlobalContext::new();
        context.message_bus.push(GameSetup { players: 2, ..GameSetup::default() });
        context.message_bus.push(GameOverPayload { score: 100, level: 1, total_defeated: 1 });
        scene.on_enter(&context);
        context.message_bus.clear_all();

        context.message_bus.push(ActionEvent::pressed(TankAction::Confirm));
        scene.update(&mut context);

        assert_eq!(context.message_bus.latest::<GameSetup>().map(|s| s.players), Some(2));
        assert_eq!(
            context.message_bus.latest::<SceneTransition<TankScene>>(),
            Some(&SceneTransition::Replace(TankScene::GameOver, TankScene::Game))
        );
    }
}
