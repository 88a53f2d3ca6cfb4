//=========================================================================
// Score Manager
//=========================================================================
//
// Local score keeping on top of the DataManager.
//
//   record_game_result() → tally outcome → offer best value → save stats
//   update_high_score()  → offer best value → save stats
//
// Stats live under `woodcat_<game>_stats` and are written immediately,
// so a failed write is logged and reported as `false`; there is no retry.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::{debug, error, info};

//=== Internal Dependencies ===============================================

use super::kind::{GameResult, GameStats, Outcome, ScoreKind, ScoreRecord};
use crate::storage::{DataManager, DataType, GameId};

//=== ScoreManager ========================================================

#[derive(Clone)]
pub struct ScoreManager {
    data: Arc<DataManager>,
}

impl ScoreManager {
    pub fn new(data: Arc<DataManager>) -> Self {
        Self { data }
    }

    //--- Queries ----------------------------------------------------------

    pub fn stats(&self, game: GameId) -> GameStats {
        self.data.load_data(game, DataType::Stats, GameStats::default())
    }

    /// Best score for points games, `0.0` when none or not a points game.
    pub fn high_score(&self, game: GameId) -> f64 {
        if ScoreKind::for_game(game) != ScoreKind::HighScore {
            return 0.0;
        }
        self.stats(game).best_value().unwrap_or(0.0)
    }

    /// Best completion time in seconds for timed games.
    pub fn best_time(&self, game: GameId) -> Option<f64> {
        if ScoreKind::for_game(game) != ScoreKind::BestTime {
            return None;
        }
        self.stats(game).best_value()
    }

    pub fn win_rate(&self, game: GameId) -> f64 {
        self.stats(game).win_rate()
    }

    //--- Updates ----------------------------------------------------------

    /// Tallies a finished game and updates the best value when improved.
    ///
    /// Returns `false` if the stats could not be saved.
    pub fn record_game_result(&self, game: GameId, player: &str, result: GameResult) -> bool {
        let kind = ScoreKind::for_game(game);
        let mut stats = self.stats(game);
        stats.tally(result.outcome);

        let eligible = match kind {
            ScoreKind::HighScore => true,
            ScoreKind::BestTime => result.outcome == Outcome::Win,
            ScoreKind::WinLoss => false,
        };

        if let (true, Some(value)) = (eligible, result.value) {
            if stats.offer(kind, ScoreRecord::new(game, player, value)) {
                info!(target: "scores", "New best for {}: {} by {}", game, value, player);
            }
        }

        debug!(
            target: "scores",
            "{} result {:?}: {} games, {} wins",
            game, result.outcome, stats.total_games, stats.wins
        );
        self.persist(game, &stats)
    }

    /// Offers `value` as a new best without counting a game.
    ///
    /// Returns whether it became the new best and was saved.
    pub fn update_high_score(&self, game: GameId, player: &str, value: f64) -> bool {
        let kind = ScoreKind::for_game(game);
        let mut stats = self.stats(game);

        if !stats.offer(kind, ScoreRecord::new(game, player, value)) {
            return false;
        }

        info!(target: "scores", "New best for {}: {} by {}", game, value, player);
        self.persist(game, &stats)
    }

    /// Clears the stats for one game.
    pub fn reset(&self, game: GameId) -> bool {
        match self.data.delete_data(game, DataType::Stats) {
            Ok(_) => {
                info!(target: "scores", "Reset stats for {}", game);
                true
            }
            Err(e) => {
                error!(target: "scores", "Failed to reset stats for {}: {}", game, e);
                false
            }
        }
    }

    fn persist(&self, game: GameId, stats: &GameStats) -> bool {
        match self.data.save_data_immediate(game, DataType::Stats, stats) {
            Ok(()) => true,
            Err(e) => {
                error!(target: "scores", "Failed to save stats for {}: {}", game, e);
                false
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
