//=========================================================================
// Score Kinds & Records
//=========================================================================
//
// Static table of how each game ranks results, plus the stat record kept
// per game.
//
//   HighScore → higher value is better    (tetris, snake, 2048, tank_battle)
//   BestTime  → lower positive is better  (minesweeper, sudoku)
//   WinLoss   → tallies only              (gomoku, tictactoe)
//
//=========================================================================

//=== External Dependencies ===============================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::storage::GameId;

//=== ScoreKind ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreKind {
    HighScore,
    BestTime,
    WinLoss,
}

impl ScoreKind {
    pub fn for_game(game: GameId) -> Self {
        match game {
            GameId::Tetris | GameId::Snake | GameId::Game2048 | GameId::TankBattle => {
                ScoreKind::HighScore
            }
            GameId::Minesweeper | GameId::Sudoku => ScoreKind::BestTime,
            GameId::Gomoku | GameId::TicTacToe => ScoreKind::WinLoss,
        }
    }

    /// Whether `candidate` should replace `current` as the best value.
    ///
    /// Best times must be positive; win/loss games keep no best value.
    pub fn is_improvement(self, current: Option<f64>, candidate: f64) -> bool {
        if !candidate.is_finite() {
            return false;
        }
        match self {
            ScoreKind::HighScore => current.map_or(true, |best| candidate > best),
            ScoreKind::BestTime => candidate > 0.0 && current.map_or(true, |best| candidate < best),
            ScoreKind::WinLoss => false,
        }
    }
}

//=== Outcome & GameResult ================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// One finished game as reported by a game scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameResult {
    pub outcome: Outcome,
    /// Score or elapsed seconds, depending on the game's [`ScoreKind`].
    pub value: Option<f64>,
}

impl GameResult {
    pub fn scored(outcome: Outcome, score: f64) -> Self {
        Self { outcome, value: Some(score) }
    }

    /// A win that took `seconds`; only wins are eligible for best time.
    pub fn timed_win(seconds: f64) -> Self {
        Self { outcome: Outcome::Win, value: Some(seconds) }
    }

    pub fn plain(outcome: Outcome) -> Self {
        Self { outcome, value: None }
    }
}

//=== ScoreRecord =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub game: GameId,
    pub player_name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(game: GameId, player_name: impl Into<String>, value: f64) -> Self {
        Self {
            game,
            player_name: player_name.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}

//=== GameStats ===========================================================

/// Per-game tallies and the single best record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub best: Option<ScoreRecord>,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl GameStats {
    /// Fraction of games won, `0.0` before the first game.
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.total_games)
        }
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best.as_ref().map(|record| record.value)
    }

    pub(crate) fn tally(&mut self, outcome: Outcome) {
        self.total_games += 1;
        match outcome {
            Outcome::Win => {
                self.wins += 1;
                self.current_streak += 1;
                self.best_streak = self.best_streak.max(self.current_streak);
            }
            Outcome::Loss => {
                self.losses += 1;
                self.current_streak = 0;
            }
            Outcome::Draw => {
                self.draws += 1;
                self.current_streak = 0;
            }
        }
    }

    /// Replaces the best record if `record` improves on it.
    pub(crate) fn offer(&mut self, kind: ScoreKind, record: ScoreRecord) -> bool {
        if kind.is_improvement(self.best_value(), record.value) {
            self.best = Some(record);
            true
        } else {
            false
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn table_covers_every_game() {
        assert_eq!(ScoreKind::for_game(GameId::TankBattle), ScoreKind::HighScore);
        assert_eq!(ScoreKind::for_game(GameId::Game2048), ScoreKind::HighScore);
        assert_eq!(ScoreKind::for_game(GameId::Minesweeper), ScoreKind::BestTime);
        assert_eq!(ScoreKind::for_game(GameId::TicTacToe), ScoreKind::WinLoss);
    }

    #[test]
    fn streaks_and_win_rate() {
        let mut stats = GameStats::default();
        assert_eq!(stats.win_rate(), 0.0);

        for outcome in [Outcome::Win, Outcome::Win, Outcome::Loss, Outcome::Win] {
            stats.tally(outcome);
        }

        assert_eq!(stats.total_games, 4);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.win_rate(), 0.75);
    }

    #[test]
    fn zero_time_is_never_a_best() {
        assert!(!ScoreKind::BestTime.is_improvement(None, 0.0));
        assert!(!ScoreKind::BestTime.is_improvement(None, -3.0));
        assert!(ScoreKind::BestTime.is_improvement(None, 12.5));
    }

    proptest! {
        #[test]
        fn high_score_improves_only_when_higher(current in 0.0f64..1e6, candidate in 0.0f64..1e6) {
            prop_assert_eq!(
                ScoreKind::HighScore.is_improvement(Some(current), candidate),
                candidate > current
            );
        }

        #[test]
        fn best_time_improves_only_when_lower_and_positive(current in 0.1f64..1e4, candidate in -10.0f64..1e4) {
            prop_assert_eq!(
                ScoreKind::BestTime.is_improvement(Some(current), candidate),
                candidate > 0.0 && candidate < current
            );
        }

        #[test]
        fn win_loss_never_tracks_best(candidate in any::<f64>()) {
            prop_assert!(!ScoreKind::WinLoss.is_improvement(None, candidate));
        }
    }
}
