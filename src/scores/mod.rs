//=========================================================================
// Scores
//=========================================================================
//
// Per-game score keeping and the optional remote leaderboard.
//
//=========================================================================

//=== Module Declarations =================================================

mod kind;
mod leaderboard;
mod manager;

//=== Public API ==========================================================

pub use kind::{GameResult, GameStats, Outcome, ScoreKind, ScoreRecord};
pub use leaderboard::{
    HttpLeaderboard, Leaderboard, LeaderboardClient, LeaderboardEntry, LeaderboardError,
    OfflineLeaderboard,
};
pub use manager::ScoreManager;
