//=========================================================================
// Storage Keys & Records
//=========================================================================
//
// Typed addressing for saved data.
//
//   StorageKey { game: GameId, data_type: DataType }
//        ↓ Display
//   "woodcat_<game>_<dataType>"
//
// The typed key is what the debounce queue and TTL cache hash on; the
// string form only exists at the backend boundary.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

//=== GameId ==============================================================

/// Every game in the arcade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    Tetris,
    Snake,
    #[serde(rename = "2048")]
    Game2048,
    Minesweeper,
    Sudoku,
    Gomoku,
    #[serde(rename = "tictactoe")]
    TicTacToe,
    TankBattle,
}

impl GameId {
    pub const ALL: [GameId; 8] = [
        GameId::Tetris,
        GameId::Snake,
        GameId::Game2048,
        GameId::Minesweeper,
        GameId::Sudoku,
        GameId::Gomoku,
        GameId::TicTacToe,
        GameId::TankBattle,
    ];

    /// Identifier used in storage keys and leaderboard rows.
    pub fn as_str(self) -> &'static str {
        match self {
            GameId::Tetris => "tetris",
            GameId::Snake => "snake",
            GameId::Game2048 => "2048",
            GameId::Minesweeper => "minesweeper",
            GameId::Sudoku => "sudoku",
            GameId::Gomoku => "gomoku",
            GameId::TicTacToe => "tictactoe",
            GameId::TankBattle => "tank_battle",
        }
    }

    /// Human-readable name stored alongside each record.
    pub fn display_name(self) -> &'static str {
        match self {
            GameId::Tetris => "Tetris",
            GameId::Snake => "Snake",
            GameId::Game2048 => "2048",
            GameId::Minesweeper => "Minesweeper",
            GameId::Sudoku => "Sudoku",
            GameId::Gomoku => "Gomoku",
            GameId::TicTacToe => "Tic-Tac-Toe",
            GameId::TankBattle => "Tank Battle",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== DataType ============================================================

/// Kind of data saved per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Settings,
    Stats,
    SavedGame,
    /// Last leaderboard page fetched from the remote service.
    LeaderboardCache,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Settings,
        DataType::Stats,
        DataType::SavedGame,
        DataType::LeaderboardCache,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Settings => "settings",
            DataType::Stats => "stats",
            DataType::SavedGame => "savedGame",
            DataType::LeaderboardCache => "leaderboardCache",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== StorageKey ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    pub game: GameId,
    pub data_type: DataType,
}

impl StorageKey {
    pub const PREFIX: &'static str = "woodcat";

    pub const fn new(game: GameId, data_type: DataType) -> Self {
        Self { game, data_type }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", Self::PREFIX, self.game, self.data_type)
    }
}

//=== StoredRecord ========================================================

/// Envelope written to the backend for every key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub key: String,
    pub game_name: String,
    pub data: Value,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub version: u32,
}

impl StoredRecord {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(key: StorageKey, data: Value) -> Self {
        Self {
            key: key.to_string(),
            game_name: key.game.display_name().to_string(),
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
            version: Self::CURRENT_VERSION,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
