//=========================================================================
// Settings
//=========================================================================
//
// Per-game player preferences.
//
// Loaded once when a scene starts, written back through the debounced
// DataManager on every change, stored under `woodcat_<game>_settings`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::storage::{DataManager, DataType, GameId};

//=== Difficulty ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Easy → Medium → Hard → Easy.
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== SettingsConfig ======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub difficulty: Difficulty,
    pub sound: bool,
    pub music: bool,
    pub vibration: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            sound: true,
            music: true,
            vibration: true,
        }
    }
}

//=== SettingsStore =======================================================

/// Current settings for one game plus the handle to persist them.
pub struct SettingsStore {
    game: GameId,
    data: Arc<DataManager>,
    current: SettingsConfig,
}

impl SettingsStore {
    /// Loads stored settings, or defaults when none are saved.
    pub fn load(game: GameId, data: Arc<DataManager>) -> Self {
        let current = data.load_data(game, DataType::Settings, SettingsConfig::default());
        debug!(target: "storage", "Loaded settings for {}: {:?}", game, current);
        Self { game, data, current }
    }

    pub fn get(&self) -> SettingsConfig {
        self.current
    }

    /// Re-reads from storage, discarding unsaved state.
    pub fn reload(&mut self) {
        self.current = self
            .data
            .load_data(self.game, DataType::Settings, SettingsConfig::default());
    }

    /// Applies `change` and saves the result.
    pub fn update(&mut self, change: impl FnOnce(&mut SettingsConfig)) -> SettingsConfig {
        change(&mut self.current);

        if let Err(e) = self.data.save_data(self.game, DataType::Settings, &self.current) {
            warn!(target: "storage", "Could not save settings for {}: {}", self.game, e);
        }
        self.current
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.update(|s| s.sound = !s.sound).sound
    }

    pub fn toggle_music(&mut self) -> bool {
        self.update(|s| s.music = !s.music).music
    }

    pub fn toggle_vibration(&mut self) -> bool {
        self.update(|s| s.vibration = !s.vibration).vibration
    }

    pub fn cycle_difficulty(&mut self) -> Difficulty {
        self.update(|s| s.difficulty = s.difficulty.next()).difficulty
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, StorageOptions};

    #[test]
    fn defaults_when_nothing_saved() {
        let data = Arc::new(DataManager::in_memory().unwrap());
        let store = SettingsStore::load(GameId::TankBattle, data);
        assert_eq!(store.get(), SettingsConfig::default());
    }

    #[test]
    fn sound_toggle_survives_reload() {
        let backend = Arc::new(MemoryBackend::new());
        {
            let data = Arc::new(DataManager::new(backend.clone(), StorageOptions::default()).unwrap());
            let mut store = SettingsStore::load(GameId::TankBattle, data);
            assert!(!store.toggle_sound());
        }

        let data = Arc::new(DataManager::new(backend, StorageOptions::default()).unwrap());
        let store = SettingsStore::load(GameId::TankBattle, data);
        assert!(!store.get().sound);
        assert!(store.get().music);
    }

    #[test]
    fn difficulty_cycles_and_serializes_lowercase() {
        let data = Arc::new(DataManager::in_memory().unwrap());
        let mut store = SettingsStore::load(GameId::TankBattle, data);

        assert_eq!(store.cycle_difficulty(), Difficulty::Hard);
        assert_eq!(store.cycle_difficulty(), Difficulty::Easy);
        assert_eq!(serde_json::to_value(Difficulty::Easy).unwrap(), "easy");
    }

    #[test]
    fn partial_stored_settings_fill_defaults() {
        let data = Arc::new(DataManager::in_memory().unwrap());
        data.save_data(GameId::Snake, DataType::Settings, &serde_json::json!({"sound": false}))
            .unwrap();

        let store = SettingsStore::load(GameId::Snake, data);
        assert!(!store.get().sound);
        assert_eq!(store.get().difficulty, Difficulty::Medium);
    }
}
