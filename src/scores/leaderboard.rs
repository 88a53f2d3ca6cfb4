//=========================================================================
// Remote Leaderboard
//=========================================================================
//
// Optional online score board.
//
//   Leaderboard (retry + degrade)
//     └─ LeaderboardClient (trait)
//          ├─ HttpLeaderboard:    POST /scores, GET /scores?game=..
//          └─ OfflineLeaderboard: accepts nothing, returns nothing
//
// Each call is retried with linear backoff. Once every attempt fails the
// wrapper switches to local-only mode for the rest of the session and
// serves the last fetched page from local storage.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::config::LeaderboardConfig;
use crate::storage::{DataManager, DataType, GameId};

//=== LeaderboardError ====================================================

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard returned HTTP {0}")]
    Status(u16),

    #[error("leaderboard unreachable: {0}")]
    Transport(String),

    #[error("leaderboard response unreadable: {0}")]
    Decode(#[from] std::io::Error),

    #[error("leaderboard is offline")]
    Offline,
}

impl From<ureq::Error> for LeaderboardError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => LeaderboardError::Status(code),
            ureq::Error::Transport(transport) => LeaderboardError::Transport(transport.to_string()),
        }
    }
}

//=== LeaderboardEntry ====================================================

/// One row of the remote `scores` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: i64,
    pub game: GameId,
    pub created_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn new(game: GameId, player_name: impl Into<String>, score: i64) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            game,
            created_at: Utc::now(),
        }
    }
}

//=== LeaderboardClient ===================================================

pub trait LeaderboardClient: Send + Sync {
    fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError>;

    /// Top entries for `game`, best first.
    fn top_scores(&self, game: GameId) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

//--- HttpLeaderboard -----------------------------------------------------

pub struct HttpLeaderboard {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpLeaderboard {
    pub const PAGE_SIZE: usize = 20;

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn scores_url(&self) -> String {
        format!("{}/scores", self.base_url)
    }
}

impl LeaderboardClient for HttpLeaderboard {
    fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        self.agent.post(&self.scores_url()).send_json(entry)?;
        Ok(())
    }

    fn top_scores(&self, game: GameId) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let limit = Self::PAGE_SIZE.to_string();
        let entries = self
            .agent
            .get(&self.scores_url())
            .query("game", game.as_str())
            .query("order", "score.desc")
            .query("limit", &limit)
            .call()?
            .into_json()?;
        Ok(entries)
    }
}

//--- OfflineLeaderboard --------------------------------------------------

/// Client used when no endpoint is configured.
pub struct OfflineLeaderboard;

impl LeaderboardClient for OfflineLeaderboard {
    fn submit(&self, _entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        Err(LeaderboardError::Offline)
    }

    fn top_scores(&self, _game: GameId) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Err(LeaderboardError::Offline)
    }
}

//=== Leaderboard =========================================================

/// Retrying, self-degrading front for a [`LeaderboardClient`].
pub struct Leaderboard {
    client: Box<dyn LeaderboardClient>,
    data: Option<Arc<DataManager>>,
    max_retries: u32,
    retry_delay: Duration,
    local_only: AtomicBool,
}

impl Leaderboard {
    pub fn new(client: Box<dyn LeaderboardClient>, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            data: None,
            max_retries,
            retry_delay,
            local_only: AtomicBool::new(false),
        }
    }

    /// Builds the HTTP client when enabled, otherwise a local-only board.
    pub fn from_config(config: &LeaderboardConfig) -> Self {
        if config.enabled {
            info!(target: "scores", "Remote leaderboard at {}", config.base_url);
            let client = HttpLeaderboard::new(config.base_url.clone(), config.timeout());
            Self::new(Box::new(client), config.max_retries, config.retry_delay())
        } else {
            let board = Self::new(Box::new(OfflineLeaderboard), 0, Duration::ZERO);
            board.local_only.store(true, Ordering::Relaxed);
            board
        }
    }

    /// Keeps the last fetched page per game in local storage.
    pub fn with_local_cache(mut self, data: Arc<DataManager>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_local_only(&self) -> bool {
        self.local_only.load(Ordering::Relaxed)
    }

    //--- Operations -------------------------------------------------------

    /// Submits an entry. Returns whether the remote accepted it.
    pub fn submit(&self, entry: &LeaderboardEntry) -> bool {
        if self.is_local_only() {
            debug!(target: "scores", "Local-only mode, skipping submission for {}", entry.game);
            return false;
        }

        self.with_retry("submit", || self.client.submit(entry)).is_some()
    }

    /// Fetches the top page, falling back to the locally cached page.
    pub fn top_scores(&self, game: GameId) -> Vec<LeaderboardEntry> {
        if !self.is_local_only() {
            if let Some(entries) = self.with_retry("top_scores", || self.client.top_scores(game)) {
                if let Some(data) = &self.data {
                    if let Err(e) = data.save_data(game, DataType::LeaderboardCache, &entries) {
                        warn!(target: "scores", "Could not cache leaderboard for {}: {}", game, e);
                    }
                }
                return entries;
            }
        }

        self.data
            .as_ref()
            .map(|data| data.load_data(game, DataType::LeaderboardCache, Vec::new()))
            .unwrap_or_default()
    }

    /// Runs `call` up to `max_retries + 1` times, sleeping
    /// `retry_delay × attempt` between tries.
    fn with_retry<T>(
        &self,
        operation: &str,
        mut call: impl FnMut() -> Result<T, LeaderboardError>,
    ) -> Option<T> {
        let attempts = self.max_retries + 1;

        for attempt in 1..=attempts {
            match call() {
                Ok(value) => return Some(value),
                Err(e) if attempt < attempts => {
                    debug!(target: "scores", "Leaderboard {} attempt {} failed: {}", operation, attempt, e);
                    thread::sleep(self.retry_delay * attempt);
                }
                Err(e) => {
                    if !self.local_only.swap(true, Ordering::Relaxed) {
                        warn!(
                            target: "scores",
                            "Leaderboard {} failed after {} attempts ({}), switching to local-only mode",
                            operation, attempts, e
                        );
                    }
                }
            }
        }

        None
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    /// Fails the first `failures` calls, then succeeds.
    struct Flaky {
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    impl Flaky {
        fn attempt(&self) -> Result<(), LeaderboardError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(LeaderboardError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    impl LeaderboardClient for Flaky {
        fn submit(&self, _entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
            self.attempt()
        }

        fn top_scores(&self, game: GameId) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            self.attempt()?;
            Ok(vec![LeaderboardEntry::new(game, "ace", 9000)])
        }
    }

    fn board(failures: u32, retries: u32) -> (Leaderboard, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let client = Flaky { failures, calls: Arc::clone(&calls) };
        (Leaderboard::new(Box::new(client), retries, Duration::ZERO), calls)
    }

    fn entry() -> LeaderboardEntry {
        LeaderboardEntry::new(GameId::TankBattle, "p1", 1200)
    }

    #[test]
    fn entry_serializes_to_wire_shape() {
        let value = serde_json::to_value(entry()).unwrap();
        assert_eq!(value["player_name"], "p1");
        assert_eq!(value["score"], 1200);
        assert_eq!(value["game"], "tank_battle");
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn transient_failures_are_retried() {
        let (board, calls) = board(2, 3);
        assert!(board.submit(&entry()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!board.is_local_only());
    }

    #[test]
    fn exhausted_retries_switch_to_local_only() {
        let (board, calls) = board(10, 2);
        assert!(!board.submit(&entry()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(board.is_local_only());

        assert!(!board.submit(&entry()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn fetched_page_is_served_from_cache_when_offline() {
        let data = Arc::new(DataManager::in_memory().unwrap());
        let (online, _) = board(0, 0);
        let online = online.with_local_cache(Arc::clone(&data));
        assert_eq!(online.top_scores(GameId::TankBattle).len(), 1);

        let offline = Leaderboard::from_config(&LeaderboardConfig::default())
            .with_local_cache(data);
        assert!(offline.is_local_only());
        let cached = offline.top_scores(GameId::TankBattle);
        assert_eq!(cached[0].player_name, "ace");
    }

    #[test]
    fn offline_client_rejects_everything() {
        assert!(matches!(OfflineLeaderboard.submit(&entry()), Err(LeaderboardError::Offline)));
        assert!(OfflineLeaderboard.top_scores(GameId::Snake).is_err());
    }
}
