//=========================================================================
// Asset Cache
//=========================================================================
//
// Policy-driven cache in front of the network for game assets.
//
// Architecture:
//   get(url) → route_for(url) → (CacheName, CachePolicy)
//                                     ↓
//     CacheFirst:           cached? serve : fetch + store
//     NetworkFirst:         fetch + store, else serve cached
//     StaleWhileRevalidate: cached? serve + refresh on a thread
//                                 : fetch + store
//
// Routes are checked in registration order; the first match wins and
// unmatched URLs use the dynamic cache with network-first.
//
//=========================================================================

//=== Module Declarations =================================================

mod fetcher;

//=== Public API ==========================================================

pub use fetcher::{FetchError, Fetcher, HttpFetcher, RetryingFetcher};

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use log::{debug, trace, warn};
use parking_lot::Mutex;

//=== Cache & Policy Types ================================================

/// The three named caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheName {
    /// Shell assets shipped with a release.
    Static,
    /// API responses and anything unrouted.
    Dynamic,
    /// Per-game sprites, sounds and level data.
    Game,
}

impl CacheName {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheName::Static => "woodcat-static-v1",
            CacheName::Dynamic => "woodcat-dynamic-v1",
            CacheName::Game => "woodcat-game-v1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

/// How a route matches a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl UrlPattern {
    pub fn matches(&self, url: &str) -> bool {
        match self {
            UrlPattern::Prefix(p) => url.starts_with(p.as_str()),
            UrlPattern::Suffix(s) => url.ends_with(s.as_str()),
            UrlPattern::Contains(c) => url.contains(c.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: UrlPattern,
    pub cache: CacheName,
    pub policy: CachePolicy,
}

/// One stored response.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAsset {
    pub bytes: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

type Store = HashMap<CacheName, HashMap<String, CachedAsset>>;

//=== AssetCache ==========================================================

pub struct AssetCache {
    fetcher: Arc<dyn Fetcher>,
    routes: Vec<Route>,
    store: Arc<Mutex<Store>>,
    refreshing: Arc<Mutex<HashSet<String>>>,
    refresh_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl AssetCache {
    const FALLBACK_ROUTE: (CacheName, CachePolicy) = (CacheName::Dynamic, CachePolicy::NetworkFirst);

    /// Cache with no routes; everything goes network-first.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            routes: Vec::new(),
            store: Arc::new(Mutex::new(HashMap::new())),
            refreshing: Arc::new(Mutex::new(HashSet::new())),
            refresh_handles: Mutex::new(Vec::new()),
        }
    }

    /// Arcade layout: shell assets cache-first, score API network-first,
    /// game data stale-while-revalidate.
    pub fn with_default_routes(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(fetcher)
            .with_route(UrlPattern::Contains("/scores".into()), CacheName::Dynamic, CachePolicy::NetworkFirst)
            .with_route(UrlPattern::Prefix("/games/".into()), CacheName::Game, CachePolicy::StaleWhileRevalidate)
            .with_route(UrlPattern::Suffix(".png".into()), CacheName::Static, CachePolicy::CacheFirst)
            .with_route(UrlPattern::Suffix(".mp3".into()), CacheName::Static, CachePolicy::CacheFirst)
            .with_route(UrlPattern::Suffix(".json".into()), CacheName::Static, CachePolicy::CacheFirst)
    }

    pub fn with_route(mut self, pattern: UrlPattern, cache: CacheName, policy: CachePolicy) -> Self {
        self.routes.push(Route { pattern, cache, policy });
        self
    }

    pub fn route_for(&self, url: &str) -> (CacheName, CachePolicy) {
        self.routes
            .iter()
            .find(|route| route.pattern.matches(url))
            .map(|route| (route.cache, route.policy))
            .unwrap_or(Self::FALLBACK_ROUTE)
    }

    //--- Retrieval --------------------------------------------------------

    /// Resolves `url` through its route's policy.
    pub fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let (cache, policy) = self.route_for(url);
        trace!(target: "asset_cache", "{} → {} ({:?})", url, cache.as_str(), policy);

        match policy {
            CachePolicy::CacheFirst => match self.cached(cache, url) {
                Some(bytes) => Ok(bytes),
                None => self.fetch_and_store(cache, url),
            },

            CachePolicy::NetworkFirst => match self.fetch_and_store(cache, url) {
                Ok(bytes) => Ok(bytes),
                Err(e) => match self.cached(cache, url) {
                    Some(bytes) => {
                        warn!(target: "asset_cache", "Serving cached {} after fetch failure: {}", url, e);
                        Ok(bytes)
                    }
                    None => Err(e),
                },
            },

            CachePolicy::StaleWhileRevalidate => match self.cached(cache, url) {
                Some(bytes) => {
                    self.revalidate(cache, url);
                    Ok(bytes)
                }
                None => self.fetch_and_store(cache, url),
            },
        }
    }

    /// Stored bytes for `url`, without touching the network.
    pub fn cached(&self, cache: CacheName, url: &str) -> Option<Vec<u8>> {
        self.store
            .lock()
            .get(&cache)
            .and_then(|entries| entries.get(url))
            .map(|asset| asset.bytes.clone())
    }

    pub fn entry(&self, cache: CacheName, url: &str) -> Option<CachedAsset> {
        self.store
            .lock()
            .get(&cache)
            .and_then(|entries| entries.get(url))
            .cloned()
    }

    pub fn insert(&self, cache: CacheName, url: &str, bytes: Vec<u8>) {
        store_asset(&self.store, cache, url, bytes);
    }

    /// Drops every entry of one cache. Returns how many were removed.
    pub fn clear(&self, cache: CacheName) -> usize {
        let removed = self.store.lock().remove(&cache).map(|e| e.len()).unwrap_or(0);
        debug!(target: "asset_cache", "Cleared {} ({} entries)", cache.as_str(), removed);
        removed
    }

    pub fn len(&self, cache: CacheName) -> usize {
        self.store.lock().get(&cache).map(HashMap::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().values().all(HashMap::is_empty)
    }

    /// Background refreshes still running.
    pub fn refreshes_in_flight(&self) -> usize {
        let mut handles = self.refresh_handles.lock();
        handles.retain(|handle| !handle.is_finished());
        handles.len()
    }

    /// Blocks until every background refresh started so far has finished.
    pub fn join_refreshes(&self) {
        let handles: Vec<_> = self.refresh_handles.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                warn!(target: "asset_cache", "Asset refresh thread panicked");
            }
        }
    }

    //--- Internals --------------------------------------------------------

    fn fetch_and_store(&self, cache: CacheName, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = self.fetcher.fetch(url)?;
        store_asset(&self.store, cache, url, bytes.clone());
        Ok(bytes)
    }

    /// Refreshes `url` on a background thread; at most one refresh per URL
    /// is in flight.
    fn revalidate(&self, cache: CacheName, url: &str) {
        if !self.refreshing.lock().insert(url.to_string()) {
            return;
        }

        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let refreshing = Arc::clone(&self.refreshing);
        let owned_url = url.to_string();

        let spawned = thread::Builder::new()
            .name("woodcat-asset-refresh".to_string())
            .spawn(move || {
                match fetcher.fetch(&owned_url) {
                    Ok(bytes) => store_asset(&store, cache, &owned_url, bytes),
                    Err(e) => debug!(target: "asset_cache", "Background refresh of {} failed: {}", owned_url, e),
                }
                refreshing.lock().remove(&owned_url);
            });

        match spawned {
            Ok(handle) => {
                let mut handles = self.refresh_handles.lock();
                handles.retain(|handle| !handle.is_finished());
                handles.push(handle);
            }
            Err(e) => {
                warn!(target: "asset_cache", "Could not spawn refresh for {}: {}", url, e);
                self.refreshing.lock().remove(url);
            }
        }
    }
}

fn store_asset(store: &Mutex<Store>, cache: CacheName, url: &str, bytes: Vec<u8>) {
    store.lock().entry(cache).or_default().insert(
        url.to_string(),
        CachedAsset {
            bytes,
            fetched_at: Utc::now(),
        },
    );
}

//=========================================================================
// Unit Tests
//=========================================================================
