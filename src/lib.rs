//=========================================================================
// Woodcat Arcade Library Root
//
// Public API surface of the arcade runtime and its games.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`) and core systems
// - Expose the shared services every game uses: storage, scores,
//   settings, i18n, asset caching and configuration
// - Host the games themselves under `games`
// - Keep the winit platform layer private
//
// Typical usage:
// ```no_run
// use woodcat_arcade::config::ArcadeConfig;
// use woodcat_arcade::games::tank_battle;
//
// let config = ArcadeConfig::default();
// tank_battle::build_engine(&config)?.run();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------

pub mod asset_cache;
pub mod config;
pub mod core;
pub mod games;
pub mod i18n;
pub mod prelude;
pub mod scores;
pub mod settings;
pub mod storage;

//--- Internal Modules ----------------------------------------------------

mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
