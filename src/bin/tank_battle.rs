//=========================================================================
// Tank Battle Launcher
//=========================================================================
//
// Usage:
//   tank_battle [--config <path>] [--headless <ticks>]
//
// Without --config the built-in defaults are used. --headless runs the
// game loop without a window for the given number of ticks (or until the
// scene stack empties), which is handy for smoke tests.
//
// Log verbosity follows RUST_LOG and defaults to `info`.
//
//=========================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};

use woodcat_arcade::config::ArcadeConfig;
use woodcat_arcade::games::tank_battle;

//=== Arguments ===========================================================

#[derive(Debug, Default)]
struct LaunchArgs {
    config: Option<PathBuf>,
    headless: Option<u64>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<LaunchArgs, String> {
    let mut parsed = LaunchArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--headless" => {
                let ticks = args.next().ok_or("--headless needs a tick count")?;
                let ticks = ticks
                    .parse()
                    .map_err(|_| format!("invalid tick count: {}", ticks))?;
                parsed.headless = Some(ticks);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    Ok(parsed)
}

//=== Entry Point =========================================================

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            error!("{}", e);
            error!("usage: tank_battle [--config <path>] [--headless <ticks>]");
            return ExitCode::from(2);
        }
    };

    let config = match &args.config {
        Some(path) => match ArcadeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ArcadeConfig::default(),
    };

    let engine = match tank_battle::build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Could not open game storage: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.headless {
        Some(ticks) => {
            let executed = engine.run_headless(ticks);
            info!("Headless run finished after {} ticks", executed);
        }
        None => engine.run(),
    }

    ExitCode::SUCCESS
}
