//! # SPOTDIFF Replay
//!
//! Plays one session headlessly from a click script and prints the
//! leaderboard.
//!
//! Usage: `spotdiff_replay <rounds.toml> <script.toml> [ranking.json] [config.toml]`
//!
//! Script format:
//!
//! ```toml
//! player = "mina"
//! end_ms = 30000          # optional
//! image_width = 1000.0
//! image_height = 750.0
//!
//! [[clicks]]
//! at_ms = 1200
//! x = 100.0
//! y = 100.0
//! ```
//!
//! Click coordinates are native image pixels. Without a ranking path the
//! leaderboard lives in memory for this run only.
//!
//! Log level via `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use spotdiff::ranking::{JsonFileStore, MemoryStore, RankingStore};
use spotdiff::shared::{DatasetError, ImageGeometry, PointerDown, RoundSet, RoundSource};
use spotdiff::{ConfigError, GameConfig, GameTime, LeaderboardView, RoundEngine, SessionContext};

#[derive(Error, Debug)]
enum ReplayError {
    #[error("usage: spotdiff_replay <rounds.toml> <script.toml> [ranking.json] [config.toml]")]
    Usage,

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid script: {0}")]
    Script(#[from] toml::de::Error),

    #[error("cannot read script: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct ScriptedClick {
    at_ms: u64,
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    player: String,
    #[serde(default = "default_extent")]
    image_width: f64,
    #[serde(default = "default_extent")]
    image_height: f64,
    /// Stop here instead of playing every round to the end.
    #[serde(default)]
    end_ms: Option<u64>,
    #[serde(default)]
    clicks: Vec<ScriptedClick>,
}

fn default_extent() -> f64 {
    1000.0
}

struct Args {
    rounds: PathBuf,
    script: PathBuf,
    ranking: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, ReplayError> {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let rounds = args.next().ok_or(ReplayError::Usage)?;
    let script = args.next().ok_or(ReplayError::Usage)?;
    Ok(Args {
        rounds,
        script,
        ranking: args.next(),
        config: args.next(),
    })
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

fn run() -> Result<(), ReplayError> {
    let args = parse_args()?;

    let rounds = RoundSet::from_file(&args.rounds)?;
    let config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    let mut script: Script = toml::from_str(&std::fs::read_to_string(&args.script)?)?;
    script.clicks.sort_by_key(|c| c.at_ms);

    let store: Box<dyn RankingStore> = match &args.ranking {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };

    // Upper bound on session length: every round runs out its clock
    let round_ms = (u64::from(config.round_time_limit_secs) + 1).saturating_mul(config.tick_interval_ms);
    let full_session = round_ms.saturating_mul(rounds.round_count() as u64 + 1);
    let deadline = GameTime::from_millis(script.end_ms.unwrap_or(full_session));

    let session = SessionContext::new(script.player.clone(), store);
    let mut engine = RoundEngine::new(config, rounds, session)?;
    let geometry = ImageGeometry::identity(script.image_width, script.image_height);

    for click in &script.clicks {
        let at = GameTime::from_millis(click.at_ms);
        if at > deadline {
            break;
        }
        engine.advance_to(at);
        if engine.is_finished() {
            break;
        }
        match engine.handle_pointer_down(PointerDown::new(click.x, click.y), &geometry) {
            Ok(outcome) => tracing::info!(
                "t={}ms round {} ({:.0}, {:.0}) -> {:?}",
                click.at_ms,
                engine.round_index() + 1,
                click.x,
                click.y,
                outcome
            ),
            Err(e) => tracing::warn!("t={}ms click ignored: {}", click.at_ms, e),
        }
    }

    while !engine.is_finished() && engine.now() < deadline {
        let step = engine.next_due().map_or(deadline, |due| due.min(deadline));
        engine.advance_to(step);
    }

    let Some(outcome) = engine.outcome() else {
        let view = engine.view();
        println!();
        println!(
            "Stopped at {}ms in {}: score {}, {}s left",
            deadline.as_millis(),
            view.title,
            view.score,
            view.time_left
        );
        return Ok(());
    };

    if let Some(route) = engine.navigation() {
        tracing::info!("Session over, navigating to {}", route.path());
    }

    println!();
    println!("Final score: {} ({})", outcome.entry.score, outcome.entry.name);
    match outcome.rank {
        Some(rank) => println!("Leaderboard position: #{}", rank + 1),
        None => println!("Did not make the leaderboard"),
    }
    if !outcome.persisted {
        println!("Warning: leaderboard could not be saved");
    }
    println!();
    for row in LeaderboardView::from_table(&outcome.ranking).rows {
        println!("{:>3}. {:<20} {:>7}", row.rank, row.name, row.score);
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
