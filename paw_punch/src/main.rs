//! paw_punch — interactive entry point.

use std::path::PathBuf;

use clap::Parser;
use paw_core::GameConfig;
use paw_punch::app::{run, AppConfig, SourceKind};
use paw_punch::error::AppError;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "paw_punch", version, about = "Rock-paper-scissors against a cat paw, played with hand gestures")]
struct Cli {
    /// TOML game configuration (PAW_* environment variables override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the cat's moves, for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Where hand landmarks come from
    #[arg(long, value_enum, default_value_t = SourceKind::Sim)]
    source: SourceKind,

    /// No MIDI sound at all
    #[arg(long)]
    mute: bool,

    /// Sound cues only, without the background loop
    #[arg(long)]
    no_music: bool,

    /// Draw the hand skeleton and finger states
    #[arg(long)]
    show_landmarks: bool,

    /// Skip config file and environment, use built-in defaults
    #[arg(long)]
    quick: bool,
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paw_punch=info,paw_core=info".into()),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Paw Punch — rock, paper, cat paw                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    match cli.source {
        SourceKind::Sim   => println!("  Mode: keyboard simulation  (R/P/S to pose, Q to quit)"),
        SourceKind::Stdin => println!("  Mode: landmark frames from stdin"),
    }
    println!();

    let mut game = if cli.quick {
        println!("  Quick-start: built-in defaults\n");
        GameConfig::default()
    } else {
        if let Some(path) = &cli.config {
            std::fs::metadata(path)?;
        }
        GameConfig::load(cli.config.as_deref())?
    };
    if cli.seed.is_some() {
        game.seed = cli.seed;
    }

    info!(
        countdown_s = game.timing.countdown_secs,
        result_s    = game.timing.result_secs,
        tick_rate   = game.timing.tick_rate,
        seed        = ?game.seed,
        "game configured"
    );

    let cfg = AppConfig {
        game,
        source:         cli.source,
        audio:          !cli.mute,
        music:          !cli.mute && !cli.no_music,
        show_landmarks: cli.show_landmarks,
    };

    println!("  Opening game window…");
    println!();

    run(cfg)
}
