//! # Glyphwall
//!
//! Renders distorted-text CAPTCHA challenges and checks typed answers.
//!
//! ## Usage
//! ```bash
//! # Render three challenges into ./out and print them as JSON
//! glyphwall render --count 3 --json
//!
//! # Solve challenges interactively (image written to ./out/current.png)
//! glyphwall play
//!
//! # Mint an element identifier
//! glyphwall id --length 16
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod view;

use config::AppConfig;
use glyphwall_common::RenderedChallenge;
use glyphwall_engine::random::{random_id, random_id_default};
use glyphwall_engine::{
    CaptchaGenerator, ChallengeSession, RandomSource, RasterSurface, RngSource, Surface,
};

/// Glyphwall - text CAPTCHA renderer
#[derive(Parser, Debug)]
#[command(name = "glyphwall")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/glyphwall.toml")]
    config: String,

    /// Font file (overrides config)
    #[arg(long, env = "GLYPHWALL_FONT")]
    font: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long, env = "GLYPHWALL_OUTPUT")]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render challenges to PNG files
    Render {
        /// Number of challenges to render
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Print each challenge as a JSON line
        #[arg(long)]
        json: bool,

        /// Include the answer in the output
        #[arg(long)]
        reveal: bool,
    },

    /// Solve challenges interactively
    Play {
        /// Seed for reproducible challenges
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a random alphanumeric identifier
    Id {
        /// Identifier length
        #[arg(short, long)]
        length: Option<usize>,
    },
}

fn main() -> Result<()> {
    // Variables from .env are visible to clap and the config loader
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.json_logs)?;

    let config = AppConfig::load(&args.config, &args)?;
    info!(config = %args.config, font = %config.font_path.display(), "Configuration loaded");

    match args.command {
        Command::Render {
            count,
            seed,
            json,
            reveal,
        } => render(&config, count, seed, json, reveal),
        Command::Play { seed } => play(&config, seed),
        Command::Id { length } => {
            let mut rng = make_rng(None);
            let id = match length {
                Some(length) => random_id(&mut *rng, length),
                None => random_id_default(&mut *rng),
            };
            println!("{id}");
            Ok(())
        }
    }
}

fn make_rng(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => {
            info!(seed, "Using seeded randomness");
            Box::new(RngSource::seeded(seed))
        }
        None => Box::new(RngSource::thread()),
    }
}

fn open_surface(config: &AppConfig) -> Result<RasterSurface> {
    RasterSurface::open_font(&config.font_path)
        .with_context(|| format!("Failed to load font {}", config.font_path.display()))
}

fn render(config: &AppConfig, count: usize, seed: Option<u64>, json: bool, reveal: bool) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let generator = CaptchaGenerator::new(config.captcha.clone());
    let mut surface = open_surface(config)?;
    let mut rng = make_rng(seed);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for _ in 0..count {
        let answer = generator.generate(&mut surface, &mut *rng)?;
        let challenge_id = random_id_default(&mut *rng);
        let path = config.output_dir.join(format!("{}.png", &challenge_id[..16]));
        surface.save_png(&path)?;

        if json {
            let (width, height) = surface.dimensions();
            let mut challenge =
                RenderedChallenge::new(challenge_id, surface.to_data_uri()?, width, height);
            if reveal {
                challenge = challenge.with_answer(answer);
            }
            writeln!(out, "{}", serde_json::to_string(&challenge)?)?;
        } else if reveal {
            writeln!(out, "{}\t{}", path.display(), answer)?;
        } else {
            writeln!(out, "{}", path.display())?;
        }
    }

    info!(count, dir = %config.output_dir.display(), "Rendered challenges");
    Ok(())
}

fn play(config: &AppConfig, seed: Option<u64>) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let image_path = config.output_dir.join("current.png");

    let mut session = ChallengeSession::new(CaptchaGenerator::new(config.captcha.clone()));
    let mut surface = open_surface(config)?;
    let mut rng = make_rng(seed);

    println!("Type the 5 characters shown in {}", image_path.display());
    println!("Commands: :r new challenge, :q quit");

    let stats = view::play(
        &mut session,
        &mut surface,
        &mut *rng,
        std::io::stdin().lock(),
        std::io::stdout(),
        |surface: &RasterSurface, out: &mut std::io::Stdout| {
            surface.save_png(&image_path)?;
            writeln!(out, "New challenge written to {}", image_path.display())?;
            Ok(())
        },
    )?;

    info!(
        challenges = stats.challenges,
        attempts = stats.attempts,
        solved = stats.solved,
        "Session finished"
    );
    println!("Solved {} of {} attempts", stats.solved, stats.attempts);
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays machine-readable
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
