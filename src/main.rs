//! Command-line entry point for the quiz-ladder engine
//!
//! Validates configuration and can replay a simulated player against a
//! question catalog to show how ratings and selection evolve.

use anyhow::{anyhow, Result};
use clap::Parser;
use quiz_ladder::catalog::{InMemoryCatalog, QuestionCatalog};
use quiz_ladder::config::AppConfig;
use quiz_ladder::engine::QuizEngine;
use quiz_ladder::history::InMemoryAnswerLog;
use quiz_ladder::rating::InMemoryRatingStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Quiz Ladder - adaptive-difficulty quiz engine
#[derive(Parser)]
#[command(
    name = "quiz-ladder",
    version,
    about = "Adaptive-difficulty quiz engine with Elo ratings for players and questions",
    long_about = "Quiz Ladder rates players and questions with an Elo update after every answer \
                 and picks each player's next question by closeness of rating, adjusted for \
                 the player's recent streak and excluding recently answered questions."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and catalog, then exit")]
    dry_run: bool,

    /// Question catalog
    #[arg(long, value_name = "FILE", help = "Path to question catalog (TOML format)")]
    catalog: Option<PathBuf>,

    /// Number of simulated answers
    #[arg(long, value_name = "N", default_value_t = 0)]
    simulate: usize,

    /// True skill of the simulated player
    #[arg(long, value_name = "RATING", default_value_t = 1400.0)]
    skill: f64,

    /// Subject to simulate; defaults to the first subject in the catalog
    #[arg(long, value_name = "ID")]
    subject: Option<u64>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(config_path) => AppConfig::from_file(config_path)?,
        None => AppConfig::from_env()?,
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    quiz_ladder::config::validate_config(&config)?;
    Ok(config)
}

fn display_startup_banner(config: &AppConfig) {
    info!("Quiz Ladder v{}", quiz_ladder::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Elo: player K {}, question K {}, cap {}",
        config.rating.player_k, config.rating.question_k, config.rating.rating_cap
    );
    info!(
        "   Selection: repeat window {}, virtual window {} x {}",
        config.selection.repeat_window,
        config.selection.virtual_window,
        config.selection.virtual_k
    );
}

/// Answer `rounds` questions as a player whose true skill is `skill`: a
/// question is answered correctly exactly when it is rated below the skill.
async fn simulate(
    engine: &QuizEngine,
    catalog: &InMemoryCatalog,
    subject_id: u64,
    rounds: usize,
    skill: f64,
) -> Result<()> {
    let player_id = "simulated-player".to_string();
    let topics: Vec<u64> = catalog
        .topics_in_subject(subject_id)
        .await?
        .into_iter()
        .map(|topic| topic.id)
        .collect();
    engine.subscribe_topics(&player_id, topics).await?;

    for round in 1..=rounds {
        let question = engine.next_question(&player_id, subject_id).await?;
        let correct = question.rating() < skill;
        let recorded = engine
            .record_outcome(&player_id, question.id(), correct)
            .await?;
        let change = &recorded.rating_change;

        info!(
            round,
            question_id = question.id(),
            correct,
            player_rating = change.new_player_rating,
            question_rating = change.new_question_rating,
            applied = change.applied,
            "Simulated answer"
        );
    }

    let stats = engine.stats()?;
    let final_rating = engine.player_rating(&player_id, subject_id)?;
    let virtual_rating = engine.virtual_rating(&player_id, subject_id).await?;
    info!(
        "Final rating {:.1} (virtual {:.1}) after {} answers, {} suppressed by the cap, {} fallback selections",
        final_rating,
        virtual_rating,
        stats.answers_recorded,
        stats.rating_updates_suppressed,
        stats.fallback_selections
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    let catalog = match &args.catalog {
        Some(path) => Arc::new(InMemoryCatalog::from_file(path)?),
        None => Arc::new(InMemoryCatalog::new()),
    };

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting");
        return Ok(());
    }

    if args.simulate == 0 {
        warn!("Nothing to do: pass --simulate N with --catalog FILE to run a simulation");
        return Ok(());
    }

    let subject_id = match args.subject {
        Some(subject_id) => subject_id,
        None => catalog
            .subjects()?
            .first()
            .map(|subject| subject.id)
            .ok_or_else(|| anyhow!("Catalog has no subjects to simulate"))?,
    };

    let engine = QuizEngine::new(
        catalog.clone(),
        Arc::new(InMemoryRatingStore::new()),
        Arc::new(InMemoryAnswerLog::new()),
        &config,
    )?;

    simulate(&engine, &catalog, subject_id, args.simulate, args.skill).await
}
