//! Command-line entry point.
//!
//! # Responsibility
//! - Provide a smoke probe for `articlecraft_core` linkage.
//! - Score and store draft JSON files offline.

use articlecraft_core::{
    analyze, init_logging, load_config, ArticleStatus, ContentMetricsEngine, Draft,
    DraftPersistence, EditorConfig, RecommendationGenerator, SqliteArticleStore,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "articlecraft", version, about = "Article scoring and storage tools")]
struct Cli {
    /// Editor configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints `pong` when the core links.
    Ping,
    /// Prints the core version.
    Version,
    /// Prints scores and recommendations for a draft as JSON.
    Score { draft: PathBuf },
    /// Stores a draft in an article database.
    Save {
        draft: PathBuf,
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value = "draft", value_parser = parse_status)]
        status: ArticleStatus,
    },
}

fn parse_status(value: &str) -> Result<ArticleStatus, String> {
    ArticleStatus::parse(value).ok_or_else(|| {
        format!("unknown status `{value}`; expected draft|published|scheduled|archived")
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EditorConfig::default(),
    };
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    match cli.command {
        Command::Ping => println!("articlecraft_core ping={}", articlecraft_core::ping()),
        Command::Version => println!(
            "articlecraft_core version={}",
            articlecraft_core::core_version()
        ),
        Command::Score { draft } => {
            let draft = read_draft(&draft)?;
            let analysis = analyze(
                &ContentMetricsEngine::for_locale(config.locale),
                &RecommendationGenerator::new(),
                &draft,
            );
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Save { draft, db, status } => {
            let draft = read_draft(&draft)?;
            let store = SqliteArticleStore::open(&db)?;
            let runtime = tokio::runtime::Builder::new_current_thread().build()?;
            let response = runtime.block_on(store.save(&draft, status))?;
            info!(
                "event=cli_save module=cli status={} article_status={}",
                if response.success { "ok" } else { "rejected" },
                status.as_str()
            );
            let output = serde_json::json!({
                "success": response.success,
                "id": draft.id.to_string(),
                "message": response.message,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn read_draft(path: &Path) -> Result<Draft, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}
