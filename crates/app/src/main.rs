use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use drill_core::model::{BatchRequest, DEFAULT_BATCH_SIZE, DEFAULT_MODE, DrillMode};
use services::{AppServices, Clock, ExerciseSourceConfig};
use tracing_subscriber::EnvFilter;

mod command;
mod terminal;

use terminal::Terminal;

/// Multiplication drills in the terminal.
#[derive(Parser, Debug)]
#[command(name = "drill")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database URL or path
    #[arg(long, env = "DRILL_DB_URL", default_value = "sqlite://drill.sqlite3")]
    db: String,

    /// Base URL of a remote exercise generator (falls back to DRILL_SOURCE_URL)
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Drill mode: table:<n>, mixed:<n>, easy or hard
    #[arg(long, env = "DRILL_MODE", default_value = DEFAULT_MODE)]
    mode: String,

    /// Exercises per batch
    #[arg(long, env = "DRILL_COUNT", default_value_t = DEFAULT_BATCH_SIZE)]
    count: usize,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose.
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mode = DrillMode::new(args.mode).context("invalid --mode")?;
    let request = BatchRequest::new(mode, args.count).context("invalid --count")?;

    let db_url = normalize_sqlite_url(&args.db);
    prepare_sqlite_file(&db_url)?;

    let source = match args.source_url {
        Some(url) => Some(ExerciseSourceConfig::new(url)),
        None => ExerciseSourceConfig::from_env(),
    };

    tracing::info!(%db_url, mode = %request.mode(), count = request.count(), "drill starting");
    let services = AppServices::new_sqlite(&db_url, Clock::system(), source)
        .await
        .with_context(|| format!("cannot open {db_url}"))?;
    let identity = services.restore_identity().await;

    Terminal::new(services, identity, request).run().await
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_and_full_urls_are_kept() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/drill.db"),
            "sqlite:///tmp/drill.db"
        );
    }

    #[test]
    fn bare_paths_become_absolute_urls() {
        assert_eq!(normalize_sqlite_url("/var/drill.db"), "sqlite:///var/drill.db");
        assert_eq!(normalize_sqlite_url("sqlite:/var/drill.db"), "sqlite:///var/drill.db");
        assert!(normalize_sqlite_url("drill.db").starts_with("sqlite:///"));
    }

    #[test]
    fn args_fall_back_to_defaults() {
        let args = Args::try_parse_from(["drill"]).unwrap();
        assert_eq!(args.count, DEFAULT_BATCH_SIZE);
        assert!(args.source_url.is_none());
        assert!(!args.verbose);
    }
}
