use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_DB_PATH, DEFAULT_EXTENSION, DEFAULT_LOG_DATA_DIR,
    DEFAULT_SONG_DATA_DIR,
};
use sparkify_etl::{run, RunReport};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(about = "Load song and log JSON data into the songplay warehouse")]
struct CliArgs {
    /// Path to the SQLite warehouse database file.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Directory holding the song data files.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_SONG_DATA_DIR)]
    pub song_data: PathBuf,

    /// Directory holding the log data files.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_LOG_DATA_DIR)]
    pub log_data: PathBuf,

    /// Extension of the input files.
    #[clap(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Drop and recreate the warehouse tables before loading.
    #[clap(long)]
    pub reset: bool,

    /// Only parse the input data and report problems, write nothing.
    #[clap(long)]
    pub check_only: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let cli_config = CliConfig {
        db_path: cli_args.db,
        song_data_dir: cli_args.song_data,
        log_data_dir: cli_args.log_data,
        extension: cli_args.extension,
        reset: cli_args.reset,
        check_only: cli_args.check_only,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    if config.check_only {
        info!("Check only, nothing will be written.");
    } else {
        info!("Loading into {:?}", config.db_path);
    }

    let report = run(&config)?;
    log_summary(&report);
    Ok(())
}

fn log_summary(report: &RunReport) {
    info!("");
    info!("Summary");
    info!("=======");
    for category in &report.categories {
        info!(
            "{} data: {} files, {} malformed lines, {} failed writes",
            category.category,
            category.total_files(),
            category.parse_problems(),
            category.failed_writes()
        );
        if category.unreadable_files() > 0 {
            warn!("{} files could not be read", category.unreadable_files());
        }
        if category.rolled_back_units() > 0 {
            warn!(
                "{} units of work were rolled back and replayed, {} writes lost",
                category.rolled_back_units(),
                category.lost_writes()
            );
        }
        if category.failed_commits() > 0 {
            warn!("{} files could not be committed", category.failed_commits());
        }
    }
    for (category, root) in &report.missing_roots {
        warn!("{} data not found at {:?}", category, root);
    }
    if let Some(counts) = &report.counts {
        info!("");
        info!("Warehouse contains:");
        info!("  {} songs", counts.songs);
        info!("  {} artists", counts.artists);
        info!("  {} time rows", counts.time);
        info!("  {} users", counts.users);
        info!("  {} songplays", counts.songplays);
    }
}
