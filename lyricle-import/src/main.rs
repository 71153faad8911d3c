//! lyricle-import - song import tool for the lyric guessing game
//!
//! Imports catalog tracks with their lyrics into the game database and picks
//! challenge windows for them. Bulk imports run as background jobs whose
//! progress is stored in the database; `bulk` follows a job until it ends.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use lyricle_common::config::{
    default_config_path, load_toml_config_if_present, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver,
};
use lyricle_import::models::{ImportJob, ImportOutcome, JobParameters, JobStatus, SOURCE_YTMUSIC};
use lyricle_import::services::{CatalogProvider, YtMusicClient};
use lyricle_import::AppState;

const MODULE_NAME: &str = "lyricle-import";

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Poll interval while following a bulk import job
const FOLLOW_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "lyricle-import")]
#[command(about = "Import songs and lyrics into the lyricle database")]
#[command(version = VERSION)]
struct Cli {
    /// Root folder holding the database
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "LYRICLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a bulk import job and follow its progress
    Bulk(BulkArgs),

    /// Import a single track by catalog id
    ImportSong {
        /// Catalog track id
        external_id: String,

        /// Language code stored instead of the detected one
        #[arg(short, long)]
        language: Option<String>,

        /// Challenges to create for the song
        #[arg(long, default_value_t = 1)]
        challenges: u32,
    },

    /// Search the catalog for songs
    Search {
        query: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Inspect bulk import jobs
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
}

#[derive(Args, Debug)]
struct BulkArgs {
    /// Catalog to import from
    #[arg(long, default_value = SOURCE_YTMUSIC)]
    source: String,

    /// Language code used for discovery queries and stored on every song
    #[arg(short, long)]
    language: Option<String>,

    /// Number of songs to discover
    #[arg(short = 'n', long, default_value_t = 50)]
    count: u32,

    /// Challenges to create per imported song
    #[arg(long, default_value_t = 1)]
    challenges: u32,

    #[arg(long)]
    year_from: Option<i32>,

    #[arg(long)]
    year_to: Option<i32>,

    /// Free-text query searched before the language templates
    #[arg(short, long)]
    query: Option<String>,

    /// Print the job id and exit instead of following the job
    #[arg(long)]
    detach: bool,
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// Most recent jobs, newest first
    List {
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Counters and log of one job
    Show { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(|| default_config_path(MODULE_NAME));
    let loaded = load_toml_config_if_present(config_path.as_deref());
    let log_level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => CompiledDefaults::for_current_platform().log_level,
    };

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let toml_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Invalid configuration file");
        }
    };

    info!("Starting {} {}", MODULE_NAME, VERSION);

    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(cli.root_folder.clone())
        .with_toml_config(&toml_config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = toml_config
        .database_path
        .clone()
        .unwrap_or_else(|| initializer.database_path());
    info!("Database: {}", db_path.display());

    let db = lyricle_import::db::init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;

    let provider: Arc<dyn CatalogProvider> = Arc::new(
        YtMusicClient::new(&toml_config.provider).context("Failed to build catalog client")?,
    );
    let state = AppState::new(db, provider);

    let stale = state.job_manager().report_stale_jobs().await?;
    if !stale.is_empty() {
        warn!(
            "{} bulk import job(s) were interrupted and will stay 'running'",
            stale.len()
        );
    }

    match cli.command {
        Command::Bulk(args) => run_bulk(&state, args).await,
        Command::ImportSong {
            external_id,
            language,
            challenges,
        } => run_import_song(&state, &external_id, language.as_deref(), challenges).await,
        Command::Search { query, limit } => run_search(&state, &query, limit).await,
        Command::Jobs { command } => run_jobs(&state, command).await,
    }
}

async fn run_bulk(state: &AppState, args: BulkArgs) -> Result<()> {
    let params = JobParameters {
        source: args.source,
        language: args.language,
        requested_count: args.count,
        challenges_per_song: args.challenges,
        year_from: args.year_from,
        year_to: args.year_to,
        search_query: args.query,
    };

    let jobs = state.job_manager();
    let job_id = jobs.create_job(params).await?;
    println!("Job {}", job_id);

    if args.detach {
        return Ok(());
    }

    // Stream new log lines until the job reaches a terminal state
    let mut printed = 0usize;
    loop {
        let job = jobs
            .get_job(job_id)
            .await?
            .with_context(|| format!("Job {} disappeared", job_id))?;

        // The log is cleared once when the job starts running
        let fresh = job.log.get(printed..).unwrap_or(job.log.as_str());
        print!("{}", fresh);
        printed = job.log.len();

        if job.status.is_terminal() {
            println!("Status: {}", job.status);
            if job.status == JobStatus::Failed {
                bail!("Bulk import job {} failed", job_id);
            }
            return Ok(());
        }

        tokio::time::sleep(FOLLOW_POLL_INTERVAL).await;
    }
}

async fn run_import_song(
    state: &AppState,
    external_id: &str,
    language: Option<&str>,
    challenges: u32,
) -> Result<()> {
    let (outcome, created) = state.import_song(external_id, language, challenges).await?;

    match outcome {
        ImportOutcome::Imported { song, line_count } => {
            println!(
                "Imported: {} - {} ({} lines, language {}, {} challenges)",
                song.title,
                song.artist,
                line_count,
                song.language.as_deref().unwrap_or("unknown"),
                created
            );
        }
        ImportOutcome::AlreadyImported => println!("Skipped (exists): {}", external_id),
        ImportOutcome::Duplicate { existing_song_id } => {
            println!("Skipped (duplicate of song {}): {}", existing_song_id, external_id)
        }
    }
    Ok(())
}

async fn run_search(state: &AppState, query: &str, limit: usize) -> Result<()> {
    let hits = state.provider.search(query, limit).await?;

    if hits.is_empty() {
        println!("No results");
    }
    for hit in hits {
        println!(
            "{}\t{} - {}{}",
            hit.external_id.as_deref().unwrap_or("-"),
            hit.title,
            hit.artist_display(),
            hit.album.map(|a| format!(" [{}]", a)).unwrap_or_default()
        );
    }
    Ok(())
}

async fn run_jobs(state: &AppState, command: JobsCommand) -> Result<()> {
    let jobs = state.job_manager();

    match command {
        JobsCommand::List { limit } => {
            for job in jobs.list_recent_jobs(limit).await? {
                println!("{}", job_line(&job));
            }
        }
        JobsCommand::Show { id } => {
            let job = jobs
                .get_job(id)
                .await?
                .with_context(|| format!("Job {} not found", id))?;

            println!("{}", job_line(&job));
            println!(
                "Parameters: source={} language={} count={} challenges={} years={}..{} query={}",
                job.params.source,
                job.params.language.as_deref().unwrap_or("-"),
                job.params.requested_count,
                job.params.challenges_per_song,
                display_opt(job.params.year_from),
                display_opt(job.params.year_to),
                job.params.search_query.as_deref().unwrap_or("-"),
            );
            println!("Updated: {}", job.updated_at.to_rfc3339());
            print!("{}", job.log);
        }
    }
    Ok(())
}

fn job_line(job: &ImportJob) -> String {
    format!(
        "{}  {:<9}  found {:>3}  imported {:>3}  skipped {:>3}  failed {:>3}  challenges {:>3}  {}",
        job.id,
        job.status.as_str(),
        job.total_found,
        job.imported,
        job.skipped,
        job.failed,
        job.challenges_created,
        job.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

fn display_opt(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
