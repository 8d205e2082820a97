//! Tagdrift CLI
//!
//! The `tagdrift` command finds commits whose only semantic change is to
//! documentation tags.
//!
//! ## Commands
//!
//! - `mine`: classify every commit of a git repository and write reports
//! - `scan-patch`: classify one saved patch file offline

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use tagdrift_core::{
    is_git_repo, report_rows, write_commits_json, write_statistics_json, write_summary_md,
    CommitTally, HistoryMiner, JavaHeaderMatcher, MinerConfig, NoHistory, PatchScanner,
    ScanTarget, StatisticsArtifact, TextDecoder,
};

#[derive(Parser)]
#[command(name = "tagdrift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Documentation tag drift miner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Also append log lines to this file
    #[arg(long, global = true, env = "TAGDRIFT_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the history of a git repository
    Mine {
        /// Repository to mine
        #[arg(long, default_value = ".", env = "TAGDRIFT_REPO")]
        repo: PathBuf,

        /// Classify only this commit
        #[arg(long, env = "TAGDRIFT_ONLY_COMMIT")]
        only_commit: Option<String>,

        /// URL prefix for commit links in reports
        #[arg(long, env = "TAGDRIFT_COMMIT_PREFIX")]
        commit_prefix: Option<String>,

        /// Tracked file extension
        #[arg(long, env = "TAGDRIFT_EXTENSION")]
        extension: Option<String>,

        /// Commits classified concurrently
        #[arg(short, long, env = "TAGDRIFT_JOBS")]
        jobs: Option<usize>,

        /// Directory for commits.json, statistics.json and summary.md
        #[arg(long, env = "TAGDRIFT_OUT_DIR")]
        out_dir: Option<PathBuf>,

        /// TOML configuration file
        #[arg(long, env = "TAGDRIFT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Classify a single patch file without history lookups
    ScanPatch {
        /// Patch file (unified diff)
        file: PathBuf,

        /// Commit time used for offsets (RFC 3339, default: now)
        #[arg(long)]
        commit_time: Option<String>,
    },
}

struct MineArgs {
    repo: PathBuf,
    only_commit: Option<String>,
    commit_prefix: Option<String>,
    extension: Option<String>,
    jobs: Option<usize>,
    out_dir: Option<PathBuf>,
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tagdrift_core::init_tracing(cli.json, level, cli.log_file.as_deref())
        .context("Failed to open log file")?;

    match cli.command {
        Commands::Mine {
            repo,
            only_commit,
            commit_prefix,
            extension,
            jobs,
            out_dir,
            config,
        } => {
            cmd_mine(MineArgs {
                repo,
                only_commit,
                commit_prefix,
                extension,
                jobs,
                out_dir,
                config,
            })
            .await
        }
        Commands::ScanPatch { file, commit_time } => cmd_scan_patch(&file, commit_time.as_deref()),
    }
}

fn load_config(args: &MineArgs) -> Result<MinerConfig> {
    let mut config = match &args.config {
        Some(path) => MinerConfig::from_toml_file(path)?,
        None => MinerConfig::default(),
    };
    if let Some(sha) = &args.only_commit {
        config.only_commit = Some(sha.clone());
    }
    if let Some(prefix) = &args.commit_prefix {
        config.commit_url_prefix = prefix.clone();
    }
    if let Some(ext) = &args.extension {
        config.extension = ext.clone();
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(dir) = &args.out_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Mine a repository and write the report artifacts
async fn cmd_mine(args: MineArgs) -> Result<()> {
    let config = load_config(&args)?;

    if !is_git_repo(&args.repo) {
        anyhow::bail!("Not a git repository: {:?}", args.repo);
    }
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))?;

    info!(repo = ?args.repo, jobs = config.jobs, "analyzing log");
    let miner = HistoryMiner::for_git_repo(&args.repo, &config);
    let tally = Arc::new(CommitTally::new());
    let records = if config.jobs > 1 {
        miner.mine_parallel(Arc::clone(&tally)).await?
    } else {
        miner.mine(&tally)?
    };
    tally.flush();

    let stats = StatisticsArtifact::from_snapshot(&tally.snapshot(), Utc::now());
    let rows = report_rows(&records, &config.commit_url_prefix);

    let out = &config.output_dir;
    write_commits_json(&out.join("commits.json"), &records)?;
    write_statistics_json(&out.join("statistics.json"), &stats)?;
    write_summary_md(&out.join("summary.md"), &stats, &rows)?;

    print!("{}", tagdrift_core::render_text_report(&stats));
    println!();
    println!("Wrote reports to {:?}", out);
    Ok(())
}

/// Classify a saved patch and print the verdict as JSON
fn cmd_scan_patch(file: &Path, commit_time: Option<&str>) -> Result<()> {
    let commit_time = match commit_time {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --commit-time: {}", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read patch: {:?}", file))?;
    let text = TextDecoder::new().decode(&bytes)?;

    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let scan = PatchScanner::new(&JavaHeaderMatcher, &NoHistory)
        .scan(ScanTarget::new(&file_name, "", commit_time), &text)?;

    let out = serde_json::json!({
        "file": file_name,
        "verdict": scan.verdict,
        "pure_tag": scan.verdict.is_pure_tag(),
        "events": scan.events,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
