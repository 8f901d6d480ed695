use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexmerge::{commit, CommitRequest, EditCosts, MergeAction, MergeSession, SimilarityConfig, Word};
use tracing_subscriber::EnvFilter;

/// Offline driver for the merge workspace.
///
/// Reads a JSON array of words, clusters likely duplicates, optionally
/// replays a JSON array of merge actions, and prints the result as JSON.
#[derive(Parser, Debug)]
#[clap(name = "merge-plan", about = "Find duplicate entries and compute merge commit plans")]
struct Cli {
    /// JSON file holding the entries (array of words)
    #[clap(short, long)]
    entries: PathBuf,

    /// Similarity config file; overrides --cost and --threshold
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Uniform edit cost when no config file is given
    #[clap(long, default_value = "1")]
    cost: u32,

    /// Clustering threshold when no config file is given
    #[clap(long, default_value = "1")]
    threshold: u32,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the duplicate clusters
    Clusters {
        /// Include entries with no likely duplicate
        #[clap(long)]
        all: bool,
    },

    /// Replay actions and print the commit plan
    Plan {
        /// JSON file holding an array of merge actions
        #[clap(short, long)]
        actions: Option<PathBuf>,

        /// Wrap the plan in a commit request envelope
        #[clap(long)]
        request: bool,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimilarityConfig::load(path)?,
        None => SimilarityConfig::new(EditCosts::uniform(cli.cost), cli.threshold),
    };
    let entries: Vec<Word> = read_json(&cli.entries)?;
    let mut session = MergeSession::load(entries, &config)?;

    match cli.command {
        Commands::Clusters { all } => {
            let clusters: Vec<_> = session
                .workspace()
                .clusters()
                .iter()
                .filter(|c| all || !c.is_singleton())
                .collect();
            println!("{}", serde_json::to_string_pretty(&clusters)?);
        }
        Commands::Plan { actions, request } => {
            if let Some(path) = actions {
                let actions: Vec<MergeAction> = read_json(&path)?;
                session
                    .apply_all(&actions)
                    .map_err(|(index, e)| anyhow::anyhow!("action {index} ({}) failed: {e}", actions[index].name()))?;
            }

            let plan = session.plan()?;
            if request {
                println!("{}", commit::to_json_pretty(&CommitRequest::new(plan)?)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            }
        }
    }

    Ok(())
}
