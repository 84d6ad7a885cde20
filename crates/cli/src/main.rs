use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eval_data::parser::{load_split, parse_triplets};
use eval_data::{IdRegistry, RawTriplet, TestSet, TripletFormat};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// RecEval - build and inspect the test split of a recommender evaluation
#[derive(Parser)]
#[command(name = "rec-eval")]
#[command(about = "Deduplicate and id-map test ratings against a train split", long_about = None)]
struct Cli {
    /// Test triplets file (user, item, rating per line)
    #[arg(long)]
    test: PathBuf,

    /// Train triplets file; its ids and pairs are registered first
    #[arg(long)]
    train: Option<PathBuf>,

    /// Field separator
    #[arg(long, default_value = "::")]
    sep: String,

    /// Header lines to skip in each file
    #[arg(long, default_value = "0")]
    skip_lines: usize,

    /// Log tested/unknown user and item counts while building
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print build statistics for the test split
    Summary {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the mapped id and test ratings of a raw user id
    User {
        /// Raw user id as it appears in the file
        #[arg(long)]
        raw_id: String,
    },

    /// Show the mapped id of a raw item id
    Item {
        /// Raw item id as it appears in the file
        #[arg(long)]
        raw_id: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let format = TripletFormat::new(cli.sep.clone()).skip_lines(cli.skip_lines);

    let start = Instant::now();
    let (train, test) = load_triplets(cli.train.as_deref(), &cli.test, &format)?;
    tracing::debug!("Read {} train and {} test triplets", train.len(), test.len());

    let mut registry = IdRegistry::new();
    let registered = registry.register_triplets(train);
    let test_set = TestSet::from_uir_triplets(test, &mut registry, cli.verbose)
        .with_context(|| format!("Failed to build test set from {}", cli.test.display()))?;
    println!(
        "{} Built test set in {:?} ({} train pairs registered)",
        "✓".green(),
        start.elapsed(),
        registered
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Summary { json } => handle_summary(&test_set, &registry, json)?,
        Commands::User { raw_id } => handle_user(&test_set, &registry, raw_id)?,
        Commands::Item { raw_id } => handle_item(&test_set, raw_id)?,
    }

    Ok(())
}

/// Read the test file, plus the train file in parallel when one is given
fn load_triplets(
    train: Option<&Path>,
    test: &Path,
    format: &TripletFormat,
) -> Result<(Vec<RawTriplet>, Vec<RawTriplet>)> {
    match train {
        Some(train) => load_split(train, test, format).context("Failed to load train/test split"),
        None => {
            let test_triplets = parse_triplets(test, format)
                .with_context(|| format!("Failed to load {}", test.display()))?;
            Ok((Vec::new(), test_triplets))
        }
    }
}

/// Handle the 'summary' command
fn handle_summary(
    test_set: &TestSet<String, String>,
    registry: &IdRegistry<String, String>,
    json: bool,
) -> Result<()> {
    let stats = test_set.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("{}", "Test set summary:".bold().blue());
    println!("{}Tested users: {}", "• ".green(), stats.tested_users);
    println!("{}Test ratings: {}", "• ".green(), stats.ratings);
    println!("{}Unknown users: {}", "• ".cyan(), stats.unknown_users);
    println!("{}Unknown items: {}", "• ".cyan(), stats.unknown_items);
    println!("{}Duplicates skipped: {}", "• ".yellow(), stats.skipped_duplicates);
    println!(
        "Global registry: {} users, {} items, {} pairs",
        registry.num_users(),
        registry.num_items(),
        registry.num_pairs()
    );
    Ok(())
}

/// Handle the 'user' command
fn handle_user(
    test_set: &TestSet<String, String>,
    registry: &IdRegistry<String, String>,
    raw_id: String,
) -> Result<()> {
    let uid = test_set
        .get_uid(&raw_id)
        .with_context(|| format!("User {} has no test ratings", raw_id))?;
    let ratings = test_set.get_ratings(uid);

    println!("{}", format!("User {} (mapped id {})", raw_id, uid).bold().blue());
    println!("{}Test ratings: {}", "• ".green(), ratings.len());

    if !ratings.is_empty() {
        let total: f64 = ratings.iter().map(|&(_, r)| r).sum();
        println!("{}Average rating: {:.2}", "• ".green(), total / ratings.len() as f64);
    }

    for &(iid, rating) in ratings {
        let raw_item = registry
            .items()
            .lookup(iid)
            .map(String::as_str)
            .unwrap_or("?");
        println!("  - item {} (mapped id {}): {}", raw_item, iid, rating);
    }
    Ok(())
}

/// Handle the 'item' command
fn handle_item(test_set: &TestSet<String, String>, raw_id: String) -> Result<()> {
    let iid = test_set
        .get_iid(&raw_id)
        .with_context(|| format!("Item {} is not in the test set", raw_id))?;

    let raters = test_set
        .iter()
        .filter(|(_, ratings)| ratings.iter().any(|&(i, _)| i == iid))
        .count();

    println!("{}", format!("Item {} (mapped id {})", raw_id, iid).bold().blue());
    println!("{}Rated by {} test users", "• ".green(), raters);
    Ok(())
}
