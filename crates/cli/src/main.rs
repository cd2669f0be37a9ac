use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{AdIndex, PredicateKind, TargetingPredicate};
use selection::TieBreak;
use server::{AdvertisementSelector, GeneratedAdvertisement};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

/// ad-select - Advertisement selection engine
#[derive(Parser)]
#[command(name = "ad-select")]
#[command(about = "Selects the eligible advertisement with the highest click-through rate", long_about = None)]
struct Cli {
    /// Directory holding content.dat, targeting_groups.dat and customers.dat
    #[arg(short, long, default_value = "data/sample")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the advertisement to render for a customer
    Select {
        /// Marketplace the advertisement will be rendered on
        #[arg(long)]
        marketplace_id: String,

        /// Customer to select for (omit for anonymous requests)
        #[arg(long)]
        customer_id: Option<String>,

        /// How to break ties between equal click-through rates: first or last
        #[arg(long, default_value = "first")]
        tie_break: TieBreak,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a marketplace's content and its targeting groups
    Content {
        #[arg(long)]
        marketplace_id: String,
    },

    /// Show a customer profile
    Customer {
        #[arg(long)]
        customer_id: String,
    },

    /// Run concurrent selections to measure latency
    Benchmark {
        #[arg(long)]
        marketplace_id: String,

        /// Number of selections to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent selections
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let index = Arc::new(
        AdIndex::load_from_files(&cli.data_dir)
            .with_context(|| {
                format!("Failed to load advertisement data from {}", cli.data_dir.display())
            })?,
    );

    match cli.command {
        Commands::Select {
            marketplace_id,
            customer_id,
            tie_break,
            json,
        } => handle_select(index, &marketplace_id, customer_id.as_deref(), tie_break, json)?,
        Commands::Content { marketplace_id } => handle_content(&index, &marketplace_id),
        Commands::Customer { customer_id } => handle_customer(&index, &customer_id)?,
        Commands::Benchmark {
            marketplace_id,
            requests,
            concurrent,
        } => handle_benchmark(index, marketplace_id, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'select' command
fn handle_select(
    index: Arc<AdIndex>,
    marketplace_id: &str,
    customer_id: Option<&str>,
    tie_break: TieBreak,
    json: bool,
) -> Result<()> {
    debug!("Selecting with tie-break policy '{}'", tie_break);
    let selector = AdvertisementSelector::from_index(index).with_tie_break(tie_break);
    let scored = selector.select_scored(customer_id, Some(marketplace_id))?;

    if json {
        let advertisement = GeneratedAdvertisement::from(scored.map(|s| s.content));
        println!("{}", serde_json::to_string_pretty(&advertisement)?);
        return Ok(());
    }

    let customer = customer_id.unwrap_or("anonymous");
    match scored {
        Some(scored) => {
            println!(
                "{} {} for {} on {}",
                "✓".green(),
                scored.content.content_id.as_deref().unwrap_or("?").bold(),
                customer,
                marketplace_id
            );
            println!(
                "  CTR: {:.4} (targeting group {})",
                scored.click_through_rate, scored.targeting_group_id
            );
            println!("  {}", scored.content.renderable_content);
        }
        None => println!(
            "{} No eligible advertisement for {} on {}",
            "∅".yellow(),
            customer,
            marketplace_id
        ),
    }
    Ok(())
}

/// Handle the 'content' command
fn handle_content(index: &AdIndex, marketplace_id: &str) {
    let content = index.get_content(marketplace_id);
    println!(
        "{}",
        format!("Marketplace {} ({} content items)", marketplace_id, content.len())
            .bold()
            .blue()
    );

    for item in content {
        let Some(content_id) = item.content_id.as_deref() else {
            println!("{}(no content id, never eligible)", "• ".red());
            continue;
        };
        println!("{}{}", "• ".green(), content_id.bold());

        let groups = index.get_targeting_groups(content_id);
        if groups.is_empty() {
            println!("    (no targeting groups)");
        }
        for group in groups {
            let predicates = if group.predicates.is_empty() {
                "always".to_string()
            } else {
                group
                    .predicates
                    .iter()
                    .map(format_predicate)
                    .collect::<Vec<_>>()
                    .join(" AND ")
            };
            println!(
                "    {} ctr {:.4}: {}",
                group.targeting_group_id, group.click_through_rate, predicates
            );
        }
    }
}

/// Handle the 'customer' command
fn handle_customer(index: &AdIndex, customer_id: &str) -> Result<()> {
    let customer = index
        .get_customer(customer_id)
        .ok_or_else(|| anyhow!("Customer {} not found", customer_id))?;

    let mut segments: Vec<_> = customer.segments.iter().map(String::as_str).collect();
    segments.sort_unstable();

    println!("{}", format!("Customer {}", customer.customer_id).bold().blue());
    println!("{}Prime member: {}", "• ".green(), customer.prime_member);
    println!("{}Segments: {}", "• ".green(), segments.join(", "));
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    index: Arc<AdIndex>,
    marketplace_id: String,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be greater than zero"));
    }

    // Known customers plus anonymous requests
    let mut pool: Vec<Option<String>> = index
        .customer_ids()
        .into_iter()
        .map(|id| Some(id.to_string()))
        .collect();
    pool.push(None);

    let selector = AdvertisementSelector::from_index(index);
    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let marketplace_id = Arc::new(marketplace_id);

    let started = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let customer = pool[rand::random::<u32>() as usize % pool.len()].clone();
        let selector = selector.clone();
        let marketplace_id = marketplace_id.clone();
        let permit = semaphore.clone().acquire_owned().await?;

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let start = Instant::now();
            selector.select_advertisement(customer.as_deref(), Some(marketplace_id.as_str()))?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = started.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", total / timings.len() as u32);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} selections/second",
        requests as f64 / wall_time.as_secs_f64()
    );
    Ok(())
}

fn format_predicate(predicate: &TargetingPredicate) -> String {
    let body = match &predicate.kind {
        PredicateKind::Recognized => "recognized".to_string(),
        PredicateKind::Prime => "prime".to_string(),
        PredicateKind::Segment(name) => format!("segment={}", name),
        PredicateKind::Marketplace(ids) => format!("marketplace={}", ids.join("|")),
    };
    if predicate.inverted {
        format!("!{}", body)
    } else {
        body
    }
}
