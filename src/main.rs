use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use memorymap::config::Config;
use memorymap::embed;
use memorymap::index::Metric;
use memorymap::logging;
use memorymap::search::intent::{self, Intent};
use memorymap::search::location::{self, LocationQuery};
use memorymap::search::{explain_empty, MemorySearch, ScoredResult};
use memorymap::store::loader::{self, Loaded};
use memorymap::store::{Bounds, Collection, MemoryRecord};

#[derive(Parser)]
#[command(name = "memorymap", version, about = "Search your photo memories in plain language")]
struct Cli {
    /// Project directory holding .memorymap/config.toml
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Memories CSV (overrides data.path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Log filter, e.g. "info" or "memorymap=debug" (overrides log.level)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank memories by similarity to a natural-language query
    Query {
        /// Natural language query
        query: String,
        /// Minimum similarity in [0, 1]
        #[arg(long)]
        threshold: Option<f64>,
        /// Number of top results to highlight
        #[arg(long)]
        top_n: Option<usize>,
        /// Cap on returned results
        #[arg(long)]
        max_results: Option<usize>,
        /// Distance metric for the index
        #[arg(long, value_enum)]
        metric: Option<Metric>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List every loaded memory
    List,
    /// Find memories by location name
    Locate {
        /// Part of a location name, case-insensitive
        name: String,
        #[arg(long, default_value_t = 20)]
        max_results: usize,
    },
    /// Show collection and model statistics
    Status,
    /// Write a default config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.root)?;
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if let Some(data) = &cli.data {
        config.data.path = data.clone();
    }
    logging::init(&config.log.level)?;

    match cli.command {
        Commands::Query {
            query,
            threshold,
            top_n,
            max_results,
            metric,
            json,
        } => {
            if let Some(t) = threshold {
                config.search.similarity_threshold = t;
            }
            if let Some(n) = top_n {
                config.search.top_n = n;
            }
            if max_results.is_some() {
                config.search.max_results = max_results;
            }
            if let Some(m) = metric {
                config.search.distance_metric = m;
            }
            config.validate()?;
            run_query(&cli.root, &config, &query, json)
        }
        Commands::List => {
            let loaded = load_collection(&cli.root, &config)?;
            if loaded.collection.is_empty() {
                println!("No memories available.");
            }
            for (i, record) in loaded.collection.records().iter().enumerate() {
                println!("{i:>4}  {}", format_record(record));
            }
            Ok(())
        }
        Commands::Locate { name, max_results } => {
            let loaded = load_collection(&cli.root, &config)?;
            let query = LocationQuery {
                text: name,
                max_results,
            };
            let hits = location::find(&loaded.collection, &query);
            if hits.is_empty() {
                println!("No memories at a location matching '{}'.", query.text);
            }
            for i in hits {
                if let Some(record) = loaded.collection.get(i) {
                    println!("{i:>4}  {}", format_record(record));
                }
            }
            Ok(())
        }
        Commands::Status => {
            let (search, rejected) = open_search(&cli.root, &config)?;
            let stats = search.stats();
            println!("memories:    {}", stats.memories);
            println!("rejected:    {rejected}");
            println!("model:       {}", stats.model);
            println!("dimension:   {}", stats.dimension);
            println!("metric:      {}", stats.metric);
            println!("fingerprint: {}", stats.fingerprint);
            println!("data:        {}", config.data_path(&cli.root).display());
            Ok(())
        }
        Commands::Init { force } => {
            let path = Config::config_path(&cli.root);
            if path.exists() && !force {
                bail!("{} already exists (use --force to replace it)", path.display());
            }
            let written = Config::default().save(&cli.root)?;
            println!("Wrote {}", written.display());
            Ok(())
        }
    }
}

fn load_collection(root: &Path, config: &Config) -> Result<Loaded> {
    let data_path = config.data_path(root);
    loader::load(&data_path, config.data.policy)
        .with_context(|| format!("loading memories from {}", data_path.display()))
}

fn open_search(root: &Path, config: &Config) -> Result<(MemorySearch, usize)> {
    let loaded = load_collection(root, config)?;
    let embedder = embed::build_embedder(&config.embed).context("starting embedder")?;
    let search = MemorySearch::build(loaded.collection, embedder, &config.search)
        .context("building memory index")?;
    Ok((search, loaded.rejected.len()))
}

#[derive(Serialize)]
struct QueryReport<'a> {
    query: &'a str,
    intents: Vec<Intent>,
    results: Vec<ResultView<'a>>,
    bounds: Option<Bounds>,
    message: Option<String>,
}

#[derive(Serialize)]
struct ResultView<'a> {
    index: usize,
    rank: usize,
    score: f32,
    highlighted: bool,
    memory: &'a MemoryRecord,
}

fn run_query(root: &Path, config: &Config, query: &str, json: bool) -> Result<()> {
    let (search, _) = open_search(root, config)?;
    let outcome = search.answer_query(query);
    if let Err(e) = &outcome {
        if !e.is_recoverable() {
            bail!("search failed: {e}");
        }
    }

    let message = explain_empty(&outcome, query);
    let results = outcome.unwrap_or_default();
    let collection = search.collection();

    if json {
        let report = QueryReport {
            query,
            intents: intent::analyze(query),
            results: result_views(collection, &results),
            bounds: collection.bounds(&results),
            message,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(message) = message {
        println!("{message}");
        return Ok(());
    }

    let highlighted = results.iter().filter(|r| r.highlighted).count();
    println!(
        "{} memories for '{query}' ({highlighted} highlighted):",
        results.len()
    );
    for view in result_views(collection, &results) {
        let marker = if view.highlighted { '*' } else { ' ' };
        println!(
            "{marker} {:>2}. {:.3}  {}",
            view.rank + 1,
            view.score,
            format_record(view.memory)
        );
    }
    Ok(())
}

fn result_views<'a>(collection: &'a Collection, results: &[ScoredResult]) -> Vec<ResultView<'a>> {
    results
        .iter()
        .filter_map(|r| {
            collection.get(r.record).map(|memory| ResultView {
                index: r.record,
                rank: r.rank,
                score: r.score,
                highlighted: r.highlighted,
                memory,
            })
        })
        .collect()
}

fn format_record(record: &MemoryRecord) -> String {
    format!(
        "{} ({:.4}, {:.4}) - {} [{}]",
        record.location,
        record.coordinates.latitude,
        record.coordinates.longitude,
        record.caption,
        record.image
    )
}
