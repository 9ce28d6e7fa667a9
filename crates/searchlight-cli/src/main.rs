//! Searchlight CLI
//!
//! Command-line interface for indexing and searching with offline fallback.

mod source;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use searchlight_core::optimize::FieldRef;
use searchlight_core::{
    Filter, FilterOperator, FilterValue, IndexLocation, MatchSpan, OfflineIndex, RemoteSource,
    ResultOrigin, Scalar, SearchConfig, SearchCoordinator, SearchParams, SearchResponse,
    SqlitePreferences,
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::source::{FileSource, OfflineOnly};

/// Searchlight - resilient search CLI
#[derive(Parser)]
#[command(name = "searchlight")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fuzzy search with an offline index, result cache, and automatic fallback")]
struct Cli {
    /// Directory holding the offline index (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the offline index from a JSON file of results
    Index {
        /// JSON array of search results
        #[arg(long)]
        source: PathBuf,
    },

    /// Search, falling back to the offline index when the source is unavailable
    Search {
        /// Query text (empty lists everything)
        #[arg(default_value = "")]
        query: String,
        /// Live source: JSON array of search results
        #[arg(long)]
        source: Option<PathBuf>,
        /// Filter as field:operator:value (between takes start..end)
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest past queries for a partial input
    Suggest {
        partial: String,
    },

    /// Show search history
    History {
        /// Forget all recorded queries
        #[arg(long)]
        clear: bool,
    },

    /// Remove every record from the offline index
    ClearIndex,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let mut config = SearchConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.index_location = IndexLocation::in_dir(dir);
    }

    match cli.command {
        Commands::Index { source } => run_index(config, source).await,
        Commands::Search {
            query,
            source,
            filters,
            limit,
            json,
        } => run_search(config, query, source, filters, limit, json).await,
        Commands::Suggest { partial } => run_suggest(config, partial).await,
        Commands::History { clear } => run_history(config, clear).await,
        Commands::ClearIndex => run_clear_index(config).await,
    }
}

/// Build a coordinator over `source` using the configured index location
fn coordinator(config: SearchConfig, source: Option<PathBuf>) -> anyhow::Result<SearchCoordinator> {
    let remote: Arc<dyn RemoteSource> = match source {
        Some(path) => Arc::new(FileSource::new(path)),
        None => Arc::new(OfflineOnly),
    };
    let index = OfflineIndex::new(config.index_location.clone())
        .with_batch_size(config.optimizer.batch_size);
    let preferences = Arc::new(SqlitePreferences::open(&config.index_location)?);

    Ok(SearchCoordinator::new(remote, index, preferences).with_config(config))
}

/// Run index command
async fn run_index(config: SearchConfig, source: PathBuf) -> anyhow::Result<()> {
    let location = config.index_location.clone();
    let coordinator = coordinator(config, Some(source))?;
    let summary = coordinator.build_search_index().await?;

    if summary.preserved_previous {
        println!(
            "{} rebuild failed, kept previous snapshot ({} records)",
            "Warning:".yellow().bold(),
            summary.indexed
        );
    } else {
        println!(
            "{} {} records into {}",
            "Indexed".green().bold(),
            summary.indexed,
            location
        );
    }
    Ok(())
}

/// Run search command
async fn run_search(
    config: SearchConfig,
    query: String,
    source: Option<PathBuf>,
    filters: Vec<String>,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let mut params = SearchParams::query(query);
    for raw in &filters {
        params = params.with_filter(parse_filter(raw)?);
    }
    params.limit = limit;

    let coordinator = coordinator(config, source)?;
    let response = coordinator.search(&params).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &SearchResponse) {
    let stats = &response.stats;
    let origin = match stats.origin {
        ResultOrigin::Live => "live".green(),
        ResultOrigin::Cache => "cache".cyan(),
        ResultOrigin::Offline => "offline".yellow(),
        ResultOrigin::Stale => "stale".red(),
    };
    println!(
        "{} results ({}, {} filters, {:.1} ms)",
        stats.total_results.to_string().bold(),
        origin,
        stats.filter_count,
        stats.search_time_ms
    );
    println!();

    if response.results.is_empty() {
        println!("{}", "No results.".dimmed());
        return;
    }

    for (n, result) in response.results.iter().enumerate() {
        let score = result
            .fuzzy_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}. {} {} [{}]",
            n + 1,
            result.metadata.title.white().bold(),
            result.id.dimmed(),
            score
        );

        let spans = result
            .highlights
            .iter()
            .find(|h| h.field == "content")
            .map(|h| h.matches.as_slice())
            .unwrap_or_default();
        println!("     {}", render_highlighted(&result.content, spans, 160));
    }
}

/// Content with highlight spans in bold, cut to `max` chars
fn render_highlighted(text: &str, spans: &[MatchSpan], max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let end = chars.len().min(max);
    let mut out = String::new();
    let mut cursor = 0;

    for span in spans.iter().filter(|s| s.end <= end) {
        out.extend(&chars[cursor..span.start]);
        let matched: String = chars[span.start..span.end].iter().collect();
        out.push_str(&matched.yellow().bold().to_string());
        cursor = span.end;
    }
    out.extend(&chars[cursor..end]);
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

/// Parse `field:operator:value`; `between` values are `start..end`
fn parse_filter(raw: &str) -> anyhow::Result<Filter> {
    let mut parts = raw.splitn(3, ':');
    let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        anyhow::bail!("Filter must look like field:operator:value, got '{}'", raw);
    };

    let operator: FilterOperator = operator.parse().map_err(anyhow::Error::msg)?;
    let numeric = FieldRef::parse(field).is_some_and(|f| f.is_numeric());
    let scalar = |s: &str| match s.trim().parse::<f64>() {
        Ok(n) if numeric => Scalar::Number(n),
        _ => Scalar::Text(s.trim().to_string()),
    };

    let value = match (operator, value.split_once("..")) {
        (FilterOperator::Between, Some((start, end))) => FilterValue::Range {
            start: scalar(start),
            end: scalar(end),
        },
        _ => match scalar(value) {
            Scalar::Number(n) => FilterValue::Number(n),
            Scalar::Text(s) => FilterValue::Text(s),
        },
    };

    Ok(Filter {
        field: field.to_string(),
        operator,
        value,
    })
}

/// Run suggest command
async fn run_suggest(config: SearchConfig, partial: String) -> anyhow::Result<()> {
    let coordinator = coordinator(config, None)?;
    let suggestions = coordinator.suggest_queries(&partial).await?;

    if suggestions.is_empty() {
        println!("{}", "No suggestions.".dimmed());
    }
    for suggestion in suggestions {
        println!("{}", suggestion);
    }
    Ok(())
}

/// Run history command
async fn run_history(config: SearchConfig, clear: bool) -> anyhow::Result<()> {
    let coordinator = coordinator(config, None)?;

    if clear {
        coordinator.clear_history().await?;
        println!("{}", "Search history cleared.".green());
        return Ok(());
    }

    let mut history = coordinator.search_history().await?;
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    println!("{}", "=== Search History ===".cyan().bold());
    if history.is_empty() {
        println!("{}", "No searches yet.".dimmed());
    }
    for entry in history {
        println!(
            "  {:>4}x  {}  {}",
            entry.count,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.query
        );
    }
    Ok(())
}

/// Run clear-index command
async fn run_clear_index(config: SearchConfig) -> anyhow::Result<()> {
    let location = config.index_location.clone();
    let index = OfflineIndex::new(location.clone());
    index.clear_index().await?;
    println!("{} {}", "Cleared offline index at".green(), location);
    Ok(())
}
