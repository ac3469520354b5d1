use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use tokio::sync::mpsc;
use url::Url;

use qsift_core::{
    ArticleMetrics, CandidateItem, ConfigProvider, Conditions, FetchConfig, FilterConfig,
    HttpFetcher, InMemoryStore, ItemId, ScanPipeline, ScanTrigger, canonicalize, extract_metrics,
    should_hide,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Score article pages with the qsift low-value heuristics
#[derive(Parser, Debug)]
#[command(name = "qsift")]
#[command(version = VERSION)]
#[command(about = "Fetch article pages and report hide/show decisions", long_about = None)]
struct Args {
    /// Article URLs, local HTML files, or "-" for stdin
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Output as JSON instead of the text table
    #[arg(short, long)]
    json: bool,

    /// Settings blob (same JSON shape the extension stores)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable every hide condition, not just the defaults
    #[arg(long)]
    all_conditions: bool,

    /// Per-fetch deadline in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
}

/// Per-input outcome for reporting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    input: String,
    /// "hide", "show", or "skipped".
    decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<ArticleMetrics>,
}

impl Report {
    fn decided(input: String, metrics: ArticleMetrics, hide: bool) -> Self {
        Self {
            input,
            decision: if hide { "hide" } else { "show" }.to_string(),
            reason: None,
            metrics: Some(metrics),
        }
    }

    fn skipped(input: String, reason: &str) -> Self {
        Self {
            input,
            decision: "skipped".to_string(),
            reason: Some(reason.to_string()),
            metrics: None,
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<FilterConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let blob = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            FilterConfig::from_stored(&blob)
        }
        None => FilterConfig::default(),
    };

    if args.all_conditions {
        config.conditions = Conditions {
            hide_ai_generated: true,
            hide_no_image: true,
            hide_short_title: true,
            hide_short_body: true,
            hide_code_only: true,
            hide_many_code_blocks: true,
            hide_few_sentences: true,
            hide_many_bullets: true,
            hide_many_headings: true,
            hide_template_phrases: true,
            hide_excessive_emojis: true,
            hide_low_info_density: true,
        };
    }

    Ok(config)
}

fn read_local(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read file {input}"))
    }
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Runs all URL inputs through the scan pipeline in one batch, so fetch
/// dedup, the concurrency ceiling, and the timeout all apply.
async fn score_urls(
    urls: Vec<(usize, String)>,
    config: FilterConfig,
    timeout_ms: u64,
) -> anyhow::Result<HashMap<usize, Report>> {
    let base = Url::parse("https://qiita.com/").context("base URL")?;
    let mut reports = HashMap::new();

    let mut items = Vec::new();
    let mut index_of = HashMap::new();
    for (index, url) in urls {
        if canonicalize(&url, &base).is_none() {
            reports.insert(
                index,
                Report::skipped(url, "not an item page URL (/<owner>/items/<id>)"),
            );
            continue;
        }
        let id = ItemId(index as u64);
        index_of.insert(id, (index, url.clone()));
        items.push(CandidateItem { id, href: url });
    }

    if items.is_empty() {
        return Ok(reports);
    }

    let fetcher = Arc::new(HttpFetcher::new(FetchConfig {
        timeout_ms,
        ..FetchConfig::default()
    })?);
    let (_provider, config_rx) = ConfigProvider::new(config);
    let (pipeline, mut decisions) = ScanPipeline::new(
        fetcher,
        InMemoryStore::new(),
        config_rx,
        base,
        Duration::from_millis(timeout_ms),
    );

    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
    let snapshot = items.clone();
    let handle = tokio::spawn(pipeline.run(move || snapshot.clone(), trigger_rx));
    trigger_tx
        .send(ScanTrigger::Activated)
        .context("pipeline stopped before scanning")?;
    drop(trigger_tx);
    handle.await.context("pipeline task panicked")?;

    while let Some(decision) = decisions.recv().await {
        if let Some((index, url)) = index_of.remove(&decision.item) {
            reports.insert(index, Report::decided(url, decision.metrics, decision.hide));
        }
    }

    // Anything left got no decision: its fetch failed or timed out.
    for (_, (index, url)) in index_of {
        reports.insert(index, Report::skipped(url, "fetch failed or timed out"));
    }

    Ok(reports)
}

fn print_text(reports: &[Report]) {
    for report in reports {
        let label = match report.decision.as_str() {
            "hide" => format!("{}", "HIDE".red().bold()),
            "show" => format!("{}", "SHOW".green().bold()),
            _ => format!("{}", "SKIP".yellow().bold()),
        };

        match (&report.metrics, &report.reason) {
            (Some(m), _) => println!(
                "{label}  {}  ai={} template={} title={} body={} sentences={} density={:.2}",
                report.input,
                m.ai_score,
                m.template_score,
                m.title_len,
                m.body_text_len,
                m.sentence_count,
                m.info_density,
            ),
            (None, Some(reason)) => println!("{label}  {}  ({reason})", report.input),
            (None, None) => println!("{label}  {}", report.input),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut urls = Vec::new();
    let mut reports: HashMap<usize, Report> = HashMap::new();

    for (index, input) in args.inputs.iter().enumerate() {
        if is_url(input) {
            urls.push((index, input.clone()));
        } else {
            let html = read_local(input)?;
            let metrics = extract_metrics(&html);
            let hide = should_hide(&metrics, &config);
            reports.insert(index, Report::decided(input.clone(), metrics, hide));
        }
    }

    reports.extend(score_urls(urls, config, args.timeout_ms).await?);

    let mut ordered: Vec<_> = reports.into_iter().collect();
    ordered.sort_by_key(|(index, _)| *index);
    let ordered: Vec<Report> = ordered.into_iter().map(|(_, report)| report).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ordered)?);
    } else {
        print_text(&ordered);
    }

    let any_hidden = ordered.iter().any(|r| r.decision == "hide");
    if any_hidden {
        std::process::exit(1);
    }
    Ok(())
}
