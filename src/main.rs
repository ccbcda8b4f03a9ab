use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use maktaba::analysis::Sentiment;
use maktaba::fetcher::default_fetchers;
use maktaba::processor::ContentAnalysis;
use maktaba::ranking::ScoredRecord;
use maktaba::service::{AskOptions, AskOutcome};
use maktaba::store::SqliteStore;
use maktaba::utils::{ensure_database_directory, get_database_path};
use maktaba::{Database, KnowledgeService, Pipeline};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// maktaba - offline-first knowledge assistant
#[derive(Parser)]
#[command(name = "maktaba")]
#[command(about = "Answer questions from a local knowledge store and public sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from stored knowledge and, unless offline, the web
    Ask(AskCommand),
    /// Rank stored knowledge against a query without going online
    Search(SearchCommand),
    /// Summarize text from a file or stdin
    Summarize(SummarizeCommand),
    /// Report keywords, sentiment and topic of text from a file or stdin
    Analyze(AnalyzeCommand),
    /// Show recent questions
    History(HistoryCommand),
    /// Show store statistics
    Stats,
    /// Export stored knowledge and history as JSON
    Export(ExportCommand),
    /// Delete all stored knowledge and history
    Clear(ClearCommand),
    /// Open the interactive terminal interface
    Tui,
}

#[derive(Parser)]
struct AskCommand {
    /// The question to answer
    #[arg(value_name = "QUERY", num_args = 1.., required = true)]
    query: Vec<String>,

    /// Only use the local store
    #[arg(long)]
    offline: bool,

    /// List results without composing an answer
    #[arg(long)]
    no_summary: bool,

    /// Also print the sentences merged across all fetched sources
    #[arg(long)]
    merged: bool,
}

#[derive(Parser)]
struct SearchCommand {
    #[arg(value_name = "QUERY", num_args = 1.., required = true)]
    query: Vec<String>,
}

#[derive(Parser)]
struct SummarizeCommand {
    /// File to read; stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Maximum number of summary sentences
    #[arg(short, long, value_name = "N")]
    sentences: Option<usize>,

    /// Also list key points
    #[arg(short, long)]
    key_points: bool,
}

#[derive(Parser)]
struct AnalyzeCommand {
    /// File to read; stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Parser)]
struct HistoryCommand {
    /// Maximum number of entries to show
    #[arg(short, long, value_name = "N", default_value_t = 20)]
    limit: usize,
}

#[derive(Parser)]
struct ExportCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct ClearCommand {
    /// Confirm deletion
    #[arg(long)]
    yes: bool,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Tui));

    let result = match cli.command {
        Commands::Ask(cmd) => handle_ask(&cmd),
        Commands::Search(cmd) => handle_search(&cmd),
        Commands::Summarize(cmd) => handle_summarize(&cmd),
        Commands::Analyze(cmd) => handle_analyze(&cmd),
        Commands::History(cmd) => handle_history(&cmd),
        Commands::Stats => handle_stats(),
        Commands::Export(cmd) => handle_export(&cmd),
        Commands::Clear(cmd) => handle_clear(&cmd),
        Commands::Tui => handle_tui(),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs to stderr, filtered by `RUST_LOG`.
///
/// The TUI owns the terminal, so it logs nothing unless `RUST_LOG` is set.
fn init_tracing(quiet: bool) {
    let default = if quiet { "off" } else { "maktaba=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// User errors exit with 1, everything else with 2.
fn is_user_error(error: &anyhow::Error) -> bool {
    let error_msg = error.to_string();
    error_msg.contains("cannot be empty") || error_msg.contains("--yes")
}

fn open_database() -> Result<Database> {
    let db_path = get_database_path()?;
    ensure_database_directory(&db_path)?;
    Database::open(&db_path).context("Failed to open database")
}

/// Opens the on-disk store; `online` also wires up the default sources.
fn open_service(online: bool) -> Result<KnowledgeService> {
    let pipeline = Pipeline::from_env().context("Failed to load lexicon")?;
    let service = KnowledgeService::new(Box::new(SqliteStore::new(open_database()?)), pipeline);
    if !online {
        return Ok(service);
    }
    let fetchers = default_fetchers().context("Failed to build HTTP client")?;
    Ok(service.with_fetchers(fetchers))
}

fn handle_ask(cmd: &AskCommand) -> Result<()> {
    let query = cmd.query.join(" ");
    if query.trim().is_empty() {
        bail!("Query cannot be empty");
    }

    let service = open_service(!cmd.offline)?;
    let options = AskOptions {
        online: !cmd.offline,
        summarize: !cmd.no_summary,
    };
    let outcome = service.ask(&query, options)?;

    for error in &outcome.errors {
        eprintln!("warning: {error}");
    }
    print!("{}", format_outcome(&outcome, cmd.merged));
    Ok(())
}

/// Renders an answered question for the terminal.
fn format_outcome(outcome: &AskOutcome, show_merged: bool) -> String {
    let mut out = String::new();

    if let Some(answer) = &outcome.answer {
        if let Some(reason) = answer.reason() {
            let _ = writeln!(out, "(answer degraded: {reason})");
        }
        if answer.is_empty() {
            let _ = writeln!(out, "No information found for \"{}\".", outcome.query);
        } else {
            let _ = writeln!(out, "{}", answer.text().trim_end());
        }
        out.push('\n');
    }

    if show_merged && let Some(merged) = &outcome.merged {
        let _ = writeln!(out, "Merged:\n{merged}\n");
    }

    if !outcome.online.is_empty() {
        let _ = writeln!(out, "Online sources:");
        for result in &outcome.online {
            let _ = writeln!(
                out,
                "  [{}] {} ({}) {}",
                result.quality, result.title, result.source, result.url
            );
        }
    }
    if !outcome.cached.is_empty() {
        let _ = writeln!(out, "From local store:");
        out.push_str(&format_ranked(&outcome.cached));
    }
    out
}

/// One line per ranked record: score, query, source.
fn format_ranked(ranked: &[ScoredRecord]) -> String {
    let mut out = String::new();
    for scored in ranked {
        let _ = writeln!(
            out,
            "  {:>6.1}  {} ({})",
            scored.score, scored.record.query, scored.record.source
        );
    }
    out
}

fn handle_search(cmd: &SearchCommand) -> Result<()> {
    let query = cmd.query.join(" ");
    let service = open_service(false)?;
    let ranked = service.search_local(&query)?;

    if ranked.is_empty() {
        println!("No stored knowledge matches \"{}\".", query.trim());
    } else {
        print!("{}", format_ranked(&ranked));
    }
    Ok(())
}

/// Reads `file`, or stdin when `None`, and rejects blank input.
fn read_input(file: Option<&Path>) -> Result<String> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };
    if text.trim().is_empty() {
        bail!("Input text cannot be empty");
    }
    Ok(text)
}

fn handle_summarize(cmd: &SummarizeCommand) -> Result<()> {
    let pipeline = Pipeline::from_env().context("Failed to load lexicon")?;
    let text = pipeline.normalizer.normalize(&read_input(cmd.file.as_deref())?);
    print!("{}", summarize_text(&pipeline, &text, cmd.sentences, cmd.key_points));
    Ok(())
}

fn summarize_text(
    pipeline: &Pipeline,
    text: &str,
    sentences: Option<usize>,
    key_points: bool,
) -> String {
    let sentences = sentences.unwrap_or(pipeline.config.summary_sentences);
    let mut out = format!("{}\n", pipeline.summarizer.summarize(text, sentences));

    if key_points {
        out.push_str("\nKey points:\n");
        for (i, point) in pipeline
            .key_points
            .extract_key_points(text)
            .iter()
            .enumerate()
        {
            let _ = writeln!(out, "{}. {point}", i + 1);
        }
    }
    out
}

#[derive(Serialize)]
struct AnalysisReport {
    sentiment: Sentiment,
    topic: Option<String>,
    #[serde(flatten)]
    content: ContentAnalysis,
}

fn analyze_text(pipeline: &Pipeline, text: &str) -> AnalysisReport {
    AnalysisReport {
        sentiment: pipeline.analyzer.analyze_sentiment(text),
        topic: pipeline.analyzer.classify_topic(text).map(str::to_string),
        content: pipeline.processor.analyze_content(text),
    }
}

fn handle_analyze(cmd: &AnalyzeCommand) -> Result<()> {
    let pipeline = Pipeline::from_env().context("Failed to load lexicon")?;
    let text = pipeline.normalizer.normalize(&read_input(cmd.file.as_deref())?);
    let report = analyze_text(&pipeline, &text);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn handle_history(cmd: &HistoryCommand) -> Result<()> {
    let service = open_service(false)?;
    for entry in service.history(Some(cmd.limit))? {
        println!(
            "{}  {} ({} results)",
            entry.timestamp.date(),
            entry.query,
            entry.results_count
        );
    }
    Ok(())
}

fn handle_stats() -> Result<()> {
    let stats = open_service(false)?.stats()?;
    println!("Stored records: {}", stats.total_knowledge);
    println!("Questions asked: {}", stats.total_history);
    println!("Distinct sources: {}", stats.sources);
    if let (Some(oldest), Some(newest)) = (stats.oldest_entry, stats.newest_entry) {
        println!("Oldest entry: {}", oldest.date());
        println!("Newest entry: {}", newest.date());
    }
    Ok(())
}

fn handle_export(cmd: &ExportCommand) -> Result<()> {
    let export = open_service(false)?.export()?;
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize export")?;

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Exported {} records to {}",
                export.knowledge.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_clear(cmd: &ClearCommand) -> Result<()> {
    if !cmd.yes {
        bail!("Refusing to delete all knowledge without --yes");
    }
    open_service(false)?.clear()?;
    println!("Local store cleared");
    Ok(())
}

fn handle_tui() -> Result<()> {
    let service = open_service(true)?;
    maktaba::tui::run(&service)
}
