use anyhow::{Context, Result};
use clap::Parser;
use marketbrief::acquisition::{AcquisitionState, AcquisitionStateMachine};
use marketbrief::config::{self, AppConfig};
use marketbrief::credentials::{CredentialResolver, FileCredentialStore, ProcessEnvironment};
use marketbrief::models::{CitationRef, MarketReport};
use marketbrief::services::{GeminiClient, ReportRequestBuilder};
use marketbrief::telemetry::init_tracing;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_FAILED: u8 = 1;
const EXIT_NEEDS_CREDENTIAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "marketbrief", version, about = "A-share daily market review")]
struct Cli {
    #[arg(long, help = "API key to use; stored for later runs")]
    api_key: Option<String>,
    #[arg(long, help = "Forget the stored API key and exit")]
    clear_key: bool,
    #[arg(long, help = "Print the report and sources as JSON")]
    json: bool,
    #[arg(long, help = "Config file (defaults to the workspace config.toml)")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => config::load_or_default()?,
    };
    init_tracing(&cfg.logging)?;

    let resolver = CredentialResolver::new(
        FileCredentialStore::for_workspace()?,
        ProcessEnvironment::new(&cfg.generation.api_key_env),
    );
    let builder = ReportRequestBuilder::new().with_search(cfg.generation.search_enabled);
    let mut machine = AcquisitionStateMachine::new(resolver, builder, cfg.generation.timeout());

    if cli.clear_key {
        machine.clear_credential();
        println!("Stored API key removed.");
        return Ok(ExitCode::SUCCESS);
    }

    let service = GeminiClient::new(&cfg.generation)?;
    let mut attempt = machine.start(cli.api_key.as_deref());
    if attempt.is_none() {
        attempt = prompt_for_key()?.and_then(|key| machine.submit_credential(&key));
    }
    let Some(attempt) = attempt else {
        eprintln!(
            "No API key configured. Pass --api-key or set {}.",
            cfg.generation.api_key_env
        );
        return Ok(ExitCode::from(EXIT_NEEDS_CREDENTIAL));
    };

    match machine.settle(attempt, &service).await {
        AcquisitionState::Ready {
            report, citations, ..
        } => {
            if cli.json {
                let payload = serde_json::json!({ "report": report, "sources": citations });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_digest(report, citations);
            }
            Ok(ExitCode::SUCCESS)
        }
        AcquisitionState::Failed {
            error,
            partial_text,
        } => {
            eprintln!("Error: {error}");
            if let Some(text) = partial_text {
                eprintln!("{text}");
            }
            Ok(ExitCode::from(EXIT_FAILED))
        }
        AcquisitionState::NeedsCredential => {
            eprintln!("The service rejected the API key. Pass a new --api-key or run with --clear-key.");
            Ok(ExitCode::from(EXIT_NEEDS_CREDENTIAL))
        }
        AcquisitionState::Loading { attempt } => {
            eprintln!("Attempt {attempt} did not settle.");
            Ok(ExitCode::from(EXIT_FAILED))
        }
    }
}

/// Asks once for a key when attached to a terminal.
fn prompt_for_key() -> Result<Option<String>> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(None);
    }
    eprint!("Gemini API key: ");
    io::stderr().flush()?;
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("Failed to read API key from stdin")?;
    Ok(Some(line))
}

fn print_digest(report: &MarketReport, citations: &[CitationRef]) {
    let sentiment = &report.sentiment;
    println!("Market review {}", report.date);
    println!(
        "Turnover {} | up {} / down {} / flat {} | limit-up {} / limit-down {}",
        sentiment.total_turnover,
        sentiment.up_count,
        sentiment.down_count,
        sentiment.flat_count,
        sentiment.limit_up_count,
        sentiment.limit_down_count
    );
    println!(
        "Sentiment {} - {}",
        sentiment.sentiment_score, sentiment.sentiment_description
    );
    for sector in &report.hot_sectors {
        println!(
            "  {} ({} limit-up, leader {}): {}",
            sector.name, sector.limit_up_count, sector.leader_stock, sector.reason
        );
    }
    for level in &report.ladder {
        println!("  {}: {}", level.level, level.stocks.join(", "));
    }
    for stat in &report.style_stats {
        println!("  {} {}", stat.label, stat.score);
    }
    println!("Style: {}", report.style_analysis);
    println!();
    println!("{}", report.summary);
    if !citations.is_empty() {
        println!();
        println!("Sources:");
        for citation in citations {
            println!("  {} <{}>", citation.display_title(), citation.uri);
        }
    }
}
