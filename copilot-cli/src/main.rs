//! Fulfillment Copilot CLI
//!
//! # Commands
//!
//! ```bash
//! # Explain a delay (retrieval + language model)
//! copilot ask "Why was my shipment delayed?" -k 5
//!
//! # Show the retrieved delay reasons only
//! copilot search "Why was my shipment delayed?" -k 3
//!
//! # Score the pipeline against labelled questions
//! copilot eval evals/qa_seed.csv
//! ```
//!
//! Progress and logs go to stderr (`RUST_LOG` controls verbosity); answers go
//! to stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use copilot_lib::{
    config::{
        Settings, DEFAULT_CHAT_ENDPOINT, DEFAULT_CHAT_MODEL, DEFAULT_EVAL_TOP_K,
        DEFAULT_INDEX_PATH, DEFAULT_RECORDS_PATH, DEFAULT_TOP_K,
    },
    embed::MiniLmEmbedder,
    eval::{evaluate, load_cases},
    generate::OpenAiChat,
    index::FlatIndex,
    pipeline::Copilot,
    retrieve::{validate_query, RankedPassage, Retriever},
    store::RecordStore,
    Error,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Explain why a shipment was delayed: Weather, Traffic, or Inventory")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a delay question
    Ask {
        /// Free-text question
        query: String,

        /// Number of passages to retrieve
        #[arg(short, long, env = "COPILOT_TOP_K")]
        k: Option<usize>,

        #[command(flatten)]
        artifacts: ArtifactArgs,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Retrieve similar delay reasons without calling the model
    Search {
        /// Free-text query
        query: String,

        /// Number of passages to retrieve
        #[arg(short, long, env = "COPILOT_TOP_K")]
        k: Option<usize>,

        #[command(flatten)]
        artifacts: ArtifactArgs,
    },

    /// Run labelled questions and report accuracy
    Eval {
        /// Headerless CSV of question,expected-category rows
        #[arg(default_value = "evals/qa_seed.csv")]
        cases: PathBuf,

        /// Number of passages to retrieve per question
        #[arg(short, long, env = "COPILOT_TOP_K")]
        k: Option<usize>,

        #[command(flatten)]
        artifacts: ArtifactArgs,

        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Args)]
struct ArtifactArgs {
    /// Vector index file
    #[arg(long, env = "COPILOT_INDEX", default_value = DEFAULT_INDEX_PATH)]
    index: PathBuf,

    /// Record store file
    #[arg(long, env = "COPILOT_RECORDS", default_value = DEFAULT_RECORDS_PATH)]
    records: PathBuf,
}

#[derive(Args)]
struct ModelArgs {
    /// Chat model name
    #[arg(long, env = "COPILOT_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "COPILOT_CHAT_ENDPOINT", default_value = DEFAULT_CHAT_ENDPOINT)]
    chat_endpoint: String,

    /// API key for the chat endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "COPILOT_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Request timeout in seconds
    #[arg(long, env = "COPILOT_TIMEOUT", default_value_t = 30)]
    timeout: u64,
}

/// Merge flags over defaults. `default_k` applies when `-k` is not given.
fn settings(
    artifacts: &ArtifactArgs,
    model: Option<&ModelArgs>,
    k: Option<usize>,
    default_k: usize,
) -> Settings {
    let mut settings = Settings {
        index_path: artifacts.index.clone(),
        records_path: artifacts.records.clone(),
        top_k: k.unwrap_or(default_k),
        ..Settings::default()
    };
    if let Some(model) = model {
        settings.chat_model = model.chat_model.clone();
        settings.chat_endpoint = model.chat_endpoint.clone();
        settings.temperature = model.temperature;
        settings.timeout_secs = model.timeout;
    }
    settings
}

fn load_retriever(settings: &Settings) -> Result<Retriever<MiniLmEmbedder, FlatIndex>> {
    let index = FlatIndex::load(&settings.index_path)?;
    let records = RecordStore::load(&settings.records_path)?;

    eprintln!("Loading embedding model (first run downloads ~90MB)...");
    let embedder = MiniLmEmbedder::new()?;

    let retriever = Retriever::new(Arc::new(embedder), Arc::new(index), Arc::new(records))?;
    eprintln!("Index contains {} delay records", retriever.len());
    Ok(retriever)
}

fn load_copilot(
    settings: &Settings,
    model: &ModelArgs,
) -> Result<Copilot<MiniLmEmbedder, FlatIndex, OpenAiChat>> {
    let Some(api_key) = model.api_key.as_deref() else {
        return Err(Error::GenerationUnavailable(
            "OpenAI API key not set. Run `export OPENAI_API_KEY=...` and retry.".to_string(),
        )
        .into());
    };
    let chat = OpenAiChat::from_settings(api_key, settings)?;
    let retriever = load_retriever(settings)?;

    Ok(Copilot::new(retriever, Arc::new(chat)))
}

fn print_passages(passages: &[RankedPassage], max_chars: Option<usize>) {
    for p in passages {
        let text = match max_chars {
            Some(n) => p.text.chars().take(n).collect(),
            None => p.text.clone(),
        };
        println!("{}. ({:.2}) {text}", p.rank, p.distance);
    }
}

/// Collapse whitespace and cut at a word boundary, marking the cut.
fn shorten(text: &str, width: usize) -> String {
    const MARKER: &str = " [...]";

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let mut out = String::new();
    for word in collapsed.split(' ') {
        let sep = usize::from(!out.is_empty());
        if out.chars().count() + sep + word.chars().count() + MARKER.len() > width {
            break;
        }
        if sep == 1 {
            out.push(' ');
        }
        out.push_str(word);
    }
    out.push_str(MARKER);
    out.trim_start().to_string()
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask {
            query,
            k,
            artifacts,
            model,
        } => {
            validate_query(&query)?;
            let settings = settings(&artifacts, Some(&model), k, DEFAULT_TOP_K);
            let copilot = load_copilot(&settings, &model)?;

            eprintln!("Retrieving context & generating answer...");
            let answer = copilot.ask(&query, settings.top_k)?;

            println!("=== Retrieval context ===\n");
            print_passages(&answer.passages, None);
            println!("\n=== Answer ===\n");
            println!("[{}] {}", answer.category, answer.explanation);
        }

        Commands::Search {
            query,
            k,
            artifacts,
        } => {
            validate_query(&query)?;
            let settings = settings(&artifacts, None, k, DEFAULT_EVAL_TOP_K);
            let retriever = load_retriever(&settings)?;

            let passages = retriever.retrieve(&query, settings.top_k)?;
            print_passages(&passages, Some(160));
        }

        Commands::Eval {
            cases,
            k,
            artifacts,
            model,
        } => {
            let cases = load_cases(&cases)?;
            let settings = settings(&artifacts, Some(&model), k, DEFAULT_EVAL_TOP_K);
            let copilot = load_copilot(&settings, &model)?;

            let report = evaluate(&copilot, &cases, settings.top_k);
            for outcome in &report.outcomes {
                println!("Q: {}", outcome.question);
                println!("Expected keyword: {}", outcome.expected);
                println!("Answer: {}", shorten(&outcome.answer, 140));
                println!("{}\n", if outcome.passed { "PASS" } else { "FAIL" });
            }
            println!(
                "Accuracy: {}/{} = {:.0}%",
                report.hits(),
                report.total(),
                report.accuracy() * 100.0
            );
        }
    }

    Ok(())
}

/// One message per failure kind.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(Error::InvalidInput(_)) => format!("Please check your request: {err}"),
        Some(Error::IndexCorrupt(_)) => {
            format!("The delay index is inconsistent and must be rebuilt: {err}")
        }
        Some(Error::Load { .. }) => format!("Could not load index artifacts: {err}"),
        Some(Error::RetrievalUnavailable(_)) => format!("Retrieval is unavailable: {err}"),
        Some(Error::GenerationUnavailable(_)) => {
            format!("The language model is unavailable: {err}")
        }
        None => format!("Error: {err:#}"),
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    exit_status(run(Cli::parse()))
}

/// Any produced answer is success, even Unknown; every failure is non-zero.
fn exit_status(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(kind) = err.downcast_ref::<Error>().map(Error::kind) {
                tracing::error!(kind, "query failed");
            }
            eprintln!("{}", describe(&err));
            ExitCode::FAILURE
        }
    }
}
