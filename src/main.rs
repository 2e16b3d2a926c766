//! # askpdf CLI
//!
//! One-shot commands over the document-to-answer pipeline, plus the HTTP
//! server. All commands accept an optional `--config` flag pointing to a
//! TOML configuration file; built-in defaults are used when it is absent.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askpdf extract <file>` | Extract and print the PDF's text |
//! | `askpdf chunk <file>` | Dry-run: show fragment counts and sizes |
//! | `askpdf questions` | List the configured preset questions |
//! | `askpdf ask <file> [QUESTION]` | Run the full pipeline and print the answer |
//! | `askpdf serve` | Start the HTTP interactive surface |

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use askpdf::chunk::chunk_text;
use askpdf::config::{self, Config};
use askpdf::embedding::OpenAiEmbedder;
use askpdf::extract::extract_text;
use askpdf::generate::OpenAiGenerator;
use askpdf::question::QuestionInput;
use askpdf::server;
use askpdf::session::Session;

/// askpdf — ask natural-language questions about a PDF, answered via
/// embedding similarity search and a hosted generative model.
#[derive(Parser)]
#[command(
    name = "askpdf",
    about = "Session-scoped PDF question answering over embedding similarity search",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a PDF's text and print it with a character count.
    Extract {
        /// Path to the PDF file.
        file: PathBuf,
    },

    /// Dry-run the chunker: show how many fragments the PDF would produce.
    Chunk {
        /// Path to the PDF file.
        file: PathBuf,

        /// Print each fragment's text, not just its size.
        #[arg(long)]
        show_text: bool,
    },

    /// List the configured preset questions.
    Questions,

    /// Run the full pipeline against one PDF and print the answer.
    ///
    /// The question is either free text or a preset index (`--preset`);
    /// free text wins when both are given.
    Ask {
        /// Path to the PDF file.
        file: PathBuf,

        /// Free-text question.
        question: Option<String>,

        /// Preset question index (see `askpdf questions`).
        #[arg(long)]
        preset: Option<usize>,

        /// API key; falls back to the OPENAI_API_KEY environment variable.
        #[arg(long)]
        key: Option<String>,
    },

    /// Start the HTTP server exposing the session API.
    Serve,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => config::load_config(p),
        None => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Extract { file } => {
            let bytes = std::fs::read(&file)?;
            let text = extract_text(&bytes)?;
            println!("Extracted {} characters.", text.chars().count());
            println!();
            println!("{}", text);
        }
        Commands::Chunk { file, show_text } => {
            let bytes = std::fs::read(&file)?;
            let text = extract_text(&bytes)?;
            let fragments = chunk_text(&text, &cfg.chunking);
            println!("Extracted {} characters.", text.chars().count());
            println!("Document split into {} fragments.", fragments.len());
            for f in &fragments {
                if show_text {
                    println!();
                    println!("[fragment {}] ({} chars)", f.index, f.text.chars().count());
                    println!("{}", f.text);
                } else {
                    println!("  fragment {}: {} chars", f.index, f.text.chars().count());
                }
            }
        }
        Commands::Questions => {
            for (i, preset) in cfg.questions.presets.iter().enumerate() {
                println!("{}. {}", i, preset);
            }
        }
        Commands::Ask {
            file,
            question,
            preset,
            key,
        } => {
            let api_key = match key.or_else(|| std::env::var("OPENAI_API_KEY").ok()) {
                Some(k) if !k.trim().is_empty() => k,
                _ => {
                    eprintln!("Warning: no API key supplied; provide --key or set OPENAI_API_KEY.");
                    bail!("missing API key");
                }
            };

            let resolved = QuestionInput::from_parts(question.as_deref(), preset)
                .resolve(&cfg.questions.presets)?;
            let Some(question) = resolved else {
                bail!("no question provided; pass one as an argument or use --preset");
            };

            let embedder = OpenAiEmbedder::new(&cfg.embedding, &api_key)?;
            let generator = OpenAiGenerator::new(&cfg.generation, &api_key)?;

            let mut session = Session::new();
            session.set_api_key(&api_key);

            let bytes = std::fs::read(&file)?;
            let summary = session.load_document(&bytes, &cfg, &embedder).await?;
            println!("Extracted {} characters.", summary.char_count);
            println!("Document split into {} fragments.", summary.fragment_count);

            let outcome = session.ask(&question, &cfg, &embedder, &generator).await?;
            println!();
            println!("Q: {}", question);
            println!();
            println!("{}", outcome.answer);
        }
        Commands::Serve => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "askpdf=info".into()),
                )
                .init();
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
