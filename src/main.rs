//! # docqa CLI (`dqa`)
//!
//! The `dqa` binary uploads documents to a question-answering server and asks
//! it questions.
//!
//! ## Usage
//!
//! ```bash
//! dqa --config ./config/dqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dqa upload <paths>...` | Upload files for ingestion |
//! | `dqa ask "<question>"` | Ask a question and print the answer with references |
//! | `dqa session` | Interactive session with a live document list |
//!
//! Alerts go to stderr, rendered state to stdout. Pass `--json` for one JSON
//! object per line on both streams. Set `RUST_LOG=debug` for request logs.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa::backend::{Backend, HttpBackend};
use docqa::config;
use docqa::error::ClientError;
use docqa::events::{App, Effect, UiEvent};
use docqa::models::FileHandle;
use docqa::notify::NotifyMode;
use docqa::render;
use docqa::session::Session;
use docqa::store::Store;

/// docqa: upload documents to a question-answering server and ask it questions.
#[derive(Parser)]
#[command(name = "dqa", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dqa.toml`. Built-in defaults are used when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/dqa.toml")]
    config: PathBuf,

    /// Emit alerts and results as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files for ingestion.
    ///
    /// Files are sent concurrently. Exits non-zero if any upload fails.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Ask a question.
    ///
    /// Prints the answer followed by its references.
    Ask {
        /// The question text.
        question: String,
    },

    /// Start an interactive session.
    ///
    /// Keeps a document list for the lifetime of the session. Type `help`
    /// at the prompt for commands.
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    let mode = if cli.json {
        NotifyMode::Json
    } else {
        NotifyMode::Human
    };
    let notifier = mode.notifier(cli.yes);
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&cfg)?);

    let mut store = Store::new();
    render::attach_printer(&mut store, mode);
    let store = store.shared();

    let mut app = App::new(backend, store.clone(), notifier.clone());

    match cli.command {
        Commands::Upload { paths } => {
            let total = paths.len();
            let mut failed = 0;
            let mut files = Vec::with_capacity(total);
            for path in &paths {
                match FileHandle::from_path(path).await {
                    Ok(file) => files.push(file),
                    Err(e) => {
                        failed += 1;
                        notifier.alert(&format!("Error: {:#}", e));
                    }
                }
            }
            if let Effect::Uploaded(outcomes) = app.handle(UiEvent::FilesSelected(files)).await {
                failed += outcomes.iter().filter(|o| !o.is_success()).count();
            }
            if failed > 0 {
                bail!("{} of {} uploads failed", failed, total);
            }
        }
        Commands::Ask { question } => {
            app.handle(UiEvent::QuestionEdited(question)).await;
            match app.handle(UiEvent::AskClicked).await {
                Effect::Asked(Ok(outcome)) => {
                    if let Err(e) = outcome.result {
                        bail!("question failed: {}", e);
                    }
                }
                Effect::Asked(Err(ClientError::EmptyQuestion)) => {
                    std::process::exit(2);
                }
                Effect::Asked(Err(e)) => bail!("question failed: {}", e),
                _ => {}
            }
        }
        Commands::Session => {
            let interactive = atty::is(atty::Stream::Stdin);
            let input = std::io::BufReader::new(std::io::stdin());
            let mut out = std::io::stdout();
            let stats = Session::new(&mut app, store.clone(), notifier.as_ref())
                .run(input, &mut out, interactive)
                .await?;
            tracing::info!(
                uploads_ok = stats.uploads_ok,
                uploads_failed = stats.uploads_failed,
                questions = stats.questions,
                removed = stats.removed,
                "session finished"
            );
        }
    }

    Ok(())
}
