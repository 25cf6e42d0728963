//! ask-chat: terminal front end for the chat widget.
//! Reads config, then either answers one question given on the command line
//! or reads questions from stdin, one per line, printing the transcript as
//! it grows.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use ask_chat::{
    config, AskBackend, ChatWidget, Config, HttpBackend, KeyEvent, MemoryView, TerminalView,
    WidgetOptions,
};
use clap::Parser;
use futures_util::{stream, Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ask-chat", version, about = "Ask questions to a /ask endpoint")]
struct Cli {
    /// Config file (default: ~/.ask-chat/config.yaml).
    #[arg(long, env = "ASK_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL; overrides `server.base_url`.
    #[arg(long, env = "ASK_CHAT_URL")]
    url: Option<String>,

    /// Ask this question once and exit instead of reading stdin.
    question: Vec<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    // An explicit path must exist; the default one is optional.
    if let Some(path) = &cli.config {
        return config::load(path)
            .map_err(|e| format!("failed to load config from {}: {}", path.display(), e));
    }
    match config::default_config_path() {
        Some(path) => config::load_or_default(&path)
            .map_err(|e| format!("failed to load config from {}: {}", path.display(), e)),
        None => Ok(Config::default()),
    }
}

/// Each stdin line is typed into the input field and submitted with Enter.
fn stdin_events() -> impl Stream<Item = KeyEvent> {
    let lines = BufReader::new(tokio::io::stdin()).lines();
    stream::unfold(lines, |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((line, lines)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading stdin");
                None
            }
        }
    })
    .flat_map(|line| {
        let keys: Vec<KeyEvent> = line
            .chars()
            .map(KeyEvent::Char)
            .chain(std::iter::once(KeyEvent::Enter))
            .collect();
        stream::iter(keys)
    })
}

async fn ask_once(backend: Arc<dyn AskBackend>, options: WidgetOptions, question: &str) -> ExitCode {
    let mut widget = match ChatWidget::initialize(MemoryView::new(), backend, options) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = widget.submit_question(question) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match widget.next_reply().await {
        Some(entry) if !entry.is_error() => {
            println!("{}", entry.text());
            ExitCode::SUCCESS
        }
        Some(entry) => {
            eprintln!("Error: {}", entry.text());
            ExitCode::FAILURE
        }
        None => {
            eprintln!("Error: no reply");
            ExitCode::FAILURE
        }
    }
}

async fn interactive(backend: Arc<dyn AskBackend>, options: WidgetOptions) -> ExitCode {
    let view = TerminalView::new(io::stdout());
    let mut widget = match ChatWidget::initialize(view, backend, options) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    widget.run(stdin_events()).await;
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let cfg = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let base_url = cli.url.clone().unwrap_or_else(|| cfg.base_url().to_string());
    let backend: Arc<dyn AskBackend> = match HttpBackend::with_timeout(&base_url, cfg.timeout()) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let options = cfg.widget_options();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(async {
        if cli.question.is_empty() {
            interactive(backend, options).await
        } else {
            ask_once(backend, options, &cli.question.join(" ")).await
        }
    })
}
