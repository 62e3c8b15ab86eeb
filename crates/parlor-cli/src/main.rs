//! parlor - terminal chat client for a single-endpoint chat backend

mod config;
mod ui;

use clap::Parser;
use parlor_chat::{BubbleRenderer, ChatController, ConversationView, Sender};
use parlor_client::HttpBackend;
use parlor_tui::{Theme, widgets::markdown::MARKDOWN_AVAILABLE};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// parlor - chat with a backend from the terminal
#[derive(Parser, Debug)]
#[command(name = "parlor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (default: http://127.0.0.1:5000)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Show replies as plain text instead of Markdown
    #[arg(long)]
    no_markdown: bool,

    /// Use the light color theme
    #[arg(long)]
    light: bool,

    /// Send a single message, print the reply and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Image to send along with --command
    #[arg(long, requires = "command")]
    image: Option<PathBuf>,

    /// Verbose output (debug log written to a file)
    #[arg(short, long)]
    verbose: bool,

    /// Log file for --verbose (default: <data dir>/parlor/parlor.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parlor")
        .join("parlor.log")
}

/// Send tracing output to a file; the terminal belongs to the UI
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("parlor=debug,parlor_client=debug,parlor_chat=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        let path = args.log_file.clone().unwrap_or_else(default_log_path);
        init_logging(&path)?;
        tracing::debug!(path = %path.display(), "logging enabled");
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file
    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let endpoint = args.endpoint.unwrap_or(cfg.endpoint);
    let markdown = cfg.markdown && !args.no_markdown && MARKDOWN_AVAILABLE;
    let theme = if args.light {
        Theme::light()
    } else {
        Theme::by_name(&cfg.theme)
    };

    let backend = match HttpBackend::new(&endpoint) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(chat = %backend.chat_url(), clear = %backend.clear_url(), "backend configured");

    let renderer = BubbleRenderer::new().with_markdown(markdown);

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(backend, renderer, &command, args.image.as_deref()).await;
    }

    // TUI mode
    let mut controller = ChatController::new(backend, ui::TuiSurface::new(), renderer);
    if let Some(welcome) = cfg.welcome_message {
        controller = controller.with_welcome(welcome);
    }
    ui::run_tui(controller, theme, cfg.max_input_lines, endpoint).await
}

async fn run_command(
    backend: Arc<HttpBackend>,
    renderer: BubbleRenderer,
    command: &str,
    image: Option<&Path>,
) -> anyhow::Result<()> {
    let mut view = ConversationView::new();
    view.set_composer(command);
    let mut controller = ChatController::new(backend, view, renderer);

    if let Some(path) = image {
        controller.attach(path).await?;
        println!("parlor> [image: {}]", path.display());
    }
    if !command.trim().is_empty() {
        println!("parlor> {}", command);
    }
    println!();

    if !controller.submit().await {
        anyhow::bail!("nothing to send: pass a message or an image");
    }

    let Some(reply) = controller.surface().last() else {
        return Ok(());
    };
    let text = reply.text().unwrap_or_default();
    if reply.sender == Sender::System {
        eprintln!("{}", text);
        std::process::exit(1);
    }
    println!("{}", text);

    if let Some(len) = controller.history_length() {
        println!("\n[History: {} messages]", len);
    }

    Ok(())
}
