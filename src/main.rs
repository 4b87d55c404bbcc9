use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use ecofin_chat::app::App;
use ecofin_chat::{
    handler, logging, tui, ui, ChatClient, ChatLog, Config, HttpTransport, InputBuffer, SendOutcome,
};

#[derive(Parser)]
#[command(name = "ecofin-chat")]
#[command(author, version, about = "Chat with the Ecofin news assistant", long_about = None)]
struct Cli {
    /// Base URL of the chat server (overrides config and ECOFIN_CHAT_URL)
    #[arg(short, long, global = true)]
    server_url: Option<String>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Send one message and print the conversation
    Send {
        message: String,
    },
    /// Show the effective configuration, or update it
    Config {
        /// Error text shown when a request fails
        #[arg(long)]
        error_message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let log_path = logging::init_file(cli.verbose)?;
            let config = Config::load_from(&config_path)?;
            let server_url = cli.server_url.unwrap_or_else(|| config.server_url());
            info!(server = %server_url, log = %log_path.display(), "starting chat");
            run_tui(build_client(&config, &server_url), server_url).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Send { message } => {
            logging::init_stderr(cli.verbose);
            let config = Config::load_from(&config_path)?;
            let server_url = cli.server_url.unwrap_or_else(|| config.server_url());
            send_once(build_client(&config, &server_url), &message).await
        }
        Commands::Config { error_message } => {
            logging::init_stderr(cli.verbose);
            let mut config = Config::load_from(&config_path)?;
            if cli.server_url.is_some() || error_message.is_some() {
                if let Some(url) = cli.server_url {
                    config.server_url = Some(url);
                }
                if let Some(text) = error_message {
                    config.error_message = Some(text);
                }
                config.save_to(&config_path)?;
                info!(path = %config_path.display(), "config saved");
            }
            println!("config file:   {}", config_path.display());
            println!("server url:    {}", config.server_url());
            println!("error message: {}", config.error_message());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_client(config: &Config, server_url: &str) -> ChatClient {
    ChatClient::new(Arc::new(HttpTransport::new(server_url)))
        .with_error_text(config.error_message())
}

async fn send_once(client: ChatClient, message: &str) -> Result<ExitCode> {
    let input = InputBuffer::with_text(message);
    let log = ChatLog::new();

    let outcome = client.send_message(&input, &log).await;
    for msg in log.messages() {
        println!("{}", msg);
    }

    Ok(match outcome {
        SendOutcome::Failed => ExitCode::FAILURE,
        SendOutcome::Answered | SendOutcome::Skipped => ExitCode::SUCCESS,
    })
}

async fn run_tui(client: ChatClient, server_url: String) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client, server_url);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }
        }
        anyhow::Ok(())
    }
    .await;

    app.shutdown().await;
    tui::restore()?;
    result
}
