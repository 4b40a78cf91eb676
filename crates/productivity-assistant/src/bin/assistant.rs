use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use productivity_assistant::chat::PDF_MEDIA_TYPE;
use productivity_assistant::{
    AssistantConfig, DocumentUpload, GeminiGateway, JsonFileStore, MessageRole,
    ResponseOrchestrator, TurnOutcome,
};

/// Personal productivity assistant
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file (defaults plus environment overrides when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User id whose data is used
    #[arg(long, global = true, default_value = "default")]
    user: String,

    /// Display name used in replies (defaults to the user id)
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message, or start an interactive session when none is given
    Chat { text: Option<String> },
    /// Analyze a PDF document
    Analyze { file: PathBuf },
    /// Show the conversation transcript
    History,
    /// Delete the conversation transcript
    Clear,
    /// Store the Gemini API key for this user (empty clears it)
    SetKey { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AssistantConfig::from_file(path).map_err(anyhow::Error::msg)?,
        None => AssistantConfig::from_env(),
    };
    config.validate().map_err(anyhow::Error::msg)?;

    let store = Arc::new(
        JsonFileStore::new(config.data_dir.clone())
            .with_context(|| format!("cannot open data dir {}", config.data_dir.display()))?,
    );
    let gateway = Arc::new(GeminiGateway::new(&config.gemini)?);
    let mut orchestrator = ResponseOrchestrator::new(&config, store, gateway);

    let user = args.user.as_str();
    let name = args.name.clone().unwrap_or_else(|| args.user.clone());

    match args.command {
        Command::Chat { text: Some(text) } => {
            if let Some(outcome) = orchestrator.send_message(user, &name, &text).await {
                print_reply(&outcome);
            }
        }
        Command::Chat { text: None } => interactive(&mut orchestrator, user, &name).await?,
        Command::Analyze { file } => {
            let bytes = std::fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let media_type = match file.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
                _ => "application/octet-stream",
            };
            let upload = DocumentUpload::new(file_name, media_type, bytes)?;
            let outcome = orchestrator.analyze_document(user, &name, upload).await;
            print_reply(&outcome);
        }
        Command::History => {
            for message in orchestrator.history(user, &name)? {
                let who = match message.role {
                    MessageRole::User => "Kamu",
                    MessageRole::Assistant => "Asisten",
                };
                println!(
                    "[{}] {}: {}\n",
                    message.timestamp.with_timezone(&chrono::Local).format("%d/%m %H:%M"),
                    who,
                    message.content
                );
            }
        }
        Command::Clear => {
            orchestrator.clear_history(user)?;
            println!("Riwayat percakapan dihapus.");
        }
        Command::SetKey { key } => {
            orchestrator.settings().set_api_key(user, &key)?;
            if key.trim().is_empty() {
                println!("API key dihapus.");
            } else {
                println!("API key disimpan.");
            }
        }
    }

    Ok(())
}

async fn interactive(orchestrator: &mut ResponseOrchestrator, user: &str, name: &str) -> Result<()> {
    for message in orchestrator.history(user, name)?.iter().rev().take(1) {
        println!("{}\n", message.content);
    }

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if matches!(line, "exit" | "keluar") {
            break;
        }
        if let Some(outcome) = orchestrator.send_message(user, name, line).await {
            print_reply(&outcome);
        }
    }
    Ok(())
}

fn print_reply(outcome: &TurnOutcome) {
    println!("{}\n", outcome.assistant_message.content);
}
