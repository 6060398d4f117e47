use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tldc_core::{Session, SettingsManager};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "tldc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "tldc (too lazy; didn't code) - let a model edit the current directory")]
struct Args {
    /// Working directory the assistant operates in (defaults to the current one)
    #[arg(long, global = true, value_name = "PATH")]
    workdir: Option<PathBuf>,

    /// Settings file (defaults to ~/.tldc/settings.toml)
    #[arg(long = "settings", global = true, value_name = "PATH")]
    settings_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage registered models
    Models {
        #[command(subcommand)]
        command: ModelsCommand,
    },
    /// Read a prompt from stdin and print the answer
    Prompt,
    /// Forget the conversation of the working directory
    Reset,
}

#[derive(Subcommand, Debug)]
enum ModelsCommand {
    /// List registered models
    List,
    /// Register a model
    Add {
        name: String,
        /// ollama or xai
        provider: String,
        /// Provider settings as JSON, e.g. '{"url": "http://127.0.0.1:11434"}'
        settings: String,
    },
    /// Remove a model
    Delete { name: String },
    /// Show the active model
    Get,
    /// Make a registered model the active one
    Set { name: String },
}

fn main() -> ExitCode {
    if let Err(e) = setup_tracing() {
        eprintln!("[error] Failed to initialize tracing: {e:#}");
    }

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    info!(
        "CLI startup: command={:?}, workdir={:?}",
        args.command, args.workdir
    );

    let settings_manager = match args.settings_file {
        Some(path) => SettingsManager::from_path(path)?,
        None => SettingsManager::new()?,
    };

    let workdir = match args.workdir {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    info!(path = ?settings_manager.path(), "Loaded settings");
    let session = Session::open(settings_manager.into_settings(), &workdir).await?;

    match args.command {
        Command::Models { command } => match command {
            ModelsCommand::List => commands::list_models(&session).await,
            ModelsCommand::Add {
                name,
                provider,
                settings,
            } => commands::add_model(&session, &name, &provider, &settings).await,
            ModelsCommand::Delete { name } => commands::delete_model(&session, &name).await,
            ModelsCommand::Get => commands::get_model(&session).await,
            ModelsCommand::Set { name } => commands::set_model(&session, &name).await,
        },
        Command::Prompt => commands::prompt(&session).await,
        Command::Reset => commands::reset(&session).await,
    }
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    let home = dirs::home_dir().context("Failed to get home directory")?;
    let trace_dir = home.join(".tldc").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("tldc.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
