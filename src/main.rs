use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use jsonlog::config::{self, DirectoryPolicy, LoggerConfig};
use jsonlog::{Context, Logger, Message};

/// Append one JSON-lines entry to a log file, rotating it when oversized
#[derive(Debug, Parser)]
#[command(name = "jsonlog", version)]
struct Args {
    /// Config file (defaults to ~/.jsonlog/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log directory, overrides the config file
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Rotation threshold in bytes, overrides the config file
    #[arg(long)]
    max_size: Option<u64>,

    /// Create the log directory if it does not exist
    #[arg(long)]
    create_dir: bool,

    /// Context object as JSON, e.g. '{"user_id":42}'
    #[arg(long)]
    context: Option<String>,

    /// Client origin recorded in the `ip` field
    #[arg(long)]
    ip: Option<String>,

    /// Target file name inside the log directory
    file: String,

    /// Entry category, e.g. "auth"
    category: String,

    /// Message text; a JSON object is logged as a structured message
    message: String,
}

fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<jsonlog::Error>() {
                Some(log_err) => eprintln!("jsonlog: {} error: {:#}", log_err.kind(), err),
                None => eprintln!("jsonlog: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(config::config_file_path);
    let mut config = LoggerConfig::load_from(&config_path)?;

    if let Some(dir) = args.dir {
        config.log_dir = Some(dir);
    }
    if let Some(max) = args.max_size {
        config.max_file_size = max;
    }
    if args.create_dir {
        config.directory_policy = DirectoryPolicy::CreateMissing;
    }
    if args.ip.is_some() {
        config.track_client_origin = true;
    }

    let context = args
        .context
        .as_deref()
        .map(parse_context)
        .transpose()?;

    let logger = Logger::new(config);
    logger.log(
        &args.file,
        &args.category,
        parse_message(args.message),
        context.as_ref(),
        args.ip.as_deref(),
    )?;

    Ok(())
}

fn parse_context(raw: &str) -> Result<Context> {
    serde_json::from_str(raw).context("--context must be a JSON object")
}

fn parse_message(raw: String) -> Message {
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value @ serde_json::Value::Object(_)) => Message::Structured(value),
        _ => Message::Text(raw),
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jsonlog=warn".into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}
