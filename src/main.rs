/*!
 * Ferry CLI
 *
 * Runs one function invocation per process: reads the event JSON, calls the
 * handler, and prints the JSON response on stdout. Logs go to stderr.
 */

use clap::{Parser, Subcommand, ValueEnum};
use ferry::{
    config::{BackendKind, LogFormat, LogLevel, LoggingConfig, ServiceConfig},
    error::{Result, TransferError, EXIT_SUCCESS},
    functions::{FunctionName, TransferService},
    core::WritePolicy,
    logging,
    protocol::http::RemoteFetcher,
    protocol::s3::{BackendFlavor, MemoryObjectStore, DEFAULT_REGION},
};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(version, about = "Move files between HTTP sources and S3 / MinIO buckets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (overrides LOG_LEVEL)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Log line format (overrides LOG_FORMAT)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatArg>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one function with a JSON event
    Invoke {
        #[arg(value_enum)]
        function: FunctionArg,

        /// Event JSON inline
        #[arg(long, conflicts_with = "event_file")]
        event: Option<String>,

        /// Read the event JSON from a file (stdin when neither is given)
        #[arg(long, value_name = "PATH")]
        event_file: Option<PathBuf>,

        #[command(flatten)]
        source: ConfigSource,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },

    /// Validate configuration and print the effective settings
    CheckConfig {
        #[command(flatten)]
        source: ConfigSource,
    },
}

#[derive(clap::Args)]
struct ConfigSource {
    /// Which environment variables configure the backend
    #[arg(long, value_enum, default_value = "s3")]
    backend: BackendArg,

    /// Load configuration from a TOML file instead of the environment
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum FunctionArg {
    FileSaver,
    FileDownloader,
    Gateway,
}

impl From<FunctionArg> for FunctionName {
    fn from(arg: FunctionArg) -> Self {
        match arg {
            FunctionArg::FileSaver => FunctionName::FileSaver,
            FunctionArg::FileDownloader => FunctionName::FileDownloader,
            FunctionArg::Gateway => FunctionName::Gateway,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum BackendArg {
    S3,
    Minio,
    /// In-process store, nothing leaves the machine
    Memory,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogFormatArg {
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // .env may carry LOG_LEVEL / LOG_FORMAT as well as backend settings
    let dotenv_path = dotenvy::dotenv().ok();

    let mut log_config = LoggingConfig::from_lookup(|key| std::env::var(key).ok())?;
    if let Some(level) = cli.log_level {
        log_config.level = level.into();
    }
    if let Some(format) = cli.log_format {
        log_config.format = format.into();
    }
    log_config.verbose = cli.verbose;

    if let Err(e) = logging::init_logging(&log_config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match cli.command {
        Commands::Invoke {
            function,
            event,
            event_file,
            source,
            pretty,
        } => handle_invoke(function.into(), event, event_file.as_deref(), &source, pretty),
        Commands::CheckConfig { source } => handle_check_config(&source),
    }
}

fn handle_invoke(
    function: FunctionName,
    event: Option<String>,
    event_file: Option<&Path>,
    source: &ConfigSource,
    pretty: bool,
) -> Result<()> {
    // Configuration problems take precedence over a bad event
    let config = match source.backend {
        BackendArg::Memory => None,
        _ => Some(load_config(source)?),
    };

    let raw = read_event(event, event_file)?;
    let event: Value = serde_json::from_str(&raw)?;

    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        TransferError::Configuration(format!("Failed to start async runtime: {}", e))
    })?;

    runtime.block_on(async {
        let service = build_service(config.as_ref()).await?;

        match service.invoke(function, event).await {
            Ok(response) => print_json(&response, pretty),
            Err(e) => {
                if e.is_caller_error() {
                    tracing::warn!(function = %function, error = %e, "Rejected invocation");
                } else {
                    tracing::error!(
                        function = %function,
                        error_type = %e.category(),
                        error = %e,
                        "Invocation failed"
                    );
                }
                let body = serde_json::to_value(e.to_response())?;
                print_json(&body, pretty)?;
                Err(e)
            }
        }
    })
}

fn handle_check_config(source: &ConfigSource) -> Result<()> {
    if source.backend == BackendArg::Memory {
        println!("backend: memory (no configuration required)");
        return Ok(());
    }

    let config = load_config(source)?;
    let shown = toml::to_string_pretty(&config.redacted())
        .map_err(|e| TransferError::Configuration(format!("Failed to render config: {}", e)))?;

    println!("{}", shown);
    println!("# flavor = {}", config.storage.flavor());
    Ok(())
}

fn load_config(source: &ConfigSource) -> Result<ServiceConfig> {
    match (&source.config, source.backend) {
        (Some(path), _) => ServiceConfig::from_file(path),
        (None, BackendArg::Minio) => ServiceConfig::from_env(BackendKind::Minio),
        (None, _) => ServiceConfig::from_env(BackendKind::S3),
    }
}

/// `None` selects the in-process dry-run store
async fn build_service(config: Option<&ServiceConfig>) -> Result<TransferService> {
    match config {
        Some(config) => TransferService::from_config(config).await,
        None => {
            let store =
                MemoryObjectStore::new("ferry-dry-run", DEFAULT_REGION, BackendFlavor::Compatible);
            Ok(TransferService::new(
                Arc::new(store),
                RemoteFetcher::new()?,
                WritePolicy::for_flavor(BackendFlavor::Compatible, None),
                DEFAULT_REGION,
            ))
        }
    }
}

fn read_event(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(raw) = inline {
        return Ok(raw);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(path).map_err(|e| {
            TransferError::InvalidRequest(format!(
                "Failed to read event file {}: {}",
                path.display(),
                e
            ))
        });
    }

    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|e| TransferError::InvalidRequest(format!("Failed to read event from stdin: {}", e)))?;
    Ok(raw)
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
