use anyhow::Result;
use clap::{Parser, Subcommand};
use plugin_typescript::config::{UserConfig, IGNORE_LOCAL_CONFIG};
use plugin_typescript::host::{BundleMetadata, BundleUnit, CliFlags, EventBus, HostContext, InputType};
use plugin_typescript::plugin::{on_load, PluginLoader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// TypeScript input provider for capability-bus bundling hosts
///
/// Runs the provider inside a minimal in-process host and prints what it
/// would hand back to a bundler.
#[derive(Parser, Debug)]
#[command(name = "plugin-typescript")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the bundler runs from
    ///
    /// Defaults to the config file's `workspace_root`, then the current directory.
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Log to file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the TypeScript transform for the workspace and print it
    Resolve {
        /// Ignore local TypeScript configuration and use the built-in default
        #[arg(long)]
        ignore_local_config: bool,
    },

    /// Print the config-loader extension for a module name
    Loader {
        module_name: String,
    },

    /// Print provider identity, capabilities and flags
    Info,
}

fn setup_logging(log_level: &str, log_file: Option<PathBuf>) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)?;
        subscriber.with_writer(file).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    Ok(())
}

fn detect_workspace_root(provided: Option<PathBuf>) -> Result<PathBuf> {
    match provided {
        Some(path) => Ok(path.canonicalize()?),
        None => Ok(std::env::current_dir()?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let user_config = UserConfig::load()?.unwrap_or_default();
    let settings = user_config.settings;

    let log_level = args
        .log_level
        .or(settings.log_level)
        .unwrap_or_else(|| "info".to_string());
    setup_logging(&log_level, args.log_file)?;

    info!("Starting plugin-typescript v{}", env!("CARGO_PKG_VERSION"));

    let workspace_root = detect_workspace_root(args.workspace.or(settings.workspace_root))?;
    info!("Workspace root: {}", workspace_root.display());

    let bus = Arc::new(EventBus::new());
    let ctx = HostContext::new(bus.clone(), workspace_root).with_run_id("cli");
    let registration = on_load(&ctx)?;

    let output = match args.command {
        Command::Resolve {
            ignore_local_config,
        } => {
            let ignore = ignore_local_config || settings.ignore_local_config.unwrap_or(false);
            let bundle = BundleMetadata {
                cli_flags: CliFlags::new().with(IGNORE_LOCAL_CONFIG, ignore),
            };

            let stage = bus
                .trigger_input_plugin(&bundle, &BundleUnit::new(InputType::Typescript))
                .await?;
            serde_json::to_value(stage)?
        }
        Command::Loader { module_name } => {
            let extensions = bus
                .trigger_config_loader(serde_json::Value::String(module_name))
                .await?;
            serde_json::Value::Array(extensions.iter().map(|ext| ext.describe()).collect())
        }
        Command::Info => serde_json::json!({
            "registration": registration,
            "flags": PluginLoader::flags(),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
