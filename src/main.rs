//! snmp-poller - version 0.1.0
//!
//! SNMP polling engine with tracing logging.
//! This is the main entry point that loads configuration and handles subcommands.

use clap::Parser;
use tracing::{info, Level};

use snmp_poller::cli::{Args, Commands, ConfigFormat, LogLevel};
use snmp_poller::commands::{command_check, command_config, command_run};
use snmp_poller::config::{load_config, validate_config, Config, Instance};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => Level::ERROR,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", args.log_level);
}

/// Prints the effective configuration in the requested format.
fn show_config(config: &Config, format: &ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    println!("{}", content);
    Ok(())
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if no instance validates.
fn load_validated_config(args: &Args) -> Result<(Config, Vec<Instance>), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let validated = validate_config(&config);

    for error in &validated.errors {
        eprintln!("❌ Configuration error: {}", error);
    }
    if validated.instances.is_empty() && !validated.errors.is_empty() {
        eprintln!("❌ No valid instances configured");
        std::process::exit(1);
    }

    Ok((config, validated.instances))
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = load_config(args.config.as_deref())?;

        if args.check_config {
            let validated = validate_config(&config);
            if !validated.errors.is_empty() {
                for error in &validated.errors {
                    eprintln!("❌ Configuration invalid: {}", error);
                }
                std::process::exit(1);
            }
            println!(
                "✅ Configuration is valid ({} instances)",
                validated.instances.len()
            );
            return Ok(());
        }

        return show_config(&config, &args.config_format);
    }

    setup_logging(&args);

    // The config command doesn't need a loaded configuration
    if let Some(Commands::Config {
        output,
        format,
        commented,
    }) = &args.command
    {
        return command_config(output.clone(), format.clone(), *commented);
    }

    let (config, instances) = load_validated_config(&args)?;

    match &args.command {
        Some(Commands::Check { instance, verbose }) => {
            command_check(instance.clone(), *verbose, &config, &instances).await
        }
        Some(Commands::Run { interval }) => command_run(*interval, &config, &instances).await,
        Some(Commands::Config { .. }) => unreachable!("Config handled above"),
        // Default mode: poll continuously, like `run`
        None => command_run(None, &config, &instances).await,
    }
}
