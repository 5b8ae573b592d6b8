//! capreq CLI - check capability requirement expressions.
//!
//! Loads a capabilities document and evaluates requirements such as
//! `superlu & petsc>=3.9` against it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;

use commands::{check::CheckArgs, config as config_cmd, select::SelectArgs};
use config::{Config, OutputFormat};

/// capreq - evaluate capability requirements.
///
/// A capabilities document is a JSON object mapping each capability name to
/// `{ "value": ..., "doc": "..." }`.
#[derive(Parser, Debug)]
#[command(
    name = "capreq",
    author,
    version,
    about = "Check capability requirement expressions",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a requirement and print its state.
    ///
    /// Exits 0 when the requirement was evaluated, 2 when it is malformed.
    /// With --require, exits 1 when the requirement is not fulfilled.
    Check {
        /// Requirement expression, e.g. "petsc & petsc>=3.9".
        requirement: String,

        /// Capabilities document.
        #[arg(short, long)]
        capabilities: Option<PathBuf>,

        /// Extra capabilities merged on top of the document.
        #[arg(long)]
        add: Option<PathBuf>,

        /// Negate a capability before checking (can be specified multiple times).
        #[arg(long)]
        negate: Vec<String>,

        /// The application may register more capabilities at run time.
        #[arg(long)]
        dynamic: bool,

        /// Fail unless the requirement is fulfilled.
        #[arg(long)]
        require: bool,

        /// Output format: text or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Decide whether a test runs when only tests requiring some
    /// capabilities are selected.
    Select {
        /// Requirement expression of the test.
        requirement: String,

        /// Required capability, `name` or `!name` (can be specified multiple times).
        #[arg(long, required = true)]
        only: Vec<String>,

        /// Capabilities document.
        #[arg(short, long)]
        capabilities: Option<PathBuf>,

        /// Extra capabilities for this test.
        #[arg(long)]
        add: Option<PathBuf>,

        /// The application may register more capabilities at run time.
        #[arg(long)]
        dynamic: bool,

        /// Output format: text or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List the capabilities in a document.
    Show {
        /// Capabilities document.
        #[arg(short, long)]
        capabilities: Option<PathBuf>,

        /// Output format: text or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show one capability.
    Query {
        /// Capability name.
        name: String,

        /// Capabilities document.
        #[arg(short, long)]
        capabilities: Option<PathBuf>,

        /// Output format: text or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // The config subcommands must still work on a broken file so it can
    // be reset or overwritten.
    let config = match (&cli.command, Config::load()) {
        (_, Ok(config)) => config,
        (Commands::Config(_), Err(err)) => {
            warn!("Ignoring unreadable configuration: {:#}", err);
            Config::default()
        }
        (_, Err(err)) => return Err(err),
    };

    match cli.command {
        Commands::Check {
            requirement,
            capabilities,
            add,
            negate,
            dynamic,
            require,
            format,
        } => {
            let args = CheckArgs {
                requirement,
                capabilities: capabilities.or_else(|| config.capabilities_file.clone()),
                add,
                negate,
                dynamic: dynamic || config.dynamic,
                require,
                format: resolve_format(format, &config)?,
            };
            return commands::check::execute(args);
        }

        Commands::Select {
            requirement,
            only,
            capabilities,
            add,
            dynamic,
            format,
        } => {
            let args = SelectArgs {
                requirement,
                only,
                capabilities: capabilities.or_else(|| config.capabilities_file.clone()),
                add,
                dynamic: dynamic || config.dynamic,
                format: resolve_format(format, &config)?,
            };
            commands::select::execute(args)?;
        }

        Commands::Show {
            capabilities,
            format,
        } => {
            let capabilities = capabilities.or_else(|| config.capabilities_file.clone());
            commands::show::list(capabilities.as_ref(), resolve_format(format, &config)?)?;
        }

        Commands::Query {
            name,
            capabilities,
            format,
        } => {
            let capabilities = capabilities.or_else(|| config.capabilities_file.clone());
            let found =
                commands::show::query(capabilities.as_ref(), &name, resolve_format(format, &config)?)?;
            if !found {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Config(config_cmd_inner) => {
            let mut config = config;
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    config_cmd::set(&mut config, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// The --format flag, else the configured default.
fn resolve_format(flag: Option<String>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(format) => format.parse(),
        None => Ok(config.format),
    }
}
