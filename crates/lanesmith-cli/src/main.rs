#![allow(clippy::doc_markdown)]
//! `lanesmith` - generator driver and dispatch inspector.
//!
//! Renders the per-microarchitecture routine listings and the descriptor
//! manifest, and reports what the runtime dispatcher selects on this CPU.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lanesmith_core::codegen::BackendKind;
use lanesmith_core::GeneratorConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Lanesmith - software-pipelined SIMD kernels with runtime dispatch
#[derive(Parser, Debug)]
#[command(name = "lanesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./lanesmith.toml when present)
    #[arg(short, long, global = true, env = "LANESMITH_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the detected CPU: vendor, microarchitecture and capabilities
    Cpu {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List every kernel with the implementation selected on this CPU
    Kernels {
        /// Only kernels whose identity contains this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one kernel's descriptor table and how it resolves
    Resolve {
        /// Kernel identity, e.g. Core_Add_V32fV32f_V32f
        identity: String,

        /// Resolve for a CPU with no optional capabilities
        #[arg(long)]
        baseline: bool,
    },

    /// Print one kernel's routine for one target
    Schedule {
        /// Kernel identity
        identity: String,

        /// Target microarchitecture, e.g. Haswell
        #[arg(short, long, default_value = "Haswell")]
        target: String,

        /// Listing backend
        #[arg(short, long, default_value = "portable")]
        backend: BackendKind,
    },

    /// Write listings and the manifest for the configured targets
    Generate {
        /// Output directory (overrides the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target microarchitectures (overrides the configuration)
        #[arg(short, long, value_delimiter = ',')]
        target: Vec<String>,

        /// Backends (overrides the configuration)
        #[arg(short, long, value_delimiter = ',')]
        backend: Vec<BackendKind>,

        /// Skip manifest.json
        #[arg(long)]
        no_manifest: bool,
    },

    /// Configuration file helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a starter lanesmith.toml with every default spelled out
    Init {
        /// Destination file
        #[arg(default_value = lanesmith_core::config::CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration after all layers
    Show,
}

fn init_tracing(cli: &Cli, config: Option<&GeneratorConfig>) {
    let fallback = if cli.verbose {
        "debug".to_string()
    } else {
        config.map_or_else(|| "info".to_string(), |c| c.logging.filter.clone())
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // Logs go to stderr so that JSON on stdout stays parseable.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config init` must work even when the existing file is broken.
    let loaded = match &cli.command {
        Commands::Config(ConfigCommand::Init { .. }) => None,
        _ => Some(
            GeneratorConfig::load(cli.config.as_deref())
                .context("failed to load configuration")?,
        ),
    };
    init_tracing(&cli, loaded.as_ref());
    let config = loaded.unwrap_or_default();

    match cli.command {
        Commands::Cpu { json } => commands::cpu(json),
        Commands::Kernels { filter, json } => commands::kernels(filter.as_deref(), json),
        Commands::Resolve { identity, baseline } => commands::resolve(&identity, baseline),
        Commands::Schedule {
            identity,
            target,
            backend,
        } => commands::schedule(&identity, &target, backend),
        Commands::Generate {
            output,
            target,
            backend,
            no_manifest,
        } => {
            let mut config = config;
            if let Some(output) = output {
                config.output_dir = output;
            }
            if !target.is_empty() {
                config.targets = target;
            }
            if !backend.is_empty() {
                config.backends = backend;
            }
            if no_manifest {
                config.manifest = false;
            }
            commands::generate(config)
        }
        Commands::Config(ConfigCommand::Init { path, force }) => commands::config_init(&path, force),
        Commands::Config(ConfigCommand::Show) => commands::config_show(&config),
    }
}
