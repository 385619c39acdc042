//! Planning Schema CLI
//!
//! Resolves modules, generates schemas and validates submissions against a
//! record bundle.

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use planning_schemas::{
    generate_example, RecordBundle, RecordStore, SchemaBuilder, SpecConfig, SpecError, Validator,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planning-schema")]
#[command(about = "Generate and validate planning application schemas")]
struct Cli {
    /// Config file (defaults to planning-spec.toml lookups)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record bundle, overriding the configured store path
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the modules an application type uses
    Modules {
        application_type: String,
        /// Resolve as of this date (YYYY-MM-DD) instead of currently active joins
        #[arg(long)]
        on: Option<String>,
    },

    /// Print the generated schema for an application type
    Schema {
        application_type: String,
        /// Print only the schema fingerprint
        #[arg(long)]
        checksum: bool,
    },

    /// Validate a JSON payload against an application type's schema
    Validate {
        application_type: String,
        payload: PathBuf,
    },

    /// Print a sample payload that satisfies the schema
    Example { application_type: String },

    /// Search application types, modules and fields
    Search { query: String },

    /// Report references that do not resolve
    Check,

    /// Show the effective configuration
    Config {
        /// Write the configuration to this path
        #[arg(long)]
        init: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the command ran but found problems
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = SpecConfig::load_from(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store.path = store;
    }

    if let Commands::Config { init } = &cli.command {
        match init {
            Some(path) => {
                config.save(path)?;
                println!("✅ Configuration written to {:?}", path);
            }
            None => println!("{}", toml::to_string_pretty(&config)?),
        }
        return Ok(true);
    }

    let store_path = config.store_path();
    let bundle = RecordBundle::from_path(&store_path)
        .with_context(|| format!("loading record bundle {:?}", store_path))?;
    let store = RecordStore::from_bundle(bundle)?;
    let builder = SchemaBuilder::new(&store).with_dialect(&config.schema.dialect);
    let format = config.output.format;

    match cli.command {
        Commands::Modules { application_type, on } => {
            require_type(&store, &application_type)?;
            let modules = match on {
                Some(day) => {
                    let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                        .map_err(|_| SpecError::InvalidDate(day.clone()))?;
                    store.resolve_modules_on(&application_type, date)
                }
                None => store.resolve_modules(&application_type),
            };

            println!("📦 {} - {} module(s)", application_type, modules.len());
            for module in modules {
                match &module.replaced_by {
                    Some(successor) => println!("  {} ({}) -> replaced by {}", module.reference, module.name, successor),
                    None => println!("  {} ({})", module.reference, module.name),
                }
            }
            Ok(true)
        }

        Commands::Schema { application_type, checksum } => {
            let schema = builder
                .schema_for(&application_type)
                .ok_or_else(|| SpecError::ApplicationTypeNotFound(application_type.clone()))?;
            if checksum {
                println!("{}", schema.checksum());
            } else {
                println!("{}", format.render(&schema)?);
            }
            Ok(true)
        }

        Commands::Validate { application_type, payload } => {
            let schema = builder
                .schema_for(&application_type)
                .ok_or_else(|| SpecError::ApplicationTypeNotFound(application_type.clone()))?;
            let content = std::fs::read_to_string(&payload)
                .with_context(|| format!("reading payload {:?}", payload))?;
            let data: serde_json::Value = serde_json::from_str(&content)?;

            let report = Validator::new(config.validation.validator_options()).validate(&data, &schema);
            info!(valid = report.is_valid(), errors = report.violations.len(), "Validated payload");
            println!("{}", format.render(&report)?);
            Ok(report.is_valid())
        }

        Commands::Example { application_type } => {
            let schema = builder
                .schema_for(&application_type)
                .ok_or_else(|| SpecError::ApplicationTypeNotFound(application_type.clone()))?;
            println!("{}", format.render(&generate_example(&schema))?);
            Ok(true)
        }

        Commands::Search { query } => {
            let results = store.search(&query);
            if results.is_empty() {
                println!("No matches for {:?}", query);
            }
            for result in results {
                println!("{:>6.1}  {:<12} {}  {}", result.score, format!("{:?}", result.kind), result.path, result.name);
            }
            Ok(true)
        }

        Commands::Check => {
            let dangling = store.integrity_report();
            if dangling.is_empty() {
                println!("✅ All references resolve");
                return Ok(true);
            }
            println!("❌ {} dangling reference(s):", dangling.len());
            for d in &dangling {
                println!("  └─ {} -> {} {:?}", d.source, d.expected, d.reference);
            }
            Ok(false)
        }

        Commands::Config { .. } => bail!("config handled above"),
    }
}

fn require_type(store: &RecordStore, reference: &str) -> Result<(), SpecError> {
    match store.application_type(reference) {
        Some(_) => Ok(()),
        None => Err(SpecError::ApplicationTypeNotFound(reference.to_string())),
    }
}
