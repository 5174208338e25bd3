//! tagsql CLI
//!
//! Prints the SQL generated for a record described in a JSON file.

mod record;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use tagsql_core::{DefaultSqlGenerator, GenerateError, GeneratorConfig, SqlGenerator};

use crate::record::JsonRecord;

/// Generate list, fetch, insert, update and delete SQL for a record.
#[derive(Parser)]
#[command(name = "tagsql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Generator configuration file (JSON).
    #[arg(long, env = "TAGSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// SELECT every row, filtered and sorted by free-form conditions.
    List {
        /// Record description file.
        record: PathBuf,

        /// Filter (`age = 30`) or sort (`created_at DESC`) fragment.
        #[arg(short = 'c', long = "condition")]
        conditions: Vec<String>,
    },

    /// SELECT the record by its primary key.
    Find {
        /// Record description file.
        record: PathBuf,
    },

    /// INSERT the record.
    Save {
        /// Record description file.
        record: PathBuf,
    },

    /// UPDATE the record by its primary key.
    Update {
        /// Record description file.
        record: PathBuf,
    },

    /// DELETE the record by its primary key.
    Delete {
        /// Record description file.
        record: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GeneratorConfig::default(),
    };
    let generator = DefaultSqlGenerator::with_config(config);

    let sql = run(&generator, &cli.command)?;
    println!("{sql}");
    Ok(())
}

fn run<G: SqlGenerator>(generator: &G, command: &Commands) -> anyhow::Result<String> {
    let sql = match command {
        Commands::List { record, conditions } => {
            let info = load_record(record)?
                .type_info()
                .map_err(|e| GenerateError::metadata("get record type info failed", e))?;
            let conditions: Vec<&str> = conditions.iter().map(String::as_str).collect();
            generator.list_sql(&info, &conditions)?
        }
        Commands::Find { record } => generator.find_by_id_sql(&value_info(record)?)?,
        Commands::Save { record } => generator.save_sql(&value_info(record)?)?,
        Commands::Update { record } => generator.update_by_id_sql(&value_info(record)?)?,
        Commands::Delete { record } => generator.delete_by_id_sql(&value_info(record)?)?,
    };
    Ok(sql)
}

fn load_config(path: &Path) -> anyhow::Result<GeneratorConfig> {
    debug!("Loading generator config from {}", path.display());
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GeneratorConfig::from_json_str(&json)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn load_record(path: &Path) -> anyhow::Result<JsonRecord> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record {}", path.display()))?;
    JsonRecord::from_json_str(&json).with_context(|| format!("invalid record {}", path.display()))
}

fn value_info(path: &Path) -> anyhow::Result<tagsql_core::ValueInfo> {
    let info = load_record(path)?
        .value_info()
        .map_err(|e| GenerateError::metadata("get record value info failed", e))?;
    Ok(info)
}
