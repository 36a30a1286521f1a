//! oxide-persist CLI
//!
//! Renders INSERT statements for JSON records against a registry of entity
//! schemas.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_persist::{DynamicRecord, SchemaRegistry};

/// Literal SQL INSERT statements from JSON records.
#[derive(Parser)]
#[command(name = "oxide-persist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Entity schema registry (JSON).
    #[arg(short, long, env = "OXIDE_PERSIST_SCHEMA", default_value = "schema.json")]
    schema: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the INSERT statement of a record.
    Insert {
        /// Record file (`{"type": ..., "fields": {...}}`), `-` for stdin.
        #[arg(short, long, default_value = "-")]
        record: PathBuf,
    },

    /// Show registered entities and which fields an INSERT writes.
    Describe {
        /// Entity type to describe (all if not specified).
        #[arg(short, long)]
        entity: Option<String>,
    },
}

fn is_stdin(path: &Path) -> bool {
    path == Path::new("-")
}

/// Stdin can feed only one of the schema and the record.
fn check_inputs(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Insert { record } = &cli.command {
        if is_stdin(&cli.schema) && is_stdin(record) {
            anyhow::bail!("--schema and --record cannot both be read from stdin");
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        Ok(input)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
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

    check_inputs(&cli)?;

    let registry = SchemaRegistry::from_json(&read_input(&cli.schema)?)
        .with_context(|| format!("invalid schema registry {}", cli.schema.display()))?;
    debug!(entities = registry.schemas().count(), "loaded schema registry");

    match cli.command {
        Commands::Insert { record } => {
            let record = DynamicRecord::from_json(&read_input(&record)?)?;
            let builder = registry.insert_builder(&record)?;
            println!("{}", builder.build());
        }

        Commands::Describe { entity } => {
            let schemas: Vec<_> = match entity.as_deref() {
                Some(name) => vec![registry.get(Some(name))?],
                None => registry.schemas().collect(),
            };

            if schemas.is_empty() {
                info!("No entities registered.");
            }

            for schema in schemas {
                println!("\n{} -> {}", schema.type_name(), schema.table_name());
                println!("{:-<60}", "");
                for field in schema.fields() {
                    let status = field
                        .persistence
                        .exclusion_reason()
                        .map_or_else(|| String::from("inserted"), |r| format!("skipped ({r})"));
                    println!(" {:<20} {:<20} {}", field.name, field.column, status);
                }
            }
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_reads_record_from_stdin_by_default() {
        let cli = Cli::try_parse_from(["oxide-persist", "insert"]).unwrap();
        match cli.command {
            Commands::Insert { record } => assert!(is_stdin(&record)),
            Commands::Describe { .. } => panic!("expected insert"),
        }
    }

    #[test]
    fn test_schema_and_record_cannot_share_stdin() {
        let cli = Cli::try_parse_from(["oxide-persist", "--schema", "-", "insert"]).unwrap();
        let err = check_inputs(&cli).unwrap_err();
        assert!(err.to_string().contains("stdin"));

        let cli =
            Cli::try_parse_from(["oxide-persist", "--schema", "-", "insert", "--record", "r.json"])
                .unwrap();
        assert!(check_inputs(&cli).is_ok());

        let cli = Cli::try_parse_from(["oxide-persist", "--schema", "-", "describe"]).unwrap();
        assert!(check_inputs(&cli).is_ok());
    }
}
