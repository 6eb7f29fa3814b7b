//! Command implementations

pub mod info;
pub mod probe;
pub mod run;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Prints `value` as JSON or YAML; tables are printed by each command
fn print_serialized<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize JSON")?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml_ng::to_string(value).context("Failed to serialize YAML")?);
        }
        OutputFormat::Table => {}
    }
    Ok(())
}
