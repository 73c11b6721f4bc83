//! CLI command implementations
//!
//! Saved stores are opened with objects decoded as plain JSON values, so any
//! store written with the JSON codec can be inspected without its Rust type.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::column::FilterValue;
use crate::config::SlicerConfig;
use crate::observability::{Logger, Severity};
use crate::schema::Schema;
use crate::slicer::Slicer;
use crate::storage::layout::SCHEMA_DIR;
use crate::storage::JsonCodec;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_cli(Cli::parse_args())
}

/// Run a parsed command line
pub fn run_cli(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;

    let severity = match &cli.log_level {
        Some(level) => level
            .parse::<Severity>()
            .map_err(CliError::invalid_argument)?,
        None => config
            .severity()
            .map_err(|e| CliError::config_error(e.message()))?,
    };
    Logger::set_min_severity(severity);

    run_command(cli.command, config)
}

/// Run the appropriate command
pub fn run_command(cmd: Command, config: SlicerConfig) -> CliResult<()> {
    match cmd {
        Command::Inspect {
            dir,
            filters,
            no_objects,
            only,
        } => {
            let data = inspect(&dir, &filters, !no_objects, only, config)?;
            write_response(data)
        }
        Command::Schema { dir } => write_response(schema(&dir)?),
    }
}

/// Returns the records of a saved store matching `filters`
pub fn inspect(
    dir: &Path,
    filters: &[String],
    with_objects: bool,
    only: bool,
    config: SlicerConfig,
) -> CliResult<Value> {
    let properties = filters
        .iter()
        .map(|f| parse_filter(f))
        .collect::<CliResult<Vec<_>>>()?;

    let codec = JsonCodec::with_file_name(config.object_file.clone());
    let store: Arc<Slicer<Value>> = Slicer::open_with(dir, &codec, config)?;
    let slice = store.get(properties);

    if only {
        slice.only()?;
    }
    let records = slice.serialize(with_objects)?;

    Ok(json!({
        "count": records.len(),
        "next_id": store.next_id(),
        "records": serde_json::to_value(&records)?,
    }))
}

/// Returns the column domains of a saved store
pub fn schema(dir: &Path) -> CliResult<Value> {
    let schema: Schema<Value> = Schema::open(&dir.join(SCHEMA_DIR))?;

    let mut columns = Map::new();
    for (name, col) in schema.columns_by_name() {
        columns.insert(name, serde_json::to_value(col.domain())?);
    }
    Ok(json!({ "columns": Value::Object(columns) }))
}

/// Splits `column=value`. The value is JSON if it parses, else a string.
pub fn parse_filter(raw: &str) -> CliResult<(String, FilterValue)> {
    let (column, value) = raw.split_once('=').ok_or_else(|| {
        CliError::invalid_argument(format!("Expected COLUMN=VALUE, got '{}'", raw))
    })?;
    let column = column.trim();
    if column.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "Missing column name in '{}'",
            raw
        )));
    }

    let value = serde_json::from_str::<Value>(value)
        .unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((column.to_string(), FilterValue::Scalar(value)))
}

fn load_config(path: Option<&Path>) -> CliResult<SlicerConfig> {
    match path {
        Some(path) => SlicerConfig::load(path).map_err(|e| CliError::config_error(e.message())),
        None => Ok(SlicerConfig::default()),
    }
}
