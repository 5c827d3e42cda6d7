//! KPI table export to JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use contracts::{columns, EventKind};
use kpi_engine::KpiTable;
use serde_json::{json, Map, Value};

use crate::error::CliError;

/// `<feature>_kpi.json`
pub fn kpi_file_name(kind: EventKind) -> String {
    format!("{}_kpi.json", kind.as_str())
}

/// Rows as objects keyed by display name, ascending by vehicle speed
pub fn table_to_json(kind: EventKind, table: &KpiTable) -> Value {
    let headers = table.display_names();
    let rows: Vec<Value> = table
        .rows_sorted_by(columns::VEH_SPD)
        .into_iter()
        .filter_map(|i| table.row(i))
        .map(|row| {
            let mut object = Map::with_capacity(headers.len() + 1);
            object.insert("label".to_string(), Value::String(row.label.to_string()));
            for (header, value) in headers.iter().zip(row.values) {
                // NaN serializes as null
                let value = serde_json::to_value(value).unwrap_or(Value::Null);
                object.insert(header.clone(), value);
            }
            Value::Object(object)
        })
        .collect();

    json!({
        "feature": kind.as_str(),
        "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "columns": headers,
        "rows": rows,
    })
}

/// Write the finalized table to `<out_dir>/<feature>_kpi.json`
pub fn export_table(kind: EventKind, table: &KpiTable, out_dir: &Path) -> Result<PathBuf, CliError> {
    let path = out_dir.join(kpi_file_name(kind));
    let document = table_to_json(kind, table);

    let file = File::create(&path).map_err(|e| CliError::export(kind.as_str(), e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)
        .map_err(|e| CliError::export(kind.as_str(), e.to_string()))?;
    writer
        .flush()
        .map_err(|e| CliError::export(kind.as_str(), e.to_string()))?;
    Ok(path)
}
