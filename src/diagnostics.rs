// Per-table summary of the raw inputs: row counts, missing cells, inferred
// column types and distinct values.

use crate::types::RawTable;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub comment: &'static str,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub length: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub missing_count: usize,
    pub data_type: &'static str,
    pub unique_count: usize,
}

pub fn analyze<'a>(tables: impl IntoIterator<Item = &'a RawTable>) -> Analysis {
    Analysis {
        comment: "Brief analysis of missing values, data types and data counts of each table",
        tables: tables.into_iter().map(summarize_table).collect(),
    }
}

pub fn summarize_table(table: &RawTable) -> TableSummary {
    let records = &table.data;
    let columns = records
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<Option<&str>> = records.column(idx).collect();
            let present: Vec<&str> = cells.iter().flatten().copied().collect();
            let unique: HashSet<&str> = present.iter().copied().collect();
            ColumnSummary {
                column_name: name.to_string(),
                description: table.description.describe(name).map(str::to_string),
                missing_count: cells.len() - present.len(),
                data_type: infer_type(&present, present.len() < cells.len()),
                unique_count: unique.len(),
            }
        })
        .collect();
    TableSummary {
        name: table.name.clone(),
        length: records.len(),
        columns,
    }
}

/// Column type the way a dataframe reader would see it: integers become
/// floats once a value is missing, anything non-numeric is `object`.
fn infer_type(present: &[&str], has_missing: bool) -> &'static str {
    if present.is_empty() {
        return "float64";
    }
    if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        return if has_missing { "float64" } else { "int64" };
    }
    if present.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
        return "float64";
    }
    "object"
}
