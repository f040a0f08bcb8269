// Record loading: the four sales tables and the field dictionary, each
// read with its fixed delimiter and encoding.
use crate::config::{self, PipelineConfig, TableSource};
use crate::error::{Error, Result};
use crate::types::{Described, FieldDictionary, RawTable, Records};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Cell texts read as missing, on top of the empty string.
const NA_TOKENS: &[&str] = &["NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL", "None"];

/// The four raw tables and the field dictionary.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub dictionary: FieldDictionary,
    pub orders: RawTable,
    pub order_details: RawTable,
    pub pizzas: RawTable,
    pub pizza_types: RawTable,
}

impl Dataset {
    pub fn tables(&self) -> [&RawTable; 4] {
        [&self.orders, &self.order_details, &self.pizzas, &self.pizza_types]
    }
}

#[derive(Debug, Deserialize)]
struct DictionaryRow {
    #[serde(rename = "Field")]
    field: String,
    #[serde(rename = "Description", default)]
    description: String,
}

pub fn load_dataset(cfg: &PipelineConfig) -> Result<Dataset> {
    let dictionary = load_dictionary(&cfg.input_path(&config::DICTIONARY))?;
    info!("loaded data dictionary ({} fields)", dictionary.len());

    let load = |source: &TableSource| -> Result<RawTable> {
        let records = read_records(&cfg.input_path(source), source)?;
        let description = dictionary.restricted_to(records.headers.iter());
        info!(
            table = source.name,
            rows = records.len(),
            columns = records.headers.len(),
            "loaded table"
        );
        Ok(Described::new(source.name, description, records))
    };

    Ok(Dataset {
        orders: load(&config::ORDERS)?,
        order_details: load(&config::ORDER_DETAILS)?,
        pizzas: load(&config::PIZZAS)?,
        pizza_types: load(&config::PIZZA_TYPES)?,
        dictionary,
    })
}

pub fn load_dictionary(path: &Path) -> Result<FieldDictionary> {
    let records = read_records(path, &config::DICTIONARY)?;
    let mut dictionary = FieldDictionary::default();
    for row in records.deserialize::<DictionaryRow>()? {
        dictionary.insert(row.field.trim(), row.description.trim());
    }
    Ok(dictionary)
}

/// Read one delimited file with the source's fixed delimiter and encoding.
///
/// Every row must have as many fields as the header.
pub fn read_records(path: &Path, source: &TableSource) -> Result<Records> {
    if !path.is_file() {
        return Err(Error::load(path, "file not found"));
    }
    let bytes = std::fs::read(path).map_err(|e| Error::load(path, e))?;
    let (text, used, had_errors) = source.encoding().decode(&bytes);
    if had_errors {
        return Err(Error::load(
            path,
            format!("content is not valid {}", used.name()),
        ));
    }
    debug!(path = %path.display(), encoding = used.name(), "decoded input");

    let mut rdr = ReaderBuilder::new()
        .delimiter(source.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: StringRecord = rdr
        .headers()
        .map_err(|e| Error::load(path, e))?
        .iter()
        .map(str::trim)
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| Error::load(path, e))?;
        rows.push(normalize_missing(&record));
    }

    Ok(Records {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn normalize_missing(record: &StringRecord) -> StringRecord {
    record
        .iter()
        .map(|cell| if NA_TOKENS.contains(&cell.trim()) { "" } else { cell })
        .collect()
}
