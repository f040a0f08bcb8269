// Run configuration.
//
// The input layout is a fixed external contract: four tables plus the field
// dictionary, each with its own delimiter and text encoding. Everything the
// user can change lives in `PipelineConfig`, which is built once in `main`
// and passed down explicitly.

use encoding_rs::{Encoding, WINDOWS_1252};
use std::path::PathBuf;

/// Where and how one input table is read.
#[derive(Debug, Clone, Copy)]
pub struct TableSource {
    pub name: &'static str,
    pub file_name: &'static str,
    pub delimiter: u8,
    /// WHATWG encoding label; `latin1` resolves to windows-1252.
    pub encoding_label: &'static str,
}

impl TableSource {
    pub fn encoding(&self) -> &'static Encoding {
        Encoding::for_label(self.encoding_label.as_bytes()).unwrap_or(WINDOWS_1252)
    }
}

pub const ORDERS: TableSource = TableSource {
    name: "orders",
    file_name: "orders.csv",
    delimiter: b';',
    encoding_label: "cp1252",
};

pub const ORDER_DETAILS: TableSource = TableSource {
    name: "order_details",
    file_name: "order_details.csv",
    delimiter: b';',
    encoding_label: "cp1252",
};

pub const PIZZAS: TableSource = TableSource {
    name: "pizzas",
    file_name: "pizzas.csv",
    delimiter: b',',
    encoding_label: "latin1",
};

pub const PIZZA_TYPES: TableSource = TableSource {
    name: "pizza_types",
    file_name: "pizza_types.csv",
    delimiter: b',',
    encoding_label: "latin1",
};

pub const DICTIONARY: TableSource = TableSource {
    name: "data_dictionary",
    file_name: "data_dictionary.csv",
    delimiter: b',',
    encoding_label: "latin1",
};

/// Console rendering knobs for the table previews.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    /// Maximum rows shown per preview; the rest is elided.
    pub max_rows: usize,
    /// Maximum category columns shown for wide (pivoted) tables.
    pub max_columns: usize,
    /// Decimal places for floating point cells.
    pub precision: usize,
    pub enabled: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            max_rows: 15,
            max_columns: 5,
            precision: 3,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub display: DisplayOptions,
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            display: DisplayOptions::default(),
        }
    }

    pub fn input_path(&self, source: &TableSource) -> PathBuf {
        self.data_dir.join(source.file_name)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sources_resolve_their_encodings() {
        for source in [ORDERS, ORDER_DETAILS, PIZZAS, PIZZA_TYPES, DICTIONARY] {
            assert_eq!(source.encoding(), WINDOWS_1252, "{}", source.name);
        }
        assert_eq!(ORDERS.delimiter, b';');
        assert_eq!(PIZZAS.delimiter, b',');
    }

    #[test]
    fn paths_join_the_configured_dirs() {
        let cfg = PipelineConfig::new("in", "out");
        assert_eq!(cfg.input_path(&ORDERS), PathBuf::from("in/orders.csv"));
        assert_eq!(cfg.output_path("x.csv"), PathBuf::from("out/x.csv"));
    }
}
