// Weekly sales report pipeline for a pizza retailer.
//
// Raw order tables are loaded, repaired, assembled into one row per order
// and pivoted into weekly pizza and ingredient counts, from which a naive
// next-week ingredient estimate is derived. The resulting tables are the
// inputs of the spreadsheet and PDF renderers.
pub mod assembler;
pub mod cleaner;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ingredients;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod predictor;
pub mod reports;
pub mod types;
pub mod util;
pub mod weekly;

pub use error::{Error, Result};
