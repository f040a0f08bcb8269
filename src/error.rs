// Error types for the pipeline.
//
// Structural problems (missing files, dangling foreign keys) are fatal and
// abort the run. Recoverable per-cell problems never reach this type: the
// cleaner turns them into missing values and fills them.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input file missing, undecodable, or malformed.
    #[error("failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// An ordered item identifier has no entry in the price table.
    #[error("no price entry for item `{0}`")]
    PriceLookup(String),

    /// A base item type has no entry in the ingredient catalog.
    #[error("item type `{0}` is not in the ingredient catalog")]
    UnknownItemType(String),

    /// Every value of a column is missing, so positional fill has nothing to copy.
    #[error("column `{column}` of table `{table}` has no usable values")]
    EmptyColumn { table: String, column: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
