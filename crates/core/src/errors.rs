use std::path::PathBuf;

use thiserror::Error;

use crate::domain::product::{ProductCode, ProductId};

/// Everything a catalog operation can fail with. A failed mutation never
/// partially writes the data file and never advances the id counter.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("missing required fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },
    #[error("a product with code {code} already exists")]
    DuplicateCode { code: ProductCode },
    #[error("product with id {id} not found")]
    NotFound { id: ProductId },
    #[error("could not access catalog file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog file `{path}` is not a valid product array: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Format { path: path.into(), source }
    }

    /// True for the caller-fault outcomes that leave storage untouched, as
    /// opposed to I/O and parse failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::DuplicateCode { .. } | Self::NotFound { .. })
    }
}
