use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StandaloneError {
    // Config errors
    #[error("CONFIG_READ_ERROR: failed to read {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CONFIG_INVALID: failed to parse {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // Catalog errors
    #[error("VARIANT_UNKNOWN: variant '{name}' is not in the catalog (known: {known})")]
    VariantUnknown { name: String, known: String },

    // Layout errors
    #[error("LAYOUT_UNRESOLVED: {0}")]
    LayoutUnresolved(String),

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StandaloneError>;
