use std::path::PathBuf;
use thiserror::Error;
use xmap_core::MappingError;

/// Failures that stop a whole document (or mapping file) from being processed.
#[derive(Error, Debug)]
pub enum MapperError {
    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("document is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid mapping: {0}")]
    Mapping(#[from] MappingError),
}

impl MapperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapperError::Io {
            path: path.into(),
            source,
        }
    }
}
