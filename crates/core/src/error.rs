use thiserror::Error;
use xmap_xpath::XPathError;

/// Raw text that doesn't fit the declared value type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert '{value}' to {target}")]
pub struct ConversionError {
    pub value: String,
    pub target: &'static str,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("'{0}' is not an integer")]
    InvalidNumber(String),
    #[error("sum exceeds the 64-bit integer range")]
    Overflow,
    #[error("{0}")]
    Custom(String),
}

/// Problems found while building a mapping.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("unknown type '{tag}' for field '{field}'")]
    UnknownType { field: String, tag: String },
    #[error("rule with xpath '{xpath}' has an empty field name")]
    EmptyField { xpath: String },
    #[error("nested field '{field}' has no child rules")]
    EmptyNested { field: String },
    #[error("invalid xpath '{xpath}' for field '{field}': {source}")]
    InvalidXPath {
        field: String,
        xpath: String,
        source: XPathError,
    },
    #[error("invalid mapping definition: {0}")]
    Definition(String),
}

impl From<serde_json::Error> for MappingError {
    fn from(e: serde_json::Error) -> Self {
        MappingError::Definition(e.to_string())
    }
}
