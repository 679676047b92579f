//! # xmap
//!
//! Maps XML documents to nested records with declarative XPath rules.
//!
//! - **xpath**: compiled XPath expressions over an indexed document
//! - **cursor**: the navigation capability the engine drives
//! - **core**: rules, the recursive engine, extractors and diagnostics
//!
//! [`XmlMapper`] ties them together: it loads and indexes documents and runs
//! a shared [`Mapping`] over each of them.

pub mod error;
pub mod mapper;

pub use xmap_core as core;
pub use xmap_cursor as cursor;
pub use xmap_xpath as xpath;

pub use error::MapperError;
pub use mapper::XmlMapper;
pub use xmap_core::{
    CollapsePolicy, Diagnostic, DiagnosticKind, EngineConfig, Evaluation, Extractor,
    ExtractorRegistry, Mapping, MappingBuilder, MappingDefinition, Record, Rule, Severity, Value,
    ValueType,
};
