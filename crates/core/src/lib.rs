//! # xmap-core
//!
//! The recursive mapping engine. A [`Mapping`] is a tree of [`Rule`]s, each
//! binding an output field to an XPath expression. [`Engine::evaluate`] walks
//! a [`Cursor`] through the document and produces a [`Record`] together with
//! the [`Diagnostic`]s of every rule that failed along the way.
//!
//! ```
//! use xmap_core::{MappingBuilder, Value, ValueType};
//! use xmap_cursor::XmlCursor;
//! use xmap_xpath::XmlDocument;
//!
//! let mapping = MappingBuilder::new()
//!     .scalar("college_id", "@id", ValueType::Integer)
//!     .field("staff_id_sum", "staff/@id", "sum")
//!     .build()
//!     .unwrap();
//!
//! let xml = r#"<college id="123"><staff id="101"/><staff id="102"/></college>"#;
//! let doc = XmlDocument::parse(xml).unwrap();
//! let result = mapping.evaluate(&mut XmlCursor::new(&doc));
//! assert_eq!(result.record["college_id"], Value::Integer(123));
//! assert_eq!(result.record["staff_id_sum"], Value::Integer(203));
//! ```

pub mod config;
pub mod definition;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod rule;
pub mod types;
pub mod value;

pub use config::{CollapsePolicy, EngineConfig};
pub use definition::{FieldDefinition, MappingDefinition};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use engine::{Engine, Evaluation};
pub use error::{ConversionError, ExtractionError, MappingError};
pub use extractor::{Extractor, ExtractorRegistry};
pub use rule::{Mapping, MappingBuilder, Rule, RuleKind};
pub use types::ValueType;
pub use value::{Record, Value};

pub use xmap_cursor::{Binding, Cursor};
