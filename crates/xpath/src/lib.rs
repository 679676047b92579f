//! An XPath 1.0 location-path evaluator for read-only, indexed node trees.
//!
//! Expressions are compiled once into a [`CompiledXPath`] and evaluated
//! against any node type implementing [`DataSourceNode`]. The [`xml`] module
//! provides that implementation for documents indexed with `roxmltree`.
//!
//! The supported language covers location paths on every axis, abbreviated
//! steps, predicates, comparisons, `and`/`or`, unions, and the core node-set,
//! string, boolean and number functions. Arithmetic operators and variables are
//! not supported.

pub mod ast;
pub mod axes;
pub mod compiled;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use compiled::{CompiledXPath, Target};
pub use datasource::xml::{self, XmlDocument, XmlNode};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, XPathValue, evaluate};
pub use error::XPathError;
pub use parser::parse_expression;
