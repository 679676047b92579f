use crate::ast::{Axis, Expression};
use crate::datasource::DataSourceNode;
use crate::engine::{EvaluationContext, XPathValue, evaluate};
use crate::error::XPathError;
use crate::parser::parse_expression;
use std::fmt;
use std::str::FromStr;

/// What the final step of an expression selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Attribute,
    Node,
}

/// An expression parsed once and re-evaluated against any number of
/// context nodes and documents. It holds no reference to a document.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledXPath {
    source: String,
    expr: Expression,
    target: Target,
}

impl CompiledXPath {
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let expr = parse_expression(source)?;
        let target = match expr.final_step() {
            Some(step) if step.axis == Axis::Attribute => Target::Attribute,
            _ => Target::Node,
        };
        Ok(Self {
            source: source.to_string(),
            expr,
            target,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expr
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn targets_attribute(&self) -> bool {
        self.target == Target::Attribute
    }

    pub fn evaluate<'a, N>(&self, context: N) -> Result<XPathValue<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        evaluate(&self.expr, &EvaluationContext::new(context))
    }

    /// Evaluates to a node-set in document order. Expressions producing
    /// strings, numbers or booleans select nothing.
    pub fn select<'a, N>(&self, context: N) -> Result<Vec<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        match self.evaluate(context)? {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            _ => Ok(Vec::new()),
        }
    }

    pub fn evaluate_string<'a, N>(&self, context: N) -> Result<String, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        Ok(self.evaluate(context)?.to_string())
    }
}

impl FromStr for CompiledXPath {
    type Err = XPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for CompiledXPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::xml::XmlDocument;

    #[test]
    fn test_target_detection() {
        assert!(CompiledXPath::compile("@id").unwrap().targets_attribute());
        assert!(CompiledXPath::compile("staff[1]/@dep_name").unwrap().targets_attribute());
        assert!(CompiledXPath::compile("staff/attribute::id").unwrap().targets_attribute());
        assert_eq!(CompiledXPath::compile("staff[@id]").unwrap().target(), Target::Node);
        assert_eq!(CompiledXPath::compile("a[b/@x]/c").unwrap().target(), Target::Node);
    }

    #[test]
    fn test_reuse_across_documents() {
        let xpath: CompiledXPath = "item/@n".parse().unwrap();
        let first = XmlDocument::parse(r#"<r><item n="1"/></r>"#).unwrap();
        let second = XmlDocument::parse(r#"<r><item n="2"/><item n="3"/></r>"#).unwrap();

        assert_eq!(xpath.select(first.root_element()).unwrap().len(), 1);
        assert_eq!(xpath.select(second.root_element()).unwrap().len(), 2);
        assert_eq!(xpath.evaluate_string(second.root_element()).unwrap(), "2");
        assert_eq!(xpath.to_string(), "item/@n");
    }

    #[test]
    fn test_non_node_set_selects_nothing() {
        let doc = XmlDocument::parse("<r><a/><a/></r>").unwrap();
        let xpath = CompiledXPath::compile("count(a)").unwrap();
        assert!(xpath.select(doc.root_element()).unwrap().is_empty());
        assert_eq!(xpath.evaluate_string(doc.root_element()).unwrap(), "2");
    }
}
