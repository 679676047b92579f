//! Evaluates a parsed expression against any `DataSourceNode` tree.

use crate::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use crate::{axes, functions, operators};
use std::fmt;

/// The result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            XPathValue::String(s) => parse_number(s),
            XPathValue::NodeSet(nodes) => nodes
                .first()
                .map(|n| parse_number(&n.string_value()))
                .unwrap_or(f64::NAN),
        }
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    /// The XPath `string()` conversion: a node-set yields its first node's string value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => f.write_str(
                &nodes.first().map(|n| n.string_value()).unwrap_or_default(),
            ),
            XPathValue::String(s) => f.write_str(s),
            XPathValue::Number(n) => f.write_str(&format_number(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Parses the XPath `Number` lexical form; anything else is NaN.
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1
        && digits != ".";
    if valid {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The dynamic context: the context node plus its position in the current node list.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<N> {
    pub node: N,
    /// 1-based.
    pub position: usize,
    pub size: usize,
}

impl<N> EvaluationContext<N> {
    pub fn new(node: N) -> Self {
        Self {
            node,
            position: 1,
            size: 1,
        }
    }
}

pub fn evaluate<'a, N>(
    expr: &Expression,
    ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            Ok(XPathValue::NodeSet(evaluate_location_path(path, ctx)?))
        }
        Expression::FunctionCall { name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, ctx)?);
            }
            functions::call(name, evaluated, ctx)
        }
        Expression::BinaryOp { left, op, right } => match op {
            BinaryOperator::Or => Ok(XPathValue::Boolean(
                evaluate(left, ctx)?.to_bool() || evaluate(right, ctx)?.to_bool(),
            )),
            BinaryOperator::And => Ok(XPathValue::Boolean(
                evaluate(left, ctx)?.to_bool() && evaluate(right, ctx)?.to_bool(),
            )),
            BinaryOperator::Union => {
                let (XPathValue::NodeSet(mut nodes), XPathValue::NodeSet(more)) =
                    (evaluate(left, ctx)?, evaluate(right, ctx)?)
                else {
                    return Err(XPathError::Type(
                        "operands of '|' must be node-sets".to_string(),
                    ));
                };
                nodes.extend(more);
                nodes.sort();
                nodes.dedup();
                Ok(XPathValue::NodeSet(nodes))
            }
            comparison => {
                let left = evaluate(left, ctx)?;
                let right = evaluate(right, ctx)?;
                Ok(XPathValue::Boolean(operators::compare(*comparison, &left, &right)))
            }
        },
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current = if path.is_absolute {
        vec![ctx.node.root()]
    } else {
        vec![ctx.node]
    };
    for step in &path.steps {
        current = evaluate_step(step, &current)?;
        if current.is_empty() {
            break;
        }
    }
    Ok(current)
}

/// Predicates are applied per context node, in axis order; the union is
/// returned in document order.
fn evaluate_step<'a, N>(step: &Step, context_nodes: &[N]) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut results = Vec::new();
    for &node in context_nodes {
        let candidates: Vec<N> = axes::collect(step.axis, node)
            .into_iter()
            .filter(|candidate| matches_node_test(candidate, &step.node_test, step.axis))
            .collect();
        results.extend(apply_predicates(candidates, &step.predicates)?);
    }
    if context_nodes.len() > 1 || step.axis.is_reverse() {
        results.sort();
        results.dedup();
    }
    Ok(results)
}

fn matches_node_test<'a, N>(node: &N, test: &NodeTest, axis: Axis) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    let principal = if axis == Axis::Attribute {
        NodeType::Attribute
    } else {
        NodeType::Element
    };
    match test {
        NodeTest::Wildcard => node.node_type() == principal,
        NodeTest::Name { prefix, local } => {
            node.node_type() == principal
                && node.name().is_some_and(|q| q.local_part == local.as_str())
                && matches_namespace(node, prefix.as_deref(), principal)
        }
        NodeTest::NodeType(NodeTypeTest::Node) => true,
        NodeTest::NodeType(NodeTypeTest::Text) => node.node_type() == NodeType::Text,
        NodeTest::NodeType(NodeTypeTest::Comment) => node.node_type() == NodeType::Comment,
        NodeTest::NodeType(NodeTypeTest::ProcessingInstruction) => {
            node.node_type() == NodeType::ProcessingInstruction
        }
    }
}

// An unprefixed element test matches elements written without a prefix,
// including those in a default namespace. An unprefixed attribute test only
// matches attributes without a namespace.
fn matches_namespace<'a, N>(node: &N, prefix: Option<&str>, principal: NodeType) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    match prefix {
        Some(prefix) => node
            .lookup_namespace(prefix)
            .is_some_and(|uri| node.namespace_uri() == Some(uri)),
        None if principal == NodeType::Attribute => node.namespace_uri().is_none(),
        None => node.name().is_some_and(|q| q.prefix.is_none()),
    }
}

fn apply_predicates<'a, N>(
    mut nodes: Vec<N>,
    predicates: &[Expression],
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    for predicate in predicates {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (index, node) in nodes.into_iter().enumerate() {
            let ctx = EvaluationContext {
                node,
                position: index + 1,
                size,
            };
            let keep = match evaluate(predicate, &ctx)? {
                XPathValue::Number(n) => n == ctx.position as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        nodes = kept;
    }
    Ok(nodes)
}
