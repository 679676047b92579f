//! XPath 1.0 comparison semantics, including the existential node-set rules.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::engine::{XPathValue, parse_number};

pub fn compare<'a, N>(op: BinaryOperator, left: &XPathValue<N>, right: &XPathValue<N>) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    match (left, right) {
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => l.iter().any(|a| {
            let a = XPathValue::<N>::String(a.string_value());
            r.iter()
                .any(|b| compare_atomic(op, &a, &XPathValue::String(b.string_value())))
        }),
        (XPathValue::NodeSet(nodes), XPathValue::Boolean(_)) => {
            compare_atomic(op, &XPathValue::Boolean(!nodes.is_empty()), right)
        }
        (XPathValue::Boolean(_), XPathValue::NodeSet(nodes)) => {
            compare_atomic(op, left, &XPathValue::Boolean(!nodes.is_empty()))
        }
        (XPathValue::NodeSet(nodes), other) => nodes
            .iter()
            .any(|n| compare_atomic(op, &atomize(n, other), other)),
        (other, XPathValue::NodeSet(nodes)) => nodes
            .iter()
            .any(|n| compare_atomic(op, other, &atomize(n, other))),
        _ => compare_atomic(op, left, right),
    }
}

/// Converts a node to the type of the value it is compared with.
fn atomize<'a, N: DataSourceNode<'a>>(node: &N, other: &XPathValue<N>) -> XPathValue<N> {
    match other {
        XPathValue::Number(_) => XPathValue::Number(parse_number(&node.string_value())),
        _ => XPathValue::String(node.string_value()),
    }
}

fn compare_atomic<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let negate = op == BinaryOperator::NotEquals;
            let equal_bools = |a: bool, b: bool| (a == b) != negate;
            match (left, right) {
                (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
                    equal_bools(left.to_bool(), right.to_bool())
                }
                (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
                    let (a, b) = (left.to_number(), right.to_number());
                    if negate { a != b } else { a == b }
                }
                _ => (left.to_string() == right.to_string()) != negate,
            }
        }
        BinaryOperator::LessThan => left.to_number() < right.to_number(),
        BinaryOperator::LessThanOrEqual => left.to_number() <= right.to_number(),
        BinaryOperator::GreaterThan => left.to_number() > right.to_number(),
        BinaryOperator::GreaterThanOrEqual => left.to_number() >= right.to_number(),
        BinaryOperator::Or | BinaryOperator::And | BinaryOperator::Union => false,
    }
}
