//! Node collection along each XPath axis.
//!
//! Every collector returns nodes in proximity order: document order for
//! forward axes, nearest-first for reverse axes. Positional predicates rely on it.

use crate::ast::Axis;
use crate::datasource::{DataSourceNode, NodeType};

pub fn collect<'a, N: DataSourceNode<'a> + 'a>(axis: Axis, node: N) -> Vec<N> {
    match axis {
        Axis::Child => node.children().collect(),
        Axis::Attribute => node.attributes().collect(),
        Axis::SelfAxis => vec![node],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Descendant => descendants(node),
        Axis::DescendantOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(descendants(node));
            nodes
        }
        Axis::Ancestor => ancestors(node),
        Axis::AncestorOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(ancestors(node));
            nodes
        }
        Axis::FollowingSibling => following_siblings(node),
        Axis::PrecedingSibling => preceding_siblings(node),
        Axis::Following => following(node),
        Axis::Preceding => preceding(node),
    }
}

/// Pre-order walk of the subtree below `node`, excluding attributes.
fn descendants<'a, N: DataSourceNode<'a> + 'a>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        results.push(current);
        let mut children: Vec<N> = current.children().collect();
        children.reverse();
        stack.extend(children);
    }
    results
}

fn ancestors<'a, N: DataSourceNode<'a> + 'a>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        results.push(parent);
        current = parent.parent();
    }
    results
}

fn siblings<'a, N: DataSourceNode<'a> + 'a>(node: N) -> Option<(Vec<N>, usize)> {
    // Attributes have an owner but are not its children, so they have no siblings.
    if node.node_type() == NodeType::Attribute {
        return None;
    }
    let parent = node.parent()?;
    let all: Vec<N> = parent.children().collect();
    let index = all.iter().position(|&sibling| sibling == node)?;
    Some((all, index))
}

fn following_siblings<'a, N: DataSourceNode<'a> + 'a>(node: N) -> Vec<N> {
    siblings(node)
        .map(|(all, index)| all[index + 1..].to_vec())
        .unwrap_or_default()
}

fn preceding_siblings<'a, N: DataSourceNode<'a> + 'a>(node: N) -> Vec<N> {
    siblings(node)
        .map(|(all, index)| all[..index].iter().rev().copied().collect())
        .unwrap_or_default()
}

fn following<'a, N: DataSourceNode<'a> + 'a>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    let mut current = node;
    if node.node_type() == NodeType::Attribute {
        if let Some(owner) = node.parent() {
            results.extend(descendants(owner));
            current = owner;
        }
    }
    loop {
        for sibling in following_siblings(current) {
            results.push(sibling);
            results.extend(descendants(sibling));
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    results
}

fn preceding<'a, N: DataSourceNode<'a> + 'a>(node: N) -> Vec<N> {
    let anchor = if node.node_type() == NodeType::Attribute {
        node.parent().unwrap_or(node)
    } else {
        node
    };
    let excluded = ancestors(anchor);
    let mut results: Vec<N> = descendants(node.root())
        .into_iter()
        .take_while(|&n| n != anchor)
        .filter(|n| !excluded.contains(n))
        .collect();
    results.reverse();
    results
}
