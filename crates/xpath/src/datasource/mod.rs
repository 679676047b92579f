//! The navigable, read-only tree abstraction the evaluator runs against.
use std::hash::Hash;

pub mod xml;

/// A qualified name, consisting of an optional prefix and a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

impl std::fmt::Display for QName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_part),
            None => f.write_str(self.local_part),
        }
    }
}

/// The type of a node, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// A node in a read-only, indexed document.
///
/// Nodes are cheap handles into the index (`Copy`), and their `Ord` is
/// document order. `'a` is the lifetime of the index.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// `None` for text, comment and root nodes. A processing instruction is named by its target.
    fn name(&self) -> Option<QName<'a>>;

    /// The XPath `string()` value of the node: the concatenated descendant text
    /// for elements and the root, the value for attributes, the content otherwise.
    fn string_value(&self) -> String;

    /// The namespace URI of an element or attribute name.
    fn namespace_uri(&self) -> Option<&'a str> {
        None
    }

    /// Resolves `prefix` against the namespaces in scope at this node.
    fn lookup_namespace(&self, _prefix: &str) -> Option<&'a str> {
        None
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn parent(&self) -> Option<Self>;

    /// Walks up to the root of the tree this node belongs to.
    fn root(&self) -> Self {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}
