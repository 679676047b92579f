// XML document index backed by roxmltree
use super::{DataSourceNode, NodeType, QName};
use roxmltree::{Document, Node, ParsingOptions};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A parsed, read-only document. Parsing builds a flat arena of nodes, which
/// is all the indexing the evaluator needs.
pub struct XmlDocument<'input> {
    doc: Document<'input>,
}

impl<'input> XmlDocument<'input> {
    /// Parses `text`. A document type declaration is accepted and its
    /// internal entities are expanded.
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options)?;
        Ok(Self { doc })
    }

    /// The document node (the parent of the root element).
    pub fn root_node(&self) -> XmlNode<'_, 'input> {
        XmlNode::Node(self.doc.root())
    }

    pub fn root_element(&self) -> XmlNode<'_, 'input> {
        XmlNode::Node(self.doc.root_element())
    }

    pub fn node_count(&self) -> usize {
        self.doc.descendants().count()
    }
}

/// A handle to a tree node or to one attribute of an element.
///
/// roxmltree stores attributes as data on elements, so an attribute is
/// addressed by its owner element and its index.
#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a, 'input> {
    Node(Node<'a, 'input>),
    Attribute { owner: Node<'a, 'input>, index: usize },
}

impl<'a, 'input> XmlNode<'a, 'input> {
    /// The element an attribute belongs to, or the node itself.
    pub fn element(&self) -> Node<'a, 'input> {
        match self {
            XmlNode::Node(node) => *node,
            XmlNode::Attribute { owner, .. } => *owner,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, XmlNode::Attribute { .. })
    }

    /// The attribute's qualified name, `prefix:local` when it has a namespace.
    pub fn attribute_name(&self) -> Option<String> {
        match self {
            XmlNode::Attribute { owner, index } => owner.attributes().nth(*index).map(|attr| {
                match attr.namespace().and_then(|uri| attribute_prefix(*owner, uri)) {
                    Some(prefix) => format!("{}:{}", prefix, attr.name()),
                    None => attr.name().to_string(),
                }
            }),
            XmlNode::Node(_) => None,
        }
    }

    /// Looks up an attribute of the element, or of an attribute's owner.
    ///
    /// `prefix:local` names are resolved through the namespaces in scope. A
    /// plain name only matches an attribute without a namespace.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        let owner = self.element();
        match name.split_once(':') {
            Some((prefix, local)) => {
                let uri = self.resolve_prefix(prefix)?;
                owner.attribute((uri, local))
            }
            None => owner
                .attributes()
                .find(|attr| attr.namespace().is_none() && attr.name() == name)
                .map(|attr| attr.value()),
        }
    }

    fn resolve_prefix(&self, prefix: &str) -> Option<&'a str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.element().lookup_namespace_uri(Some(prefix))
    }

    /// The text content anchored at this node.
    ///
    /// For an element this is its first text child that is not whitespace
    /// only; an element without one has no content fragment. A text node
    /// yields its own content.
    pub fn content_text(&self) -> Option<&'a str> {
        match self {
            XmlNode::Node(node) if node.is_text() => node.text(),
            XmlNode::Node(node) if node.is_element() => node
                .children()
                .filter(|child| child.is_text())
                .filter_map(|child| child.text())
                .find(|text| !text.trim().is_empty()),
            XmlNode::Attribute { owner, index } => {
                owner.attributes().nth(*index).map(|attr| attr.value())
            }
            XmlNode::Node(_) => None,
        }
    }

    fn namespace(&self) -> Option<&'a str> {
        match self {
            XmlNode::Node(node) if node.is_element() => node.tag_name().namespace(),
            XmlNode::Node(_) => None,
            XmlNode::Attribute { owner, index } => {
                owner.attributes().nth(*index).and_then(|attr| attr.namespace())
            }
        }
    }

    fn order_key(&self) -> (usize, usize) {
        match self {
            XmlNode::Node(node) => (node.id().get_usize(), 0),
            XmlNode::Attribute { owner, index } => (owner.id().get_usize(), index + 1),
        }
    }
}

// Attributes only carry a namespace through a prefix, so the default
// namespace never names one.
fn attribute_prefix<'a, 'input: 'a>(owner: Node<'a, 'input>, uri: &str) -> Option<&'a str> {
    if uri == XML_NAMESPACE {
        return Some("xml");
    }
    owner
        .namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
}

impl PartialEq for XmlNode<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for XmlNode<'_, '_> {}

impl PartialOrd for XmlNode<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Node ids follow document order; attributes sort right after their owner.
impl Ord for XmlNode<'_, '_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for XmlNode<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

impl<'a, 'input: 'a> DataSourceNode<'a> for XmlNode<'a, 'input> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Attribute { .. } => NodeType::Attribute,
            XmlNode::Node(node) if node.is_root() => NodeType::Root,
            XmlNode::Node(node) if node.is_text() => NodeType::Text,
            XmlNode::Node(node) if node.is_comment() => NodeType::Comment,
            XmlNode::Node(node) if node.is_pi() => NodeType::ProcessingInstruction,
            XmlNode::Node(_) => NodeType::Element,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Node(node) if node.is_element() => Some(QName {
                prefix: node
                    .tag_name()
                    .namespace()
                    .and_then(|uri| node.lookup_prefix(uri)),
                local_part: node.tag_name().name(),
            }),
            XmlNode::Node(node) if node.is_pi() => node.pi().map(|pi| QName {
                prefix: None,
                local_part: pi.target,
            }),
            XmlNode::Node(_) => None,
            XmlNode::Attribute { owner, index } => {
                owner.attributes().nth(*index).map(|attr| QName {
                    prefix: attr.namespace().and_then(|uri| attribute_prefix(*owner, uri)),
                    local_part: attr.name(),
                })
            }
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Node(node) if node.is_element() || node.is_root() => node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect(),
            XmlNode::Node(node) if node.is_pi() => node
                .pi()
                .and_then(|pi| pi.value)
                .unwrap_or_default()
                .to_string(),
            XmlNode::Node(node) => node.text().unwrap_or_default().to_string(),
            XmlNode::Attribute { .. } => self.content_text().unwrap_or_default().to_string(),
        }
    }

    fn namespace_uri(&self) -> Option<&'a str> {
        self.namespace()
    }

    fn lookup_namespace(&self, prefix: &str) -> Option<&'a str> {
        self.resolve_prefix(prefix)
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(node) if node.is_element() => {
                let owner = *node;
                let count = node.attributes().len();
                Box::new((0..count).map(move |index| XmlNode::Attribute { owner, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(node) => Box::new(node.children().map(XmlNode::Node)),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Node(node) => node.parent().map(XmlNode::Node),
            XmlNode::Attribute { owner, .. } => Some(XmlNode::Node(*owner)),
        }
    }
}
