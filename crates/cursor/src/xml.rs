// Cursor adapter over a roxmltree-indexed document
use crate::cursor::{BindingId, Cursor, Match, MatchKind};
use xmap_xpath::{
    CompiledXPath, DataSourceNode, NodeType, XPathError, XPathValue, XmlDocument, XmlNode,
};

enum Selection<'a, 'input> {
    Nodes(Vec<XmlNode<'a, 'input>>),
    Atomic(String),
}

struct ActiveBinding<'a, 'input> {
    anchor: XmlNode<'a, 'input>,
    selection: Selection<'a, 'input>,
    next: usize,
    generation: u64,
}

/// A cursor over one indexed document.
///
/// Each bind evaluates its expression once, at the current position, and
/// keeps the resulting node-set on a stack. Advancing moves the position to
/// the next node of the innermost binding. Ids of released bindings stay
/// stale even when a later binding reuses their depth.
pub struct XmlCursor<'a, 'input: 'a> {
    position: XmlNode<'a, 'input>,
    stack: Vec<ActiveBinding<'a, 'input>>,
    generation: u64,
}

impl<'a, 'input: 'a> XmlCursor<'a, 'input> {
    /// A cursor positioned at the document's root element.
    pub fn new(doc: &'a XmlDocument<'input>) -> Self {
        Self::at(doc.root_element())
    }

    pub fn at(position: XmlNode<'a, 'input>) -> Self {
        Self {
            position,
            stack: Vec::new(),
            generation: 0,
        }
    }

    pub fn position(&self) -> XmlNode<'a, 'input> {
        self.position
    }

    fn active(&self, id: BindingId) -> Option<&ActiveBinding<'a, 'input>> {
        self.stack
            .get(id.index())
            .filter(|binding| binding.generation == id.generation())
    }

    fn is_innermost(&self, id: BindingId) -> bool {
        id.index() + 1 == self.stack.len() && self.active(id).is_some()
    }
}

fn kind_of<'a, 'input: 'a>(node: &XmlNode<'a, 'input>) -> MatchKind {
    match node.node_type() {
        NodeType::Element => MatchKind::Element,
        NodeType::Attribute => MatchKind::Attribute,
        NodeType::Text => MatchKind::Text,
        _ => MatchKind::Other,
    }
}

impl<'a, 'input: 'a> Cursor for XmlCursor<'a, 'input> {
    fn bind(&mut self, xpath: &CompiledXPath) -> Result<BindingId, XPathError> {
        let selection = match xpath.evaluate(self.position)? {
            XPathValue::NodeSet(nodes) => Selection::Nodes(nodes),
            other => Selection::Atomic(other.to_string()),
        };
        self.generation += 1;
        self.stack.push(ActiveBinding {
            anchor: self.position,
            selection,
            next: 0,
            generation: self.generation,
        });
        Ok(BindingId::new(self.stack.len() - 1, self.generation))
    }

    fn advance(&mut self, id: BindingId) -> Option<Match> {
        if !self.is_innermost(id) {
            log::debug!("advance on {:?} ignored: not the innermost binding", id);
            return None;
        }
        let binding = self.stack.last_mut()?;
        let Selection::Nodes(nodes) = &binding.selection else {
            return None;
        };
        let node = *nodes.get(binding.next)?;
        let ordinal = binding.next;
        binding.next += 1;
        self.position = node;
        Some(Match {
            kind: kind_of(&node),
            ordinal,
        })
    }

    fn reset(&mut self, id: BindingId) {
        if !self.is_innermost(id) {
            return;
        }
        if let Some(binding) = self.stack.last_mut() {
            binding.next = 0;
            self.position = binding.anchor;
        }
    }

    fn release(&mut self, id: BindingId) {
        if self.active(id).is_none() {
            log::debug!("release of {:?} ignored: not active", id);
            return;
        }
        if id.index() + 1 != self.stack.len() {
            log::warn!(
                "releasing {:?} with {} inner binding(s) still open",
                id,
                self.stack.len() - id.index() - 1
            );
        }
        self.position = self.stack[id.index()].anchor;
        self.stack.truncate(id.index());
    }

    fn string_value(&self, id: BindingId) -> String {
        match self.active(id).map(|binding| &binding.selection) {
            Some(Selection::Nodes(nodes)) => nodes
                .first()
                .map(|node| node.string_value())
                .unwrap_or_default(),
            Some(Selection::Atomic(value)) => value.clone(),
            None => String::new(),
        }
    }

    fn attribute_name(&self, matched: &Match) -> Option<String> {
        if !matched.is_attribute() {
            return None;
        }
        self.position.attribute_name()
    }

    fn attribute_value(&self, name: &str) -> Option<String> {
        if self.position.is_attribute() && self.position.attribute_name().as_deref() == Some(name) {
            return self.position.content_text().map(str::to_string);
        }
        self.position.attribute(name).map(str::to_string)
    }

    fn text(&self) -> Option<String> {
        self.position.content_text().map(str::to_string)
    }

    fn active_bindings(&self) -> usize {
        self.stack.len()
    }
}
