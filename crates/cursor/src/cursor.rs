use xmap_xpath::{CompiledXPath, XPathError};

/// Identifies one active binding on a cursor.
///
/// `index` is the binding's depth on the cursor's stack. `generation` tells
/// apart bindings opened at the same depth over the cursor's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId {
    index: usize,
    generation: u64,
}

impl BindingId {
    pub fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Element,
    Attribute,
    Text,
    Other,
}

/// A handle to the node a binding advanced onto.
///
/// `ordinal` is the match's zero-based position within its binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub kind: MatchKind,
    pub ordinal: usize,
}

impl Match {
    pub fn is_attribute(&self) -> bool {
        self.kind == MatchKind::Attribute
    }
}

/// The navigation capability consumed by the mapping engine.
///
/// Bindings nest: a binding opened while another is active must be released
/// first. Calls with an id that is no longer active are ignored.
pub trait Cursor {
    /// Evaluates `xpath` against the current position and opens a binding
    /// over its matches.
    fn bind(&mut self, xpath: &CompiledXPath) -> Result<BindingId, XPathError>;

    /// Moves onto the next match, or returns `None` once they run out.
    fn advance(&mut self, id: BindingId) -> Option<Match>;

    /// Returns to the binding's anchor and rewinds it to its first match.
    fn reset(&mut self, id: BindingId);

    /// Closes the binding and restores the position it was opened at.
    fn release(&mut self, id: BindingId);

    /// XPath `string()` of the bound expression at the binding's anchor.
    fn string_value(&self, id: BindingId) -> String;

    /// Name of the attribute a match refers to. `None` for other matches.
    fn attribute_name(&self, matched: &Match) -> Option<String>;

    /// Value of the named attribute on the element at the current position.
    fn attribute_value(&self, name: &str) -> Option<String>;

    /// Text content at the current position, if there is any.
    fn text(&self) -> Option<String>;

    fn active_bindings(&self) -> usize;
}
