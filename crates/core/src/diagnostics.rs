use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The rule's expression failed to compile or evaluate.
    XPath,
    /// A custom extractor failed.
    Extraction,
    /// Several matches where the collapse policy expects one.
    AmbiguousMatch,
    /// Matched text didn't convert to the declared type.
    Conversion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A problem with one rule. The field it belongs to was either omitted or,
/// for warnings, kept with a fallback value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Dotted path of the field from the mapping root.
    pub field: String,
    pub xpath: String,
    pub message: String,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' ({}): {}", self.field, self.xpath, self.message)
    }
}
