//! Stateful navigation over an indexed document.
//!
//! A [`Cursor`] sits at one node of a document. Binding a compiled XPath
//! selects the matches relative to that node; advancing moves the cursor onto
//! each match in turn; releasing puts it back where the binding started.
//! [`Binding`] wraps that cycle in a guard so the release can't be skipped.

pub mod binding;
pub mod cursor;
pub mod xml;

pub use binding::Binding;
pub use cursor::{BindingId, Cursor, Match, MatchKind};
pub use xml::XmlCursor;
pub use xmap_xpath::{CompiledXPath, Target, XPathError};
