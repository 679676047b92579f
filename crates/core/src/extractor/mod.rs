//! Pluggable computed fields.
//!
//! An [`Extractor`] receives a freshly bound expression and computes the
//! field's value from it. Rules name extractors by type tag; the tag is
//! resolved through an [`ExtractorRegistry`] when the mapping is built.

pub mod builtins;

use crate::error::ExtractionError;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use xmap_cursor::{Binding, Cursor};
use xmap_xpath::CompiledXPath;

pub use builtins::{CountExtractor, JoinExtractor, LengthExtractor, SumExtractor};

pub trait Extractor: Send + Sync {
    /// Computes the value of `field`. The binding is open over the matches
    /// of `xpath` and is released by the caller once this returns.
    fn extract(
        &self,
        field: &str,
        xpath: &CompiledXPath,
        binding: &mut Binding<'_, dyn Cursor + '_>,
    ) -> Result<Value, ExtractionError>;
}

type Constructor = Arc<dyn Fn() -> Arc<dyn Extractor> + Send + Sync>;

/// Maps type tags to extractor constructors.
#[derive(Clone)]
pub struct ExtractorRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ExtractorRegistry {
    /// A registry without any tags.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry with `length`, `sum`, `count` and `join`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("length", || Arc::new(LengthExtractor));
        registry.register("sum", || Arc::new(SumExtractor));
        registry.register("count", || Arc::new(CountExtractor));
        registry.register("join", || Arc::new(JoinExtractor::default()));
        registry
    }

    /// Registers `tag`, replacing any previous constructor for it.
    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn Extractor> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if self.constructors.insert(tag.clone(), Arc::new(constructor)).is_some() {
            log::debug!("extractor '{}' replaced", tag);
        }
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Instantiates the extractor registered for `tag`.
    pub fn resolve(&self, tag: &str) -> Option<Arc<dyn Extractor>> {
        self.constructors.get(tag).map(|constructor| constructor())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.tags().collect();
        tags.sort_unstable();
        f.debug_struct("ExtractorRegistry").field("tags", &tags).finish()
    }
}
