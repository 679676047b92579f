use crate::error::MapperError;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use xmap_core::{Evaluation, Mapping};
use xmap_cursor::XmlCursor;
use xmap_xpath::XmlDocument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs one mapping over any number of documents.
///
/// Each call indexes its document once and evaluates the mapping from the
/// root element. The mapping itself is shared, so clones of the mapper are
/// cheap and can be used from several threads.
#[derive(Debug, Clone)]
pub struct XmlMapper {
    mapping: Arc<Mapping>,
}

impl XmlMapper {
    pub fn new(mapping: Mapping) -> Self {
        Self {
            mapping: Arc::new(mapping),
        }
    }

    /// Reads a JSON mapping definition, resolving tags against the built-in
    /// extractors.
    pub fn load_mapping(path: impl AsRef<Path>) -> Result<Mapping, MapperError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| MapperError::io(path, e))?;
        Ok(Mapping::from_json(&json)?)
    }

    pub fn from_mapping_file(path: impl AsRef<Path>) -> Result<Self, MapperError> {
        Self::load_mapping(path).map(Self::new)
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn map_str(&self, xml: &str) -> Result<Evaluation, MapperError> {
        let doc = XmlDocument::parse(xml.strip_prefix('\u{feff}').unwrap_or(xml))?;
        log::debug!("indexed document with {} nodes", doc.node_count());
        let mut cursor = XmlCursor::new(&doc);
        let evaluation = self.mapping.evaluate(&mut cursor);
        if !evaluation.diagnostics.is_empty() {
            log::info!(
                "mapping finished with {} diagnostic(s)",
                evaluation.diagnostics.len()
            );
        }
        Ok(evaluation)
    }

    pub fn map_bytes(&self, bytes: &[u8]) -> Result<Evaluation, MapperError> {
        self.map_str(std::str::from_utf8(bytes)?)
    }

    pub fn map_file(&self, path: impl AsRef<Path>) -> Result<Evaluation, MapperError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| MapperError::io(path, e))?;
        log::debug!("mapping '{}'", path.display());
        self.map_bytes(&bytes)
    }

    /// Maps every file independently. Results are in input order, and a
    /// failing document doesn't affect the others.
    pub fn map_files_parallel<P>(&self, paths: &[P]) -> Vec<Result<Evaluation, MapperError>>
    where
        P: AsRef<Path> + Sync,
    {
        #[cfg(feature = "parallel")]
        let iter = paths.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = paths.iter();

        iter.map(|path| self.map_file(path)).collect()
    }

    /// Maps in-memory documents the same way as [`XmlMapper::map_files_parallel`].
    pub fn map_all<S>(&self, documents: &[S]) -> Vec<Result<Evaluation, MapperError>>
    where
        S: AsRef<str> + Sync,
    {
        #[cfg(feature = "parallel")]
        let iter = documents.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = documents.iter();

        iter.map(|xml| self.map_str(xml.as_ref())).collect()
    }
}
