use crate::cursor::{BindingId, Cursor, Match};
use xmap_xpath::{CompiledXPath, Target, XPathError};

/// A bound expression that releases itself when dropped.
///
/// The guard holds the cursor's only mutable borrow, so another binding can
/// only be opened through [`Binding::cursor`] and must be dropped first.
pub struct Binding<'c, C: Cursor + ?Sized> {
    cursor: &'c mut C,
    id: BindingId,
}

impl<'c, C: Cursor + ?Sized> Binding<'c, C> {
    pub fn bind(cursor: &'c mut C, xpath: &CompiledXPath) -> Result<Self, XPathError> {
        let id = cursor.bind(xpath)?;
        log::trace!("bound '{}' as {:?}", xpath, id);
        Ok(Self { cursor, id })
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn advance(&mut self) -> Option<Match> {
        self.cursor.advance(self.id)
    }

    pub fn reset(&mut self) {
        self.cursor.reset(self.id);
    }

    pub fn string_value(&self) -> String {
        self.cursor.string_value(self.id)
    }

    pub fn text(&self) -> Option<String> {
        self.cursor.text()
    }

    pub fn attribute_name(&self, matched: &Match) -> Option<String> {
        self.cursor.attribute_name(matched)
    }

    pub fn attribute_value(&self, name: &str) -> Option<String> {
        self.cursor.attribute_value(name)
    }

    /// The cursor, positioned at the most recent match.
    pub fn cursor(&mut self) -> &mut C {
        self.cursor
    }

    /// Advances through the remaining matches and collects their raw values.
    ///
    /// For an attribute target each match is resolved to its attribute's
    /// value. Otherwise each match contributes its text content, and matches
    /// without any are skipped.
    pub fn raw_values(&mut self, target: Target) -> Vec<String> {
        let mut values = Vec::new();
        while let Some(matched) = self.advance() {
            let value = match target {
                Target::Attribute => self
                    .attribute_name(&matched)
                    .and_then(|name| self.attribute_value(&name)),
                Target::Node => self.text(),
            };
            values.extend(value);
        }
        values
    }
}

impl<C: Cursor + ?Sized> Drop for Binding<'_, C> {
    fn drop(&mut self) {
        self.cursor.release(self.id);
        log::trace!("released {:?}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlCursor;
    use xmap_xpath::XmlDocument;

    const STAFF: &str = r#"<college id="123">
        <staff id="101" dep_name="Admin"><name>Ann</name></staff>
        <staff id="102"><name>  </name></staff>
        <staff id="103" dep_name="Math"><name>Cid</name></staff>
    </college>"#;

    fn xpath(source: &str) -> CompiledXPath {
        CompiledXPath::compile(source).unwrap()
    }

    #[test]
    fn test_drop_releases_binding() {
        let doc = XmlDocument::parse(STAFF).unwrap();
        let mut cursor = XmlCursor::new(&doc);
        {
            let mut binding = Binding::bind(&mut cursor, &xpath("staff")).unwrap();
            assert!(binding.advance().is_some());
            assert_eq!(binding.cursor().active_bindings(), 1);
        }
        assert_eq!(cursor.active_bindings(), 0);
        assert_eq!(cursor.attribute_value("id").as_deref(), Some("123"));
    }

    #[test]
    fn test_raw_values_for_attributes() {
        let doc = XmlDocument::parse(STAFF).unwrap();
        let mut cursor = XmlCursor::new(&doc);
        let path = xpath("staff/@dep_name");
        let mut binding = Binding::bind(&mut cursor, &path).unwrap();
        assert_eq!(binding.raw_values(path.target()), vec!["Admin", "Math"]);
    }

    #[test]
    fn test_raw_values_skip_missing_text() {
        let doc = XmlDocument::parse(STAFF).unwrap();
        let mut cursor = XmlCursor::new(&doc);
        let path = xpath("staff/name");
        let mut binding = Binding::bind(&mut cursor, &path).unwrap();
        assert_eq!(binding.raw_values(path.target()), vec!["Ann", "Cid"]);

        binding.reset();
        assert_eq!(binding.raw_values(Target::Node).len(), 2);
    }

    #[test]
    fn test_nested_binding_through_guard() {
        let doc = XmlDocument::parse(STAFF).unwrap();
        let mut cursor = XmlCursor::new(&doc);
        let staff = xpath("staff");
        let id = xpath("@id");

        let mut outer = Binding::bind(&mut cursor, &staff).unwrap();
        let mut ids = Vec::new();
        while outer.advance().is_some() {
            let mut inner = Binding::bind(outer.cursor(), &id).unwrap();
            ids.extend(inner.raw_values(id.target()));
        }
        assert_eq!(ids, vec!["101", "102", "103"]);
    }

    #[test]
    fn test_bind_error_opens_nothing() {
        let doc = XmlDocument::parse(STAFF).unwrap();
        let mut cursor = XmlCursor::new(&doc);
        {
            let result = Binding::bind(&mut cursor, &xpath("count('x')"));
            assert!(result.is_err());
        }
        assert_eq!(cursor.active_bindings(), 0);
    }
}
