//! The serialized form of a mapping.
//!
//! ```json
//! {
//!   "config": { "collapse": "strict-single" },
//!   "fields": [
//!     { "field": "college_id", "xpath": "@id", "type": "integer" },
//!     { "field": "staff", "xpath": "staff", "children": [
//!       { "field": "id", "xpath": "@id" }
//!     ]}
//!   ]
//! }
//! ```

use crate::config::EngineConfig;
use crate::error::MappingError;
use crate::extractor::ExtractorRegistry;
use crate::rule::{Mapping, MappingBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingDefinition {
    #[serde(default)]
    pub config: EngineConfig,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub field: String,
    pub xpath: String,
    /// A value type or extractor tag. Defaults to `text`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDefinition>,
}

impl FieldDefinition {
    pub fn new(
        field: impl Into<String>,
        xpath: impl Into<String>,
        value_type: Option<String>,
    ) -> Self {
        Self {
            field: field.into(),
            xpath: xpath.into(),
            value_type,
            children: Vec::new(),
        }
    }
}

impl MappingDefinition {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn build(self, registry: ExtractorRegistry) -> Result<Mapping, MappingError> {
        MappingBuilder::from_definition(self).registry(registry).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollapsePolicy;
    use crate::rule::RuleKind;
    use crate::types::ValueType;

    const DEFINITION: &str = r#"{
        "config": { "collapse": "strict-single", "fail_on_ambiguity": true },
        "fields": [
            { "field": "college_id", "xpath": "@id", "type": "integer" },
            { "field": "staff_id_sum", "xpath": "staff/@id", "type": "sum" },
            { "field": "staff", "xpath": "staff", "children": [
                { "field": "id", "xpath": "@id" }
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_definition() {
        let definition = MappingDefinition::from_json(DEFINITION).unwrap();
        assert_eq!(definition.config.collapse, CollapsePolicy::StrictSingle);
        assert!(definition.config.fail_on_ambiguity);
        assert_eq!(definition.fields.len(), 3);
        assert_eq!(definition.fields[2].children[0].value_type, None);
    }

    #[test]
    fn test_build_definition() {
        let mapping = Mapping::from_json(DEFINITION).unwrap();
        assert_eq!(mapping.config().collapse, CollapsePolicy::StrictSingle);
        assert_eq!(mapping.rules()[0].value_type(), Some(ValueType::Integer));
        assert!(matches!(mapping.rules()[1].kind(), RuleKind::Extractor { .. }));
        assert_eq!(mapping.rules()[2].children()[0].value_type(), Some(ValueType::Text));
    }

    #[test]
    fn test_unknown_keys_and_types() {
        let typo = r#"{ "fields": [ { "field": "a", "xpath": "@a", "typ": "integer" } ] }"#;
        assert!(matches!(Mapping::from_json(typo), Err(MappingError::Definition(_))));

        let unknown = r#"{ "fields": [ { "field": "a", "xpath": "@a", "type": "money" } ] }"#;
        let definition = MappingDefinition::from_json(unknown).unwrap();
        assert!(matches!(
            definition.build(ExtractorRegistry::empty()),
            Err(MappingError::UnknownType { .. })
        ));
    }
}
