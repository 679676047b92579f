use crate::config::EngineConfig;
use crate::definition::{FieldDefinition, MappingDefinition};
use crate::engine::{Engine, Evaluation};
use crate::error::MappingError;
use crate::extractor::{Extractor, ExtractorRegistry};
use crate::types::ValueType;
use std::fmt;
use std::sync::Arc;
use xmap_cursor::Cursor;
use xmap_xpath::{CompiledXPath, XPathError};

/// The shape of a rule's result.
#[derive(Clone)]
pub enum RuleKind {
    Scalar(ValueType),
    Extractor {
        tag: String,
        extractor: Arc<dyn Extractor>,
    },
    Nested(Vec<Rule>),
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Scalar(ty) => f.debug_tuple("Scalar").field(ty).finish(),
            RuleKind::Extractor { tag, .. } => f.debug_tuple("Extractor").field(tag).finish(),
            RuleKind::Nested(children) => f.debug_tuple("Nested").field(children).finish(),
        }
    }
}

/// Binds an output field to an XPath expression.
///
/// The expression is compiled when the rule is created. A rule whose
/// expression doesn't compile is kept; evaluating it reports the error and
/// leaves the field out.
#[derive(Debug, Clone)]
pub struct Rule {
    field: String,
    source: String,
    xpath: Result<CompiledXPath, XPathError>,
    kind: RuleKind,
}

impl Rule {
    fn new(field: impl Into<String>, xpath: &str, kind: RuleKind) -> Self {
        Self {
            field: field.into(),
            source: xpath.to_string(),
            xpath: CompiledXPath::compile(xpath),
            kind,
        }
    }

    pub fn scalar(field: impl Into<String>, xpath: &str, value_type: ValueType) -> Self {
        Self::new(field, xpath, RuleKind::Scalar(value_type))
    }

    pub fn extractor(
        field: impl Into<String>,
        xpath: &str,
        tag: impl Into<String>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        let tag = tag.into();
        Self::new(field, xpath, RuleKind::Extractor { tag, extractor })
    }

    pub fn nested(field: impl Into<String>, xpath: &str, children: Vec<Rule>) -> Self {
        Self::new(field, xpath, RuleKind::Nested(children))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn xpath_source(&self) -> &str {
        &self.source
    }

    pub fn compiled(&self) -> Result<&CompiledXPath, &XPathError> {
        self.xpath.as_ref()
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn children(&self) -> &[Rule] {
        match &self.kind {
            RuleKind::Nested(children) => children,
            _ => &[],
        }
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self.kind {
            RuleKind::Scalar(ty) => Some(ty),
            _ => None,
        }
    }

    /// Number of nested levels below this rule.
    pub fn depth(&self) -> usize {
        match &self.kind {
            RuleKind::Nested(children) => 1 + children.iter().map(Rule::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    fn validate(&self, strict_xpath: bool) -> Result<(), MappingError> {
        if self.field.is_empty() {
            return Err(MappingError::EmptyField {
                xpath: self.source.clone(),
            });
        }
        if let (true, Err(e)) = (strict_xpath, &self.xpath) {
            return Err(MappingError::InvalidXPath {
                field: self.field.clone(),
                xpath: self.source.clone(),
                source: e.clone(),
            });
        }
        if let RuleKind::Nested(children) = &self.kind {
            if children.is_empty() {
                return Err(MappingError::EmptyNested {
                    field: self.field.clone(),
                });
            }
            for child in children {
                child.validate(strict_xpath)?;
            }
        }
        Ok(())
    }
}

/// A validated rule tree together with the engine configuration it runs
/// under. Shared freely across threads.
#[derive(Debug, Clone)]
pub struct Mapping {
    rules: Vec<Rule>,
    config: EngineConfig,
}

impl Mapping {
    pub fn new(rules: Vec<Rule>, config: EngineConfig) -> Result<Self, MappingError> {
        for rule in &rules {
            rule.validate(false)?;
        }
        Ok(Self { rules, config })
    }

    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        MappingBuilder::from_definition(MappingDefinition::from_json(json)?).build()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn depth(&self) -> usize {
        self.rules.iter().map(Rule::depth).max().unwrap_or(0)
    }

    pub fn evaluate(&self, cursor: &mut dyn Cursor) -> Evaluation {
        Engine::new(self.config.clone()).evaluate(cursor, &self.rules)
    }
}

/// Builds a [`Mapping`] from type-tagged field declarations.
///
/// A tag registered as an extractor produces an extractor rule, a value type
/// tag produces a scalar rule, and anything else fails the build.
#[derive(Debug, Clone, Default)]
pub struct MappingBuilder {
    fields: Vec<FieldDefinition>,
    config: EngineConfig,
    registry: ExtractorRegistry,
    strict_xpath: bool,
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definition(definition: MappingDefinition) -> Self {
        Self {
            fields: definition.fields,
            config: definition.config,
            ..Self::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>, xpath: impl Into<String>, tag: &str) -> Self {
        self.fields.push(FieldDefinition::new(field, xpath, Some(tag.to_string())));
        self
    }

    pub fn scalar(
        self,
        field: impl Into<String>,
        xpath: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        self.field(field, xpath, value_type.tag())
    }

    /// Adds a nested rule whose children are declared on a fresh builder.
    pub fn nested<F>(
        mut self,
        field: impl Into<String>,
        xpath: impl Into<String>,
        children: F,
    ) -> Self
    where
        F: FnOnce(MappingBuilder) -> MappingBuilder,
    {
        let mut definition = FieldDefinition::new(field, xpath, None);
        definition.children = children(MappingBuilder::new()).fields;
        self.fields.push(definition);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Reject malformed expressions at build time instead of reporting them
    /// on every evaluation.
    pub fn strict_xpath(mut self, strict: bool) -> Self {
        self.strict_xpath = strict;
        self
    }

    pub fn build(self) -> Result<Mapping, MappingError> {
        let rules = self
            .fields
            .iter()
            .map(|field| self.resolve(field))
            .collect::<Result<Vec<_>, _>>()?;
        for rule in &rules {
            rule.validate(self.strict_xpath)?;
        }
        Ok(Mapping {
            rules,
            config: self.config,
        })
    }

    fn resolve(&self, definition: &FieldDefinition) -> Result<Rule, MappingError> {
        let FieldDefinition {
            field,
            xpath,
            value_type,
            children,
        } = definition;

        if !children.is_empty() {
            if value_type.is_some() {
                log::debug!("type of nested field '{}' ignored", field);
            }
            let children = children
                .iter()
                .map(|child| self.resolve(child))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Rule::nested(field.as_str(), xpath, children));
        }

        let tag = value_type.as_deref().unwrap_or(ValueType::Text.tag());
        if let Some(extractor) = self.registry.resolve(tag) {
            return Ok(Rule::extractor(field.as_str(), xpath, tag, extractor));
        }
        match ValueType::from_tag(tag) {
            Some(ty) => Ok(Rule::scalar(field.as_str(), xpath, ty)),
            None => Err(MappingError::UnknownType {
                field: field.clone(),
                tag: tag.to_string(),
            }),
        }
    }
}
