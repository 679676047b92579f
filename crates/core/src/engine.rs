use crate::config::{CollapsePolicy, EngineConfig};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use crate::rule::{Rule, RuleKind};
use crate::value::{Record, Value};
use serde::Serialize;
use xmap_cursor::{Binding, Cursor};

/// The result of evaluating a mapping against one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub record: Record,
    pub diagnostics: Vec<Diagnostic>,
    /// Deepest level of nested records reached.
    pub max_depth: usize,
}

impl Evaluation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

/// Walks a cursor through a rule tree.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

struct Walk<'r> {
    path: Vec<&'r str>,
    diagnostics: Vec<Diagnostic>,
    max_depth: usize,
}

impl Walk<'_> {
    fn report(&mut self, kind: DiagnosticKind, severity: Severity, rule: &Rule, message: String) {
        let diagnostic = Diagnostic {
            kind,
            severity,
            field: self.path.join("."),
            xpath: rule.xpath_source().to_string(),
            message,
        };
        match severity {
            Severity::Error => log::error!("{}", diagnostic),
            Severity::Warning => log::warn!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates `rules` relative to the cursor's current position.
    ///
    /// Every binding the engine opens is released before this returns, so
    /// the cursor ends where it started.
    pub fn evaluate(&self, cursor: &mut dyn Cursor, rules: &[Rule]) -> Evaluation {
        let mut walk = Walk {
            path: Vec::new(),
            diagnostics: Vec::new(),
            max_depth: 0,
        };
        let record = self.evaluate_rules(cursor, rules, 0, &mut walk);
        Evaluation {
            record,
            diagnostics: walk.diagnostics,
            max_depth: walk.max_depth,
        }
    }

    fn evaluate_rules<'r>(
        &self,
        cursor: &mut dyn Cursor,
        rules: &'r [Rule],
        depth: usize,
        walk: &mut Walk<'r>,
    ) -> Record {
        walk.max_depth = walk.max_depth.max(depth);
        let mut record = Record::with_capacity(rules.len());
        for rule in rules {
            walk.path.push(rule.field());
            if let Some(value) = self.evaluate_rule(cursor, rule, depth, walk) {
                record.insert(rule.field().to_string(), value);
            }
            walk.path.pop();
        }
        record
    }

    fn evaluate_rule<'r>(
        &self,
        cursor: &mut dyn Cursor,
        rule: &'r Rule,
        depth: usize,
        walk: &mut Walk<'r>,
    ) -> Option<Value> {
        let xpath = match rule.compiled() {
            Ok(xpath) => xpath,
            Err(e) => {
                walk.report(DiagnosticKind::XPath, Severity::Error, rule, e.to_string());
                return None;
            }
        };
        let mut binding = match Binding::bind(&mut *cursor, xpath) {
            Ok(binding) => binding,
            Err(e) => {
                walk.report(DiagnosticKind::XPath, Severity::Error, rule, e.to_string());
                return None;
            }
        };

        match rule.kind() {
            RuleKind::Nested(children) => {
                let mut records = Vec::new();
                while binding.advance().is_some() {
                    let record = self.evaluate_rules(binding.cursor(), children, depth + 1, walk);
                    records.push(Value::Record(record));
                }
                drop(binding);
                if records.is_empty() && self.config.empty_record_on_miss {
                    return Some(Value::Record(Record::new()));
                }
                self.collapse(records, rule, walk)
            }
            RuleKind::Extractor { tag, extractor } => {
                match extractor.extract(rule.field(), xpath, &mut binding) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        let message = format!("extractor '{}' failed: {}", tag, e);
                        walk.report(DiagnosticKind::Extraction, Severity::Error, rule, message);
                        None
                    }
                }
            }
            RuleKind::Scalar(value_type) => {
                let raw = binding.raw_values(xpath.target());
                drop(binding);
                let mut values = Vec::with_capacity(raw.len());
                for text in &raw {
                    match value_type.convert(text) {
                        Ok(value) => values.push(value),
                        Err(e) => {
                            let message = e.to_string();
                            walk.report(DiagnosticKind::Conversion, Severity::Error, rule, message);
                            return None;
                        }
                    }
                }
                self.collapse(values, rule, walk)
            }
        }
    }

    fn collapse(&self, mut values: Vec<Value>, rule: &Rule, walk: &mut Walk<'_>) -> Option<Value> {
        match values.len() {
            0 => None,
            1 => values.pop(),
            n => match self.config.collapse {
                CollapsePolicy::CollectAll => Some(Value::List(values)),
                CollapsePolicy::StrictSingle => {
                    let message = format!("{} matches where one was expected", n);
                    let kind = DiagnosticKind::AmbiguousMatch;
                    if self.config.fail_on_ambiguity {
                        walk.report(kind, Severity::Error, rule, message);
                        None
                    } else {
                        walk.report(kind, Severity::Warning, rule, message);
                        values.pop()
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Mapping, MappingBuilder};
    use crate::types::ValueType;
    use xmap_cursor::XmlCursor;
    use xmap_xpath::XmlDocument;

    const COLLEGE: &str = r#"<college id="123">
        <staff id="101" dep_name="Admin">
            <salary><basic>20000</basic></salary>
        </staff>
        <staff id="102">
            <salary><basic>25000</basic></salary>
        </staff>
    </college>"#;

    fn run(xml: &str, mapping: &Mapping) -> Evaluation {
        let doc = XmlDocument::parse(xml).unwrap();
        let mut cursor = XmlCursor::new(&doc);
        let evaluation = mapping.evaluate(&mut cursor);
        assert_eq!(cursor.active_bindings(), 0);
        assert_eq!(cursor.position(), doc.root_element());
        evaluation
    }

    #[test]
    fn test_college_scenario() {
        let mapping = MappingBuilder::new()
            .scalar("college_id", "@id", ValueType::Integer)
            .field("staff_id_sum", "staff/@id", "sum")
            .scalar("dep_name", "staff[1]/@dep_name", ValueType::Text)
            .field("dep_name_len", "staff[1]/@dep_name", "length")
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.record["college_id"], Value::Integer(123));
        assert_eq!(result.record["staff_id_sum"], Value::Integer(203));
        assert_eq!(result.record["dep_name"], Value::from("Admin"));
        assert_eq!(result.record["dep_name_len"], Value::Integer(5));
        assert_eq!(
            result.record.keys().collect::<Vec<_>>(),
            vec!["college_id", "staff_id_sum", "dep_name", "dep_name_len"]
        );
    }

    #[test]
    fn test_zero_one_many_matches() {
        let mapping = MappingBuilder::new()
            .scalar("ids", "staff/@id", ValueType::Integer)
            .scalar("first", "staff[1]/salary/basic", ValueType::Integer)
            .scalar("missing", "staff/@nope", ValueType::Text)
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        assert_eq!(result.record["ids"], Value::from(vec![101i64, 102]));
        assert_eq!(result.record["first"], Value::Integer(20000));
        assert!(!result.record.contains_key("missing"));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_nested_records() {
        let mapping = MappingBuilder::new()
            .nested("staff", "staff", |b| {
                b.scalar("id", "@id", ValueType::Integer)
                    .nested("salary", "salary", |b| b.scalar("basic", "basic", ValueType::Integer))
            })
            .nested("dean", "dean", |b| b.scalar("name", "name", ValueType::Text))
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        let staff = result.record["staff"].as_list().unwrap();
        assert_eq!(staff.len(), 2);
        assert_eq!(staff[1].get("id"), Some(&Value::Integer(102)));
        assert_eq!(
            staff[0].get("salary").and_then(|s| s.get("basic")),
            Some(&Value::Integer(20000))
        );
        assert!(!result.record.contains_key("dean"));
        assert_eq!(result.max_depth, 2);
    }

    #[test]
    fn test_empty_record_on_miss() {
        let config = EngineConfig {
            empty_record_on_miss: true,
            ..EngineConfig::default()
        };
        let mapping = MappingBuilder::new()
            .nested("dean", "dean", |b| b.scalar("name", "name", ValueType::Text))
            .config(config)
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        assert_eq!(result.record["dean"], Value::Record(Record::new()));
    }

    #[test]
    fn test_strict_single_keeps_last_match() {
        let mapping = MappingBuilder::new()
            .scalar("id", "staff/@id", ValueType::Integer)
            .nested("staff", "staff", |b| b.scalar("id", "@id", ValueType::Integer))
            .config(EngineConfig::strict())
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        assert_eq!(result.record["id"], Value::Integer(102));
        assert_eq!(result.record["staff"].get("id"), Some(&Value::Integer(102)));
        assert_eq!(result.diagnostics.len(), 2);
        assert!(result.diagnostics.iter().all(|d| {
            d.kind == DiagnosticKind::AmbiguousMatch && d.severity == Severity::Warning
        }));
        assert!(!result.has_errors());
    }

    #[test]
    fn test_fail_on_ambiguity_omits_field() {
        let config = EngineConfig {
            fail_on_ambiguity: true,
            ..EngineConfig::strict()
        };
        let mapping = MappingBuilder::new()
            .scalar("id", "staff/@id", ValueType::Integer)
            .scalar("college_id", "@id", ValueType::Integer)
            .config(config)
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        assert!(!result.record.contains_key("id"));
        assert_eq!(result.record["college_id"], Value::Integer(123));
        assert!(result.has_errors());
    }

    #[test]
    fn test_failures_leave_siblings_intact() {
        let mapping = MappingBuilder::new()
            .scalar("broken", "staff[", ValueType::Text)
            .scalar("college_id", "@id", ValueType::Integer)
            .nested("staff", "staff[1]", |b| {
                b.scalar("dept", "@dep_name", ValueType::Integer)
                    .field("bad_sum", "@dep_name", "sum")
                    .scalar("id", "@id", ValueType::Integer)
            })
            .scalar("unknown_fn", "frobnicate(@id)", ValueType::Text)
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        assert_eq!(result.record["college_id"], Value::Integer(123));
        assert_eq!(result.record["staff"].get("id"), Some(&Value::Integer(101)));
        assert_eq!(result.record.len(), 2);

        let summary: Vec<_> = result
            .diagnostics
            .iter()
            .map(|d| (d.kind, d.field.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DiagnosticKind::XPath, "broken"),
                (DiagnosticKind::Conversion, "staff.dept"),
                (DiagnosticKind::Extraction, "staff.bad_sum"),
                (DiagnosticKind::XPath, "unknown_fn"),
            ]
        );
        assert_eq!(result.diagnostics[0].xpath, "staff[");
    }

    #[test]
    fn test_element_text_skips_empty_matches() {
        let xml = "<r><v>a</v><v>  </v><v><w>inner</w></v><v>b</v></r>";
        let mapping = MappingBuilder::new()
            .scalar("v", "v", ValueType::Text)
            .scalar("texts", "v/text()", ValueType::Text)
            .build()
            .unwrap();

        let result = run(xml, &mapping);
        assert_eq!(result.record["v"], Value::from(vec!["a", "b"]));
        assert_eq!(result.record["texts"], Value::from(vec!["a", "  ", "b"]));
    }

    #[test]
    fn test_duplicate_fields_overwrite() {
        let mapping = MappingBuilder::new()
            .scalar("id", "@id", ValueType::Text)
            .scalar("other", "staff[2]/@id", ValueType::Text)
            .scalar("id", "staff[1]/@id", ValueType::Text)
            .build()
            .unwrap();

        let result = run(COLLEGE, &mapping);
        assert_eq!(result.record.keys().collect::<Vec<_>>(), vec!["id", "other"]);
        assert_eq!(result.record["id"], Value::from("101"));
    }

    #[test]
    fn test_three_level_depth() {
        let xml = "<a><b><c><d>x</d></c></b><b><c><d>y</d></c></b></a>";
        let mapping = MappingBuilder::new()
            .nested("b", "b", |b| {
                b.nested("c", "c", |c| c.nested("d", "d", |d| d.scalar("v", ".", ValueType::Text)))
            })
            .build()
            .unwrap();

        let result = run(xml, &mapping);
        assert_eq!(mapping.depth(), 3);
        assert_eq!(result.max_depth, 3);
        let leaves: Vec<_> = result.record["b"]
            .as_list()
            .unwrap()
            .iter()
            .filter_map(|b| b.get("c")?.get("d")?.get("v"))
            .collect();
        assert_eq!(leaves, vec![&Value::from("x"), &Value::from("y")]);
    }

    const CATALOGUE: &str = r#"<catalogue xmlns:x="urn:x" xmlns:y="urn:y">
        <item x:code="NS" code="PLAIN" y:code="OTHER"><x:name>Pen</x:name><name>pen</name></item>
        <x:item code="X1"><x:name>Ink</x:name></x:item>
    </catalogue>"#;

    #[test]
    fn test_namespaced_attributes_stay_distinct() {
        let mapping = MappingBuilder::new()
            .scalar("plain", "item/@code", ValueType::Text)
            .scalar("x_code", "item/@x:code", ValueType::Text)
            .scalar("y_code", "item/@y:code", ValueType::Text)
            .field("all_codes", "item/@*", "count")
            .build()
            .unwrap();

        let result = run(CATALOGUE, &mapping);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.record["plain"], Value::from("PLAIN"));
        assert_eq!(result.record["x_code"], Value::from("NS"));
        assert_eq!(result.record["y_code"], Value::from("OTHER"));
        assert_eq!(result.record["all_codes"], Value::Integer(3));
    }

    #[test]
    fn test_prefixed_steps_select_by_namespace() {
        let mapping = MappingBuilder::new()
            .scalar("x_names", "*/x:name", ValueType::Text)
            .scalar("plain_name", "item/name", ValueType::Text)
            .nested("x_items", "x:item", |item| {
                item.scalar("code", "@code", ValueType::Text)
                    .scalar("name", "x:name", ValueType::Text)
            })
            .build()
            .unwrap();

        let result = run(CATALOGUE, &mapping);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.record["x_names"], Value::from(vec!["Pen", "Ink"]));
        assert_eq!(result.record["plain_name"], Value::from("pen"));
        let item = result.record["x_items"].as_record().unwrap();
        assert_eq!(item["code"], Value::from("X1"));
        assert_eq!(item["name"], Value::from("Ink"));
    }

    #[test]
    fn test_default_namespace_matches_unprefixed_steps() {
        let xml = r#"<college xmlns="urn:c" id="7"><staff id="1"/><staff id="2"/></college>"#;
        let mapping = MappingBuilder::new()
            .scalar("id", "@id", ValueType::Integer)
            .scalar("staff", "staff/@id", ValueType::Integer)
            .build()
            .unwrap();

        let result = run(xml, &mapping);
        assert_eq!(result.record["id"], Value::Integer(7));
        assert_eq!(result.record["staff"], Value::from(vec![1i64, 2]));
    }
}
