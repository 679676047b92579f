mod common;

use common::{COLLEGE, COLLEGE_MAPPING, TestResult, temp_file};
use xmap::{
    CollapsePolicy, DiagnosticKind, EngineConfig, Mapping, MappingBuilder, MapperError, Value,
    ValueType, XmlMapper,
};

#[test]
fn test_college_mapping_from_json() -> TestResult {
    let mapper = XmlMapper::new(Mapping::from_json(COLLEGE_MAPPING)?);
    let result = mapper.map_str(COLLEGE)?;

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let record = &result.record;
    assert_eq!(record["college_id"], Value::Integer(123));
    assert_eq!(record["staff_id_sum"], Value::Integer(203));
    assert_eq!(record["dep_name"], Value::from("Admin"));
    assert_eq!(record["dep_name_len"], Value::Integer(5));

    let staff = record["staff"].as_list().ok_or("staff is not a list")?;
    assert_eq!(staff.len(), 2);
    assert_eq!(staff[0].get("name"), Some(&Value::from("Ann Admin")));
    assert_eq!(
        staff[0].get("address").and_then(|a| a.get("country_code")),
        Some(&Value::from("NO"))
    );
    assert_eq!(staff[1].get("basic"), Some(&Value::Integer(25000)));
    assert!(staff[1].get("address").is_none());
    assert_eq!(result.max_depth, 2);
    Ok(())
}

#[test]
fn test_json_output_shape() -> TestResult {
    let mapping = MappingBuilder::new()
        .scalar("college_id", "@id", ValueType::Integer)
        .scalar("names", "staff/name", ValueType::Text)
        .nested("dean", "dean", |b| b.scalar("id", "@id", ValueType::Integer))
        .build()?;
    let result = XmlMapper::new(mapping).map_str(COLLEGE)?;

    let json = serde_json::to_string(&result.record)?;
    assert_eq!(
        json,
        r#"{"college_id":123,"names":["Ann Admin","Bob"],"dean":{"id":900}}"#
    );
    Ok(())
}

#[test]
fn test_idempotent_across_independent_documents() -> TestResult {
    let mapper = XmlMapper::new(Mapping::from_json(COLLEGE_MAPPING)?);
    let first = mapper.map_str(COLLEGE)?;
    let copy = COLLEGE.to_string();
    let second = mapper.map_bytes(copy.as_bytes())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_missing_attribute_is_absent() -> TestResult {
    let mapping = MappingBuilder::new()
        .scalar("rank", "staff/@rank", ValueType::Integer)
        .scalar("college_id", "@id", ValueType::Integer)
        .build()?;
    let result = XmlMapper::new(mapping).map_str(COLLEGE)?;
    assert!(!result.record.contains_key("rank"));
    assert!(result.diagnostics.is_empty());
    Ok(())
}

#[test]
fn test_policy_override() -> TestResult {
    let mapping = Mapping::from_json(COLLEGE_MAPPING)?
        .with_config(EngineConfig::default().with_collapse(CollapsePolicy::StrictSingle));
    let result = XmlMapper::new(mapping).map_str(COLLEGE)?;

    assert_eq!(result.record["staff"].get("id"), Some(&Value::Integer(102)));
    let ambiguous: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::AmbiguousMatch)
        .map(|d| d.field.as_str())
        .collect();
    assert_eq!(ambiguous, vec!["staff"]);
    Ok(())
}

#[test]
fn test_malformed_rule_reports_one_diagnostic() -> TestResult {
    let json = r#"{ "fields": [
        { "field": "ok", "xpath": "@id", "type": "integer" },
        { "field": "staff", "xpath": "staff[1]", "children": [
            { "field": "broken", "xpath": "salary/", "type": "integer" },
            { "field": "currency", "xpath": "salary/@currency" }
        ]}
    ]}"#;
    let result = XmlMapper::new(Mapping::from_json(json)?).map_str(COLLEGE)?;

    assert_eq!(result.record["ok"], Value::Integer(123));
    assert_eq!(result.record["staff"].get("currency"), Some(&Value::from("EUR")));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::XPath);
    assert_eq!(result.diagnostics[0].field, "staff.broken");
    Ok(())
}

#[test]
fn test_map_files() -> TestResult {
    let mapping_file = temp_file(".json", COLLEGE_MAPPING)?;
    let mapper = XmlMapper::from_mapping_file(mapping_file.path())?;

    let good = temp_file(".xml", COLLEGE)?;
    let other = temp_file(".xml", r#"<college id="7"><staff id="1"/></college>"#)?;
    let broken = temp_file(".xml", "<college>")?;

    let paths = vec![
        good.path().to_path_buf(),
        broken.path().to_path_buf(),
        other.path().to_path_buf(),
    ];
    let results = mapper.map_files_parallel(&paths);

    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().map_err(|e| e.to_string())?;
    assert_eq!(first.record["college_id"], Value::Integer(123));
    assert!(matches!(results[1], Err(MapperError::Xml(_))));
    let other = results[2].as_ref().map_err(|e| e.to_string())?;
    assert_eq!(other.record["staff_id_sum"], Value::Integer(1));
    assert_eq!(other.record["staff"].get("id"), Some(&Value::Integer(1)));
    Ok(())
}

#[test]
fn test_bad_mapping_file() -> TestResult {
    let definition = r#"{ "fields": [ { "field": "a", "xpath": "@a", "type": "money" } ] }"#;
    let file = temp_file(".json", definition)?;
    assert!(matches!(
        XmlMapper::from_mapping_file(file.path()),
        Err(MapperError::Mapping(_))
    ));
    Ok(())
}
