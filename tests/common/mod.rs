#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const COLLEGE: &str = r#"<college id="123">
    <staff id="101" dep_name="Admin">
        <name>Ann Admin</name>
        <salary currency="EUR"><basic>20000</basic><bonus>1500</bonus></salary>
        <address><city>Oslo</city><country code="NO">Norway</country></address>
    </staff>
    <staff id="102">
        <name>Bob</name>
        <salary currency="EUR"><basic>25000</basic></salary>
    </staff>
    <dean id="900"><name>Dee</name></dean>
</college>"#;

pub const COLLEGE_MAPPING: &str = r#"{
    "fields": [
        { "field": "college_id", "xpath": "@id", "type": "integer" },
        { "field": "staff_id_sum", "xpath": "staff/@id", "type": "sum" },
        { "field": "dep_name", "xpath": "staff[1]/@dep_name" },
        { "field": "dep_name_len", "xpath": "staff[1]/@dep_name", "type": "length" },
        { "field": "staff", "xpath": "staff", "children": [
            { "field": "id", "xpath": "@id", "type": "integer" },
            { "field": "name", "xpath": "name" },
            { "field": "basic", "xpath": "salary/basic", "type": "integer" },
            { "field": "address", "xpath": "address", "children": [
                { "field": "city", "xpath": "city" },
                { "field": "country_code", "xpath": "country/@code" }
            ]}
        ]}
    ]
}"#;

/// Writes `contents` to a temporary file that lives as long as the handle.
pub fn temp_file(suffix: &str, contents: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
