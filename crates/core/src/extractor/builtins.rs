use super::Extractor;
use crate::error::ExtractionError;
use crate::value::Value;
use xmap_cursor::{Binding, Cursor};
use xmap_xpath::CompiledXPath;

/// Character count of the expression's string value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthExtractor;

impl Extractor for LengthExtractor {
    fn extract(
        &self,
        _field: &str,
        _xpath: &CompiledXPath,
        binding: &mut Binding<'_, dyn Cursor + '_>,
    ) -> Result<Value, ExtractionError> {
        let length = binding.string_value().chars().count();
        i64::try_from(length)
            .map(Value::Integer)
            .map_err(|_| ExtractionError::Overflow)
    }
}

/// Sum of the integer values of every match.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumExtractor;

impl Extractor for SumExtractor {
    fn extract(
        &self,
        field: &str,
        xpath: &CompiledXPath,
        binding: &mut Binding<'_, dyn Cursor + '_>,
    ) -> Result<Value, ExtractionError> {
        let mut total: i64 = 0;
        for raw in binding.raw_values(xpath.target()) {
            let n: i64 = raw
                .trim()
                .parse()
                .map_err(|_| ExtractionError::InvalidNumber(raw.clone()))?;
            total = total.checked_add(n).ok_or(ExtractionError::Overflow)?;
        }
        log::trace!("sum for '{}' is {}", field, total);
        Ok(Value::Integer(total))
    }
}

/// Number of matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountExtractor;

impl Extractor for CountExtractor {
    fn extract(
        &self,
        _field: &str,
        _xpath: &CompiledXPath,
        binding: &mut Binding<'_, dyn Cursor + '_>,
    ) -> Result<Value, ExtractionError> {
        let mut count: i64 = 0;
        while binding.advance().is_some() {
            count += 1;
        }
        Ok(Value::Integer(count))
    }
}

/// Raw matched values joined into one string.
#[derive(Debug, Clone)]
pub struct JoinExtractor {
    separator: String,
}

impl JoinExtractor {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for JoinExtractor {
    fn default() -> Self {
        Self::new(", ")
    }
}

impl Extractor for JoinExtractor {
    fn extract(
        &self,
        _field: &str,
        xpath: &CompiledXPath,
        binding: &mut Binding<'_, dyn Cursor + '_>,
    ) -> Result<Value, ExtractionError> {
        let values = binding.raw_values(xpath.target());
        Ok(Value::Text(values.join(&self.separator)))
    }
}
