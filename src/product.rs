//! Normalized product records.
//!
//! The catalog returns products as JSON objects whose mission-specific
//! metadata lives in a nested `Attributes` list. [`normalize_products`] turns
//! each object into a [`ProductRecord`]: a fixed `{id, name}` core plus an open
//! mapping of scalar fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::catalog::QueryError;

/// A scalar attribute value.
///
/// Equality is type-strict: `Number(1.0)` never equals `String("1")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag.
    Bool(bool),
    /// Any JSON number, stored as `f64`.
    Number(f64),
    /// Text value.
    String(String),
}

impl AttributeValue {
    /// Converts a JSON value, returning `None` for null, arrays and objects.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Numeric view of the value, if it is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttributeValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One catalog product with its flattened attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    id: String,
    name: String,
    fields: BTreeMap<String, AttributeValue>,
}

impl ProductRecord {
    /// Creates a record with no extra fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Catalog product identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Product name, used as the download file stem.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.fields.get(key)
    }

    /// Returns true if the record has a field with this key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// All fields, ordered by key.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, AttributeValue> {
        &self.fields
    }
}

/// Normalizes a catalog response body into product records.
///
/// Top-level scalar fields are copied as-is. Each `{Name, Value}` entry of
/// `Attributes` then sets `fields[Name]`, replacing a top-level field with the
/// same key. Nulls, arrays and nested objects are not scalar and are skipped.
///
/// # Errors
///
/// Returns [`QueryError::MissingResults`] if the body has no `value` array and
/// [`QueryError::InvalidProduct`] if a product lacks a non-empty `Id` or `Name`.
pub fn normalize_products(body: &Value) -> Result<Vec<ProductRecord>, QueryError> {
    let products = body
        .get("value")
        .and_then(Value::as_array)
        .ok_or(QueryError::MissingResults)?;

    products
        .iter()
        .enumerate()
        .map(|(index, product)| normalize_product(index, product))
        .collect()
}

fn normalize_product(index: usize, product: &Value) -> Result<ProductRecord, QueryError> {
    let object = product
        .as_object()
        .ok_or_else(|| QueryError::invalid_product(index, "is not a JSON object"))?;

    let id = required_text(object, "Id").ok_or_else(|| {
        QueryError::invalid_product(index, "has no non-empty `Id`")
    })?;
    let name = required_text(object, "Name").ok_or_else(|| {
        QueryError::invalid_product(index, "has no non-empty `Name`")
    })?;

    let mut fields = BTreeMap::new();
    for (key, value) in object {
        match AttributeValue::from_json(value) {
            Some(scalar) => {
                fields.insert(key.clone(), scalar);
            }
            None => trace!(product = %name, field = %key, "skipping non-scalar field"),
        }
    }

    let attributes = object
        .get("Attributes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for attribute in attributes {
        let Some(attr_name) = attribute.get("Name").and_then(Value::as_str) else {
            debug!(product = %name, "attribute without a name ignored");
            continue;
        };
        match attribute.get("Value").and_then(AttributeValue::from_json) {
            Some(value) => {
                fields.insert(attr_name.to_string(), value);
            }
            None => trace!(product = %name, attribute = attr_name, "skipping non-scalar attribute"),
        }
    }

    Ok(ProductRecord { id, name, fields })
}

fn required_text(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    let value = object.get(key)?;
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}
