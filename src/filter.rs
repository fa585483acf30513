//! Client-side attribute filters over normalized product records.
//!
//! A [`FilterSet`] is an ordered list of predicates, combined with logical AND.
//! The `cloudCover` attribute takes an inclusive `[min, max]` range; every
//! other key takes a set of acceptable values compared with type-strict
//! equality.

use thiserror::Error;
use tracing::debug;

use crate::product::{AttributeValue, ProductRecord};

/// Attribute filtered by inclusive numeric range rather than set membership.
pub const RANGE_ATTRIBUTE: &str = "cloudCover";

/// Errors that abort a filter call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FilterError {
    /// No input record carries the attribute.
    #[error("attribute '{key}' not found in any product")]
    AttributeNotFound {
        /// The unknown key.
        key: String,
    },

    /// A range predicate is not exactly two numbers `[min, max]`.
    #[error("values for '{key}' must be a list of 2 numbers [min, max], {values:?} was given")]
    InvalidFilter {
        /// The range attribute.
        key: String,
        /// The rejected predicate values.
        values: Vec<AttributeValue>,
    },
}

/// Ordered attribute predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    predicates: Vec<(String, Vec<AttributeValue>)>,
}

impl FilterSet {
    /// Creates an empty filter set that keeps every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate on `key`.
    #[must_use]
    pub fn with<V>(mut self, key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<AttributeValue>,
    {
        self.predicates
            .push((key.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Appends an inclusive `cloudCover` range.
    #[must_use]
    pub fn cloud_cover(self, min: f64, max: f64) -> Self {
        self.with(RANGE_ATTRIBUTE, [min, max])
    }

    /// Returns true if no predicates are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Predicates in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AttributeValue])> {
        self.predicates
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Applies every predicate in order and returns the matching records.
    ///
    /// Input order is preserved. The call is all-or-nothing: a single invalid
    /// predicate fails the whole filter. Range predicates are checked before any
    /// record is looked at, so a malformed range fails even on empty input.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidFilter`] for a malformed range and
    /// [`FilterError::AttributeNotFound`] for a key no input record carries.
    pub fn apply(&self, records: &[ProductRecord]) -> Result<Vec<ProductRecord>, FilterError> {
        for (key, values) in self.iter().filter(|(key, _)| *key == RANGE_ATTRIBUTE) {
            range_bounds(key, values)?;
        }

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut kept: Vec<&ProductRecord> = records.iter().collect();
        for (key, values) in self.iter() {
            if !records.iter().any(|record| record.contains_key(key)) {
                return Err(FilterError::AttributeNotFound {
                    key: key.to_string(),
                });
            }

            if key == RANGE_ATTRIBUTE {
                let (min, max) = range_bounds(key, values)?;
                kept.retain(|record| {
                    record
                        .get(key)
                        .and_then(AttributeValue::as_f64)
                        .is_some_and(|value| value >= min && value <= max)
                });
            } else {
                kept.retain(|record| record.get(key).is_some_and(|value| values.contains(value)));
            }
            debug!(key, remaining = kept.len(), "applied attribute filter");
        }

        Ok(kept.into_iter().cloned().collect())
    }
}

impl<K, V> FromIterator<(K, Vec<V>)> for FilterSet
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |set, (key, values)| set.with(key, values))
    }
}

/// Filters records by a [`FilterSet`]. See [`FilterSet::apply`].
///
/// # Errors
///
/// Same as [`FilterSet::apply`].
pub fn filter_records(
    records: &[ProductRecord],
    filters: &FilterSet,
) -> Result<Vec<ProductRecord>, FilterError> {
    filters.apply(records)
}

fn range_bounds(key: &str, values: &[AttributeValue]) -> Result<(f64, f64), FilterError> {
    let invalid = || FilterError::InvalidFilter {
        key: key.to_string(),
        values: values.to_vec(),
    };
    match values {
        [min, max] => {
            let min = min.as_f64().ok_or_else(invalid)?;
            let max = max.as_f64().ok_or_else(invalid)?;
            Ok((min, max))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cloudy(id: &str, cover: f64) -> ProductRecord {
        ProductRecord::new(id, format!("S2_{id}")).with_field("cloudCover", cover)
    }

    fn orbit(id: &str, direction: &str) -> ProductRecord {
        ProductRecord::new(id, format!("S1_{id}")).with_field("orbitDirection", direction)
    }

    fn ids(records: &[ProductRecord]) -> Vec<&str> {
        records.iter().map(ProductRecord::id).collect()
    }

    #[test]
    fn test_range_filter_keeps_values_inside_bounds() {
        let records = vec![cloudy("a", 10.0), cloudy("b", 50.0), cloudy("c", 90.0)];
        let filtered = FilterSet::new().cloud_cover(20.0, 60.0).apply(&records).unwrap();
        assert_eq!(ids(&filtered), ["b"]);
    }

    #[test]
    fn test_range_filter_bounds_are_inclusive() {
        let records = vec![cloudy("a", 20.0), cloudy("b", 60.0), cloudy("c", 60.5)];
        let filtered = FilterSet::new().cloud_cover(20.0, 60.0).apply(&records).unwrap();
        assert_eq!(ids(&filtered), ["a", "b"]);
    }

    #[test]
    fn test_set_filter_preserves_order() {
        let records = vec![
            orbit("a", "ASCENDING"),
            orbit("b", "DESCENDING"),
            orbit("c", "ASCENDING"),
        ];
        let filtered = FilterSet::new()
            .with("orbitDirection", ["ASCENDING"])
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&filtered), ["a", "c"]);
    }

    #[test]
    fn test_set_filter_does_not_coerce_types() {
        let records = vec![
            ProductRecord::new("a", "A").with_field("relativeOrbitNumber", 42.0),
            ProductRecord::new("b", "B").with_field("relativeOrbitNumber", "42"),
        ];
        let filtered = FilterSet::new()
            .with("relativeOrbitNumber", ["42"])
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&filtered), ["b"]);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let records = vec![orbit("a", "ASCENDING")];
        let err = FilterSet::new()
            .with("platformSerialIdentifier", ["A"])
            .apply(&records)
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::AttributeNotFound {
                key: "platformSerialIdentifier".to_string()
            }
        );
        assert!(err.to_string().contains("platformSerialIdentifier"));
    }

    #[test]
    fn test_range_with_one_bound_is_invalid() {
        let records = vec![cloudy("a", 10.0)];
        let err = FilterSet::new()
            .with(RANGE_ATTRIBUTE, [5.0])
            .apply(&records)
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidFilter { ref key, ref values }
            if key == "cloudCover" && values.len() == 1));
        assert!(err.to_string().contains("cloudCover"), "{err}");
    }

    #[test]
    fn test_malformed_range_rejected_for_empty_input() {
        let err = FilterSet::new()
            .with(RANGE_ATTRIBUTE, [5.0])
            .apply(&[])
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidFilter { ref key, .. } if key == "cloudCover"));
    }

    #[test]
    fn test_malformed_range_reported_before_missing_attribute() {
        let records = vec![orbit("a", "ASCENDING"), orbit("b", "DESCENDING")];
        let err = FilterSet::new()
            .with("orbitDirection", ["ASCENDING"])
            .with(RANGE_ATTRIBUTE, [5.0, 10.0, 15.0])
            .apply(&records)
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidFilter { ref values, .. } if values.len() == 3));
    }

    #[test]
    fn test_range_with_text_bound_is_invalid() {
        let records = vec![cloudy("a", 10.0)];
        let err = FilterSet::new()
            .with(RANGE_ATTRIBUTE, ["low", "high"])
            .apply(&records)
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidFilter { .. }));
    }

    #[test]
    fn test_inverted_range_keeps_nothing() {
        let records = vec![cloudy("a", 10.0), cloudy("b", 50.0)];
        let filtered = FilterSet::new().cloud_cover(60.0, 20.0).apply(&records).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_predicates_are_combined_with_and() {
        let records = vec![
            cloudy("a", 10.0).with_field("orbitDirection", "ASCENDING"),
            cloudy("b", 10.0).with_field("orbitDirection", "DESCENDING"),
            cloudy("c", 80.0).with_field("orbitDirection", "ASCENDING"),
        ];
        let filters: FilterSet = [("orbitDirection", vec!["ASCENDING"])].into_iter().collect();
        let filtered = filters.cloud_cover(0.0, 30.0).apply(&records).unwrap();
        assert_eq!(ids(&filtered), ["a"]);
    }

    #[test]
    fn test_key_present_on_some_records_only() {
        let records = vec![
            ProductRecord::new("a", "A"),
            ProductRecord::new("b", "B").with_field("productType", "GRD"),
        ];
        let filtered = filter_records(&records, &FilterSet::new().with("productType", ["GRD"]))
            .unwrap();
        assert_eq!(ids(&filtered), ["b"]);
    }

    #[test]
    fn test_empty_input_returns_empty() {
        let filtered = FilterSet::new().with("anything", ["x"]).apply(&[]).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_empty_filter_set_keeps_everything() {
        let records = vec![cloudy("a", 10.0), cloudy("b", 90.0)];
        assert_eq!(FilterSet::new().apply(&records).unwrap(), records);
    }
}
