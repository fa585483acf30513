//! Search criteria and OData query string assembly.

use std::fmt;

use chrono::NaiveDate;

use crate::mission::Mission;

/// Sort direction on the acquisition start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest acquisitions first.
    Ascending,
    /// Newest acquisitions first.
    Descending,
}

impl SortOrder {
    /// OData keyword for this direction.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured search criteria for one catalog query.
///
/// String fields are inserted into the query verbatim. No quoting or escaping
/// is applied, so a value containing `'` changes the meaning of the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    mission: Mission,
    start: NaiveDate,
    end: NaiveDate,
    product_type: Option<String>,
    exclude: Option<String>,
    footprint: Option<String>,
    order_by: Option<SortOrder>,
    limit: Option<u32>,
}

impl SearchCriteria {
    /// Creates criteria covering acquisitions in `[start, end)`.
    #[must_use]
    pub fn new(mission: Mission, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            mission,
            start,
            end,
            product_type: None,
            exclude: None,
            footprint: None,
            order_by: None,
            limit: None,
        }
    }

    /// Keeps only products whose name contains `product_type`.
    #[must_use]
    pub fn product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    /// Drops products whose name contains `pattern`.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    /// Keeps only products intersecting a WKT geometry (WGS84 coordinates).
    #[must_use]
    pub fn footprint(mut self, wkt: impl Into<String>) -> Self {
        self.footprint = Some(wkt.into());
        self
    }

    /// Sorts results by acquisition start.
    #[must_use]
    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Caps the number of returned products.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Mission the query targets.
    #[must_use]
    pub fn mission(&self) -> Mission {
        self.mission
    }

    /// Inclusive start date.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end date.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Requested product-type substring, if any.
    #[must_use]
    pub fn requested_product_type(&self) -> Option<&str> {
        self.product_type.as_deref()
    }

    /// Builds the query string (everything after `Products?`).
    ///
    /// Clause order is fixed: collection, start bound, end bound, product
    /// type, exclusion, spatial intersection, sort, cap, attribute expansion.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut query = format!(
            "$filter=Collection/Name eq '{}' and ContentDate/Start gt {} and ContentDate/Start lt {}",
            self.mission.name(),
            midnight_utc(self.start),
            midnight_utc(self.end),
        );
        if let Some(product_type) = &self.product_type {
            query.push_str(&format!(" and contains(Name, '{product_type}')"));
        }
        if let Some(exclude) = &self.exclude {
            query.push_str(&format!(" and not contains(Name,'{exclude}')"));
        }
        if let Some(wkt) = &self.footprint {
            query.push_str(&format!(
                " and OData.CSC.Intersects(area=geography'SRID=4326;{wkt}')"
            ));
        }
        if let Some(order) = self.order_by {
            query.push_str(&format!("&$orderby=ContentDate/Start {order}"));
        }
        if let Some(limit) = self.limit {
            query.push_str(&format!("&$top={limit}"));
        }
        query.push_str("&$expand=Attributes");
        query
    }

    /// Builds the full request URL against a catalog base.
    #[must_use]
    pub fn to_url(&self, catalog_base: &str) -> String {
        format!(
            "{}/Products?{}",
            catalog_base.trim_end_matches('/'),
            self.to_query_string()
        )
    }
}

fn midnight_utc(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}
