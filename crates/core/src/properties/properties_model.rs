//! Property domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a property offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Active,
    SoldOut,
    ComingSoon,
    Closed,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Active => "active",
            PropertyStatus::SoldOut => "sold_out",
            PropertyStatus::ComingSoon => "coming_soon",
            PropertyStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Residential,
    Commercial,
    Industrial,
    Mixed,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "residential",
            PropertyType::Commercial => "commercial",
            PropertyType::Industrial => "industrial",
            PropertyType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property offered for fractional investment.
///
/// The backend is the source of truth; `available_shares` changes only as a
/// side effect of buy/sell procedures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub total_value: Decimal,
    pub share_price: Decimal,
    pub total_shares: i64,
    pub available_shares: i64,
    pub annual_return_rate: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn is_active(&self) -> bool {
        self.status == PropertyStatus::Active
    }

    /// Shares already placed with investors.
    pub fn sold_shares(&self) -> i64 {
        self.total_shares - self.available_shares
    }

    /// Fraction of the offering that has been sold, in percent.
    pub fn funded_percentage(&self) -> Decimal {
        if self.total_shares <= 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.sold_shares()) * Decimal::ONE_HUNDRED / Decimal::from(self.total_shares)
    }
}

/// Filters for property listings.
///
/// `status: None` means the default catalogue (active and coming soon).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
    pub search: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Statuses listed when a filter does not name one.
pub const DEFAULT_LISTED_STATUSES: [PropertyStatus; 2] =
    [PropertyStatus::Active, PropertyStatus::ComingSoon];

/// Page size used when only an offset is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default number of featured properties.
pub const DEFAULT_FEATURED_LIMIT: usize = 5;

impl PropertyFilter {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = Some(property_type);
        self
    }

    pub fn with_status(mut self, status: PropertyStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Statuses this filter admits.
    pub fn statuses(&self) -> Vec<PropertyStatus> {
        match self.status {
            Some(status) => vec![status],
            None => DEFAULT_LISTED_STATUSES.to_vec(),
        }
    }

    /// Inclusive row range `(from, to)` to request, if the filter paginates.
    pub fn range(&self) -> Option<(usize, usize)> {
        self.offset.map(|offset| {
            let size = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
            (offset, offset + size.max(1) - 1)
        })
    }

    /// Applies the filter to an in-memory property, ignoring pagination.
    pub fn matches(&self, property: &Property) -> bool {
        if !self.statuses().contains(&property.status) {
            return false;
        }
        if let Some(property_type) = self.property_type {
            if property.property_type != property_type {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = [&property.name, &property.city, &property.address]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(city) = self.city.as_deref().filter(|s| !s.is_empty()) {
            if !property.city.to_lowercase().contains(&city.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if property.share_price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if property.share_price > max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn property(name: &str, city: &str, status: PropertyStatus, price: Decimal) -> Property {
        Property {
            id: name.to_lowercase(),
            name: name.to_string(),
            address: "1 Main St".to_string(),
            city: city.to_string(),
            state: None,
            country: "Canada".to_string(),
            postal_code: None,
            description: None,
            property_type: PropertyType::Residential,
            total_value: dec!(100000),
            share_price: price,
            total_shares: 1000,
            available_shares: 250,
            annual_return_rate: Some(dec!(6.5)),
            images: vec![],
            thumbnail_url: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PropertyStatus::SoldOut).unwrap(),
            "\"sold_out\""
        );
        assert_eq!(
            serde_json::from_str::<PropertyStatus>("\"coming_soon\"").unwrap(),
            PropertyStatus::ComingSoon
        );
    }

    #[test]
    fn test_default_filter_lists_active_and_coming_soon() {
        let filter = PropertyFilter::default();
        assert!(filter.matches(&property("A", "Toronto", PropertyStatus::Active, dec!(50))));
        assert!(filter.matches(&property("B", "Toronto", PropertyStatus::ComingSoon, dec!(50))));
        assert!(!filter.matches(&property("C", "Toronto", PropertyStatus::Closed, dec!(50))));
        assert!(!filter.matches(&property("D", "Toronto", PropertyStatus::SoldOut, dec!(50))));
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_city_address() {
        let p = property("Harbour Lofts", "Halifax", PropertyStatus::Active, dec!(50));
        assert!(PropertyFilter::default().with_search("harbour").matches(&p));
        assert!(PropertyFilter::default().with_search("HALI").matches(&p));
        assert!(PropertyFilter::default().with_search("main st").matches(&p));
        assert!(!PropertyFilter::default().with_search("vancouver").matches(&p));
    }

    #[test]
    fn test_price_bounds() {
        let p = property("A", "Toronto", PropertyStatus::Active, dec!(100));
        let filter = PropertyFilter {
            min_price: Some(dec!(100)),
            max_price: Some(dec!(150)),
            ..Default::default()
        };
        assert!(filter.matches(&p));
        let filter = PropertyFilter {
            min_price: Some(dec!(100.01)),
            ..Default::default()
        };
        assert!(!filter.matches(&p));
    }

    #[test]
    fn test_range_defaults_page_size() {
        let filter = PropertyFilter {
            offset: Some(20),
            ..Default::default()
        };
        assert_eq!(filter.range(), Some((20, 29)));
        assert_eq!(PropertyFilter::default().range(), None);
    }

    #[test]
    fn test_funded_percentage() {
        let p = property("A", "Toronto", PropertyStatus::Active, dec!(100));
        assert_eq!(p.sold_shares(), 750);
        assert_eq!(p.funded_percentage(), dec!(75));
    }
}
