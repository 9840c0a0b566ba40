use async_trait::async_trait;
use propshare_core::errors::{GatewayError, GatewayResult};
use propshare_core::properties::{
    Property, PropertyFilter, PropertyGateway, PropertyStatus, PropertyType,
    DEFAULT_LISTED_STATUSES,
};
use serde::Deserialize;

use crate::gateway::SupabaseGateway;
use crate::query::Query;

const PROPERTIES: &str = "properties";

#[derive(Debug, Deserialize)]
struct TypeRow {
    property_type: PropertyType,
}

#[derive(Debug, Deserialize)]
struct CityRow {
    city: String,
}

/// Builds the listing request for `filter`.
pub(crate) fn listing_query(filter: &PropertyFilter) -> Query {
    let mut query = Query::new().select("*");

    query = match filter.status {
        Some(status) => query.eq("status", status),
        None => query.in_list("status", &DEFAULT_LISTED_STATUSES),
    };
    if let Some(property_type) = filter.property_type {
        query = query.eq("property_type", property_type);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.any_ilike_contains(&["name", "city", "address"], search.trim());
    }
    if let Some(city) = filter.city.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.ilike_contains("city", city.trim());
    }
    if let Some(min) = filter.min_price {
        query = query.gte("share_price", min);
    }
    if let Some(max) = filter.max_price {
        query = query.lte("share_price", max);
    }

    query = query.order("created_at", false);
    match filter.range() {
        Some((from, to)) => query.offset(from).limit(to - from + 1),
        None => match filter.limit {
            Some(limit) => query.limit(limit),
            None => query,
        },
    }
}

#[async_trait]
impl PropertyGateway for SupabaseGateway {
    async fn get_property(&self, property_id: &str) -> GatewayResult<Property> {
        let query = Query::new().select("*").eq("id", property_id);
        self.client
            .select_single(PROPERTIES, &query)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("property {}", property_id)))
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> GatewayResult<Vec<Property>> {
        self.client.select(PROPERTIES, &listing_query(filter)).await
    }

    async fn featured_properties(&self, limit: usize) -> GatewayResult<Vec<Property>> {
        let query = Query::new()
            .select("*")
            .eq("status", PropertyStatus::Active)
            .order("annual_return_rate", false)
            .limit(limit);
        self.client.select(PROPERTIES, &query).await
    }

    async fn property_types(&self) -> GatewayResult<Vec<PropertyType>> {
        let query = Query::new()
            .select("property_type")
            .eq("status", PropertyStatus::Active);
        let rows: Vec<TypeRow> = self.client.select(PROPERTIES, &query).await?;
        let mut types: Vec<PropertyType> = rows.into_iter().map(|r| r.property_type).collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    async fn cities(&self) -> GatewayResult<Vec<String>> {
        let query = Query::new()
            .select("city")
            .in_list("status", &DEFAULT_LISTED_STATUSES);
        let rows: Vec<CityRow> = self.client.select(PROPERTIES, &query).await?;
        let mut cities: Vec<String> = rows.into_iter().map(|r| r.city).collect();
        cities.sort();
        cities.dedup();
        Ok(cities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn param<'a>(query: &'a Query, key: &str) -> Vec<&'a str> {
        query
            .params()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_default_listing_query() {
        let query = listing_query(&PropertyFilter::default());
        assert_eq!(param(&query, "status"), vec!["in.(active,coming_soon)"]);
        assert_eq!(param(&query, "order"), vec!["created_at.desc.nullslast"]);
        assert!(param(&query, "limit").is_empty());
    }

    #[test]
    fn test_filtered_listing_query() {
        let filter = PropertyFilter {
            search: Some("loft".to_string()),
            city: Some("hali".to_string()),
            min_price: Some(dec!(50)),
            max_price: Some(dec!(150)),
            limit: Some(5),
            offset: Some(10),
            ..PropertyFilter::default()
        }
        .with_status(PropertyStatus::Active)
        .with_type(PropertyType::Residential);

        let query = listing_query(&filter);

        assert_eq!(param(&query, "status"), vec!["eq.active"]);
        assert_eq!(param(&query, "property_type"), vec!["eq.residential"]);
        assert_eq!(
            param(&query, "or"),
            vec!["(name.ilike.*loft*,city.ilike.*loft*,address.ilike.*loft*)"]
        );
        assert_eq!(param(&query, "city"), vec!["ilike.*hali*"]);
        assert_eq!(param(&query, "share_price"), vec!["gte.50", "lte.150"]);
        assert_eq!(param(&query, "offset"), vec!["10"]);
        assert_eq!(param(&query, "limit"), vec!["5"]);
    }
}
