//! Property gateway trait.

use async_trait::async_trait;

use super::properties_model::{Property, PropertyFilter, PropertyType};
use crate::errors::GatewayResult;

/// Read access to the property catalogue on the remote backend.
#[async_trait]
pub trait PropertyGateway: Send + Sync {
    /// Fetches a single property. A missing id is `GatewayError::NotFound`.
    async fn get_property(&self, property_id: &str) -> GatewayResult<Property>;

    /// Lists properties matching the filter, newest first.
    async fn list_properties(&self, filter: &PropertyFilter) -> GatewayResult<Vec<Property>>;

    /// Active properties with the best annual return first.
    async fn featured_properties(&self, limit: usize) -> GatewayResult<Vec<Property>>;

    /// Distinct property types among active properties.
    async fn property_types(&self) -> GatewayResult<Vec<PropertyType>>;

    /// Distinct cities among listed properties, sorted.
    async fn cities(&self) -> GatewayResult<Vec<String>>;
}
