use async_trait::async_trait;
use std::sync::Arc;

use super::properties_model::{Property, PropertyFilter, PropertyType};
use super::properties_traits::PropertyGateway;
use crate::cache::{unexpected_value, QueryKey, QueryValue, ReadModelCache};
use crate::errors::Result;

/// Cached reads of the property catalogue.
#[async_trait]
pub trait PropertyServiceTrait: Send + Sync {
    async fn get_property(&self, property_id: &str) -> Result<Property>;

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>>;

    async fn featured_properties(&self, limit: usize) -> Result<Vec<Property>>;

    async fn property_types(&self) -> Result<Vec<PropertyType>>;

    async fn cities(&self) -> Result<Vec<String>>;
}

pub struct PropertyService {
    gateway: Arc<dyn PropertyGateway>,
    cache: Arc<ReadModelCache>,
}

impl PropertyService {
    pub fn new(gateway: Arc<dyn PropertyGateway>, cache: Arc<ReadModelCache>) -> Self {
        Self { gateway, cache }
    }
}

#[async_trait]
impl PropertyServiceTrait for PropertyService {
    async fn get_property(&self, property_id: &str) -> Result<Property> {
        let key = QueryKey::Property(property_id.to_string());
        let gateway = self.gateway.clone();
        let property_id = property_id.to_string();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                let property_id = property_id.clone();
                async move {
                    gateway
                        .get_property(&property_id)
                        .await
                        .map(QueryValue::Property)
                }
            })
            .await?;
        match value {
            QueryValue::Property(property) => Ok(property),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let key = QueryKey::Properties(filter.clone());
        let gateway = self.gateway.clone();
        let filter = filter.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                let filter = filter.clone();
                async move {
                    gateway
                        .list_properties(&filter)
                        .await
                        .map(QueryValue::Properties)
                }
            })
            .await?;
        match value {
            QueryValue::Properties(properties) => Ok(properties),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn featured_properties(&self, limit: usize) -> Result<Vec<Property>> {
        let key = QueryKey::FeaturedProperties(limit);
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move {
                    gateway
                        .featured_properties(limit)
                        .await
                        .map(QueryValue::Properties)
                }
            })
            .await?;
        match value {
            QueryValue::Properties(properties) => Ok(properties),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn property_types(&self) -> Result<Vec<PropertyType>> {
        let key = QueryKey::PropertyTypes;
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move { gateway.property_types().await.map(QueryValue::PropertyTypes) }
            })
            .await?;
        match value {
            QueryValue::PropertyTypes(types) => Ok(types),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn cities(&self) -> Result<Vec<String>> {
        let key = QueryKey::Cities;
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move { gateway.cities().await.map(QueryValue::Cities) }
            })
            .await?;
        match value {
            QueryValue::Cities(cities) => Ok(cities),
            _ => Err(unexpected_value(&key)),
        }
    }
}
