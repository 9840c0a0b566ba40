//! Properties module - catalogue models, gateway trait, and cached reads.

mod properties_model;
mod properties_service;
mod properties_traits;

pub use properties_model::{
    Property, PropertyFilter, PropertyStatus, PropertyType, DEFAULT_FEATURED_LIMIT,
    DEFAULT_LISTED_STATUSES, DEFAULT_PAGE_SIZE,
};
pub use properties_service::{PropertyService, PropertyServiceTrait};
pub use properties_traits::PropertyGateway;
