//! Notifications module - inbox models, gateway trait, and service.

mod notifications_model;
mod notifications_service;
mod notifications_traits;

#[cfg(test)]
mod notifications_service_tests;

pub use notifications_model::{Notification, NotificationType};
pub use notifications_service::{NotificationService, NotificationServiceTrait};
pub use notifications_traits::NotificationGateway;
