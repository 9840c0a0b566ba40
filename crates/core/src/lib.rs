//! PropShare Core - Domain models, services, and gateway traits.
//!
//! This crate contains the client-side business logic for fractional
//! real-estate investing. It is transport-agnostic and defines gateway traits
//! that are implemented by the `propshare-gateway` crate (HTTP) and by the
//! in-process [`backend::InMemoryBackend`].

pub mod backend;
pub mod cache;
pub mod constants;
pub mod context;
pub mod errors;
pub mod notifications;
pub mod portfolio;
pub mod properties;
pub mod session;
pub mod trading;
pub mod utils;
pub mod watchlist;

pub use context::{ClientContext, Gateways};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
