//! HTTP gateway for the PropShare backend.
//!
//! [`SupabaseGateway`] implements every gateway trait of `propshare-core`
//! against a hosted Postgres backend: catalogue and portfolio tables through
//! PostgREST, the trade procedures through RPC, and sign-in through the auth
//! service. Errors are mapped so that network failures and 5xx responses are
//! `Transport` (retryable) while backend refusals are `Rejected` with the
//! backend's own message.

mod auth;
pub mod client;
pub mod config;
mod gateway;
mod notifications;
mod portfolio;
mod properties;
pub mod query;
mod watchlist;

pub use client::RestClient;
pub use config::{GatewayConfig, DEFAULT_TIMEOUT_SECS};
pub use gateway::SupabaseGateway;
pub use query::Query;
