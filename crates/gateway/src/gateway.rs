use propshare_core::errors::{GatewayError, GatewayResult, Result};
use propshare_core::session::SessionContext;
use propshare_core::Gateways;
use std::sync::Arc;

use crate::client::RestClient;
use crate::config::GatewayConfig;

/// Remote data gateway over HTTP.
///
/// Implements every gateway trait of `propshare-core`. The signed-in user is
/// read from the injected [`SessionContext`] on each call.
#[derive(Debug, Clone)]
pub struct SupabaseGateway {
    pub(crate) client: RestClient,
    pub(crate) session: Arc<SessionContext>,
}

impl SupabaseGateway {
    pub fn new(config: &GatewayConfig, session: Arc<SessionContext>) -> Result<Self> {
        let client = RestClient::new(config, session.clone())?;
        Ok(Self { client, session })
    }

    /// Wraps the gateway for every concern of a `ClientContext`.
    pub fn into_gateways(self) -> Gateways {
        Gateways::from_backend(Arc::new(self))
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub(crate) fn require_user_id(&self) -> GatewayResult<String> {
        self.session
            .user_id()
            .ok_or(GatewayError::NotAuthenticated)
    }
}
