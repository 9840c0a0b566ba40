use std::sync::Arc;

use anyhow::Context;
use propshare_core::backend::{InMemoryBackend, DEMO_EMAIL, DEMO_PASSWORD};
use propshare_core::cache::QueryConfig;
use propshare_core::session::SessionContext;
use propshare_core::{ClientContext, Gateways};
use propshare_gateway::{GatewayConfig, SupabaseGateway};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Wires the session, gateway and services for one run.
pub fn build_context(config: &Config, demo: bool) -> anyhow::Result<ClientContext> {
    let session = Arc::new(SessionContext::new());
    let query_config = QueryConfig::default().with_stale_time(config.stale_time);

    let gateways = if demo {
        tracing::info!("Using the in-memory demo backend");
        Gateways::from_backend(Arc::new(InMemoryBackend::seeded(session.clone())))
    } else {
        let api_url = config
            .api_url
            .as_deref()
            .context("PROPSHARE_API_URL is not set (use --demo for the offline catalogue)")?;
        let anon_key = config
            .anon_key
            .as_deref()
            .context("PROPSHARE_ANON_KEY is not set")?;
        let gateway_config =
            GatewayConfig::new(api_url, anon_key).with_timeout(config.request_timeout);
        SupabaseGateway::new(&gateway_config, session.clone())?.into_gateways()
    };

    Ok(ClientContext::new(session, gateways, query_config))
}

/// Starts the session, signing in with the configured (or demo) credentials.
pub async fn start_session(ctx: &ClientContext, config: &Config, demo: bool) -> anyhow::Result<()> {
    ctx.initialize(None).await?;

    let credentials = if demo {
        Some((DEMO_EMAIL, DEMO_PASSWORD))
    } else {
        config.credentials()
    };
    if let Some((email, password)) = credentials {
        let user = ctx
            .sign_in(email, password)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .context("Sign-in failed")?;
        tracing::debug!("Signed in as {}", user.id);
    }
    Ok(())
}
