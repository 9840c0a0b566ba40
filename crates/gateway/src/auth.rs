use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use propshare_core::errors::{GatewayError, GatewayResult};
use propshare_core::session::{AuthGateway, Profile, ProfileUpdate, Session, SignUp, User};
use serde::{Deserialize, Serialize};

use crate::gateway::SupabaseGateway;
use crate::query::Query;

const PROFILES: &str = "profiles";

// ─────────────────────────────────────────────────────────────────────────────
// API Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ApiUserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<ApiUserMetadata>,
}

impl From<ApiUser> for User {
    fn from(api: ApiUser) -> Self {
        Self {
            id: api.id,
            email: api.email,
            full_name: api.user_metadata.and_then(|m| m.full_name),
        }
    }
}

/// Token grant. Sign-up without auto-confirmation returns only the user, so
/// every token field is optional.
#[derive(Debug, Deserialize)]
struct ApiSession {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<ApiUser>,
}

impl ApiSession {
    fn expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.expires_at, self.expires_in) {
            (Some(at), _) => Utc.timestamp_opt(at, 0).single(),
            (None, Some(secs)) => Some(now + Duration::seconds(secs)),
            (None, None) => None,
        }
    }

    /// Converts the grant to a session, or `None` when no token was issued.
    fn into_session(self, now: DateTime<Utc>) -> GatewayResult<Option<Session>> {
        let expires_at = self.expiry(now);
        let Some(access_token) = self.access_token else {
            return Ok(None);
        };
        let user = self
            .user
            .ok_or_else(|| GatewayError::Decode("session without user".to_string()))?;
        Ok(Some(Session {
            access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            expires_at,
            user: user.into(),
        }))
    }
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    full_name: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct RecoverRequest<'a> {
    email: &'a str,
}

#[async_trait]
impl AuthGateway for SupabaseGateway {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> GatewayResult<Session> {
        let grant: ApiSession = self
            .client
            .auth_post("token?grant_type=password", &PasswordGrant { email, password }, None)
            .await?;
        grant
            .into_session(Utc::now())?
            .ok_or_else(|| GatewayError::Decode("token grant without access token".to_string()))
    }

    async fn sign_up(&self, sign_up: &SignUp) -> GatewayResult<Option<Session>> {
        let request = SignUpRequest {
            email: &sign_up.email,
            password: &sign_up.password,
            data: SignUpMetadata {
                full_name: &sign_up.full_name,
            },
        };
        let grant: ApiSession = self.client.auth_post("signup", &request, None).await?;
        grant.into_session(Utc::now())
    }

    async fn sign_out(&self, access_token: &str) -> GatewayResult<()> {
        self.client
            .auth_post_empty("logout", &serde_json::json!({}), Some(access_token))
            .await
    }

    async fn reset_password(&self, email: &str) -> GatewayResult<()> {
        self.client
            .auth_post_empty("recover", &RecoverRequest { email }, None)
            .await
    }

    async fn get_user(&self, access_token: &str) -> GatewayResult<User> {
        let user: ApiUser = self.client.auth_get("user", access_token).await?;
        Ok(user.into())
    }

    async fn get_profile(&self, access_token: &str, user_id: &str) -> GatewayResult<Profile> {
        let query = Query::new().select("*").eq("id", user_id);
        self.client
            .select_single_as(PROFILES, &query, Some(access_token))
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("profile {}", user_id)))
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> GatewayResult<()> {
        let query = Query::new().eq("id", user_id);
        self.client
            .update_as(PROFILES, &query, update, Some(access_token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_token_grant_to_session() {
        let grant: ApiSession = serde_json::from_str(
            r#"{
                "access_token": "jwt",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": {"id": "u-1", "email": "ana@example.com",
                         "user_metadata": {"full_name": "Ana Silva"}}
            }"#,
        )
        .unwrap();

        let session = grant.into_session(now()).unwrap().unwrap();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.expires_at, Some(now() + Duration::hours(1)));
        assert_eq!(session.user.full_name.as_deref(), Some("Ana Silva"));
    }

    #[test]
    fn test_absolute_expiry_wins() {
        let grant: ApiSession = serde_json::from_str(
            r#"{"access_token": "jwt", "expires_in": 3600, "expires_at": 1772370000,
                "user": {"id": "u-1"}}"#,
        )
        .unwrap();
        let session = grant.into_session(now()).unwrap().unwrap();
        assert_eq!(session.expires_at, Utc.timestamp_opt(1772370000, 0).single());
    }

    #[test]
    fn test_unconfirmed_sign_up_has_no_session() {
        // Confirmation pending: the body is the user record itself.
        let grant: ApiSession =
            serde_json::from_str(r#"{"id": "u-1", "email": "ana@example.com"}"#).unwrap();
        assert_eq!(grant.into_session(now()).unwrap(), None);
    }
}
