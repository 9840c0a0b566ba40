//! HTTP client for the PropShare backend.
//!
//! Wraps `reqwest` with the backend's conventions: the `apikey` header on
//! every call, the signed-in user's bearer token (falling back to the anon
//! key), PostgREST table endpoints under `/rest/v1`, stored procedures under
//! `/rest/v1/rpc`, and the auth service under `/auth/v1`.

use log::debug;
use propshare_core::errors::{Error, GatewayError, GatewayResult, Result};
use propshare_core::session::SessionContext;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::query::Query;

/// PostgREST code for a single-object request that matched no rows.
const NO_ROWS_CODE: &str = "PGRST116";

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

const APIKEY: HeaderName = HeaderName::from_static("apikey");
const PREFER: HeaderName = HeaderName::from_static("prefer");
const CONTENT_RANGE: &str = "content-range";

// ─────────────────────────────────────────────────────────────────────────────
// API Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Error body of either PostgREST or the auth service.
#[derive(Debug, Default, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorResponse {
    fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }

    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Maps a non-success response to the gateway error taxonomy.
pub(crate) fn map_error_status(status: StatusCode, body: &str) -> GatewayError {
    let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap_or_default();
    if parsed.code().as_deref() == Some(NO_ROWS_CODE) {
        return GatewayError::NotFound("no matching row".to_string());
    }

    match status.as_u16() {
        401 | 403 => GatewayError::NotAuthenticated,
        408 | 429 => GatewayError::Transport(format!("HTTP {}", status)),
        code if code >= 500 => GatewayError::Transport(format!("HTTP {}", status)),
        400..=499 => match parsed.into_message() {
            Some(message) => GatewayError::Rejected(message),
            None => GatewayError::Api {
                status: status.as_u16(),
                message: truncate(body),
            },
        },
        _ => GatewayError::Api {
            status: status.as_u16(),
            message: parsed.into_message().unwrap_or_else(|| truncate(body)),
        },
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// Reads the total from a `Content-Range` header such as `0-24/57` or `*/0`.
pub(crate) fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// REST Client
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    apikey: HeaderValue,
    session: Arc<SessionContext>,
}

impl RestClient {
    /// # Errors
    ///
    /// Returns a configuration error if the anon key is not a valid header
    /// value or the HTTP client cannot be initialised.
    pub fn new(config: &GatewayConfig, session: Arc<SessionContext>) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(Error::Config("API URL is empty".to_string()));
        }
        let apikey = HeaderValue::from_str(&config.anon_key)
            .map_err(|e| Error::Config(format!("Invalid anon key format: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            apikey,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default headers, authorised as `token` or else the signed-in user.
    fn headers(&self, token: Option<&str>) -> GatewayResult<HeaderMap> {
        let bearer = match token {
            Some(token) => format!("Bearer {}", token),
            None => match self.session.access_token() {
                Some(token) => format!("Bearer {}", token),
                None => format!(
                    "Bearer {}",
                    self.apikey.to_str().unwrap_or_default()
                ),
            },
        };
        let bearer = HeaderValue::from_str(&bearer)
            .map_err(|_| GatewayError::NotAuthenticated)?;

        let mut headers = HeaderMap::new();
        headers.insert(APIKEY, self.apikey.clone());
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn table_url(&self, table: &str, query: &Query) -> String {
        format!("{}/rest/v1/{}{}", self.base_url, table, query.to_query_string())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends the request and returns the headers and body of a successful
    /// response.
    async fn send(&self, request: RequestBuilder) -> GatewayResult<(HeaderMap, String)> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            debug!("[RestClient] {} {}", status, truncate(&body));
            return Err(map_error_status(status, &body));
        }
        Ok((headers, body))
    }

    fn decode<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
        serde_json::from_str(body).map_err(|e| {
            GatewayError::Decode(format!("{} - {}", e, truncate(body)))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Table Endpoints
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> GatewayResult<Vec<T>> {
        let url = self.table_url(table, query);
        debug!("[RestClient] GET {}", url);
        let (_, body) = self
            .send(self.client.get(&url).headers(self.headers(None)?))
            .await?;
        Self::decode(&body)
    }

    /// Reads exactly one row. Zero rows is `Ok(None)`.
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> GatewayResult<Option<T>> {
        self.select_single_as(table, query, None).await
    }

    /// Like [`select_single`](Self::select_single), authorised with an
    /// explicit token.
    pub async fn select_single_as<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        token: Option<&str>,
    ) -> GatewayResult<Option<T>> {
        let url = self.table_url(table, query);
        debug!("[RestClient] GET (single) {}", url);
        let request = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .header(ACCEPT, SINGLE_OBJECT);
        match self.send(request).await {
            Ok((_, body)) => Self::decode(&body).map(Some),
            Err(GatewayError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Exact row count without transferring rows.
    pub async fn count(&self, table: &str, query: &Query) -> GatewayResult<u64> {
        let url = self.table_url(table, query);
        debug!("[RestClient] HEAD (count) {}", url);
        let request = self
            .client
            .head(&url)
            .headers(self.headers(None)?)
            .header(PREFER, "count=exact");
        let (headers, _) = self.send(request).await?;
        headers
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| GatewayError::Decode("missing or invalid Content-Range".to_string()))
    }

    pub async fn insert<B: Serialize + ?Sized>(&self, table: &str, body: &B) -> GatewayResult<()> {
        let url = self.table_url(table, &Query::new());
        debug!("[RestClient] POST {}", url);
        let request = self
            .client
            .post(&url)
            .headers(self.headers(None)?)
            .header(PREFER, "return=minimal")
            .json(body);
        self.send(request).await.map(|_| ())
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
    ) -> GatewayResult<()> {
        self.update_as(table, query, body, None).await
    }

    pub async fn update_as<B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
        token: Option<&str>,
    ) -> GatewayResult<()> {
        let url = self.table_url(table, query);
        debug!("[RestClient] PATCH {}", url);
        let request = self
            .client
            .patch(&url)
            .headers(self.headers(token)?)
            .header(PREFER, "return=minimal")
            .json(body);
        self.send(request).await.map(|_| ())
    }

    pub async fn delete(&self, table: &str, query: &Query) -> GatewayResult<()> {
        let url = self.table_url(table, query);
        debug!("[RestClient] DELETE {}", url);
        let request = self.client.delete(&url).headers(self.headers(None)?);
        self.send(request).await.map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stored Procedures
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn rpc<B, T>(&self, function: &str, args: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        debug!("[RestClient] POST {}", url);
        let request = self
            .client
            .post(&url)
            .headers(self.headers(None)?)
            .json(args);
        let (_, body) = self.send(request).await?;
        Self::decode(&body)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth Endpoints
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn auth_get<T: DeserializeOwned>(&self, path: &str, token: &str) -> GatewayResult<T> {
        let url = self.auth_url(path);
        debug!("[RestClient] GET {}", url);
        let (_, body) = self
            .send(self.client.get(&url).headers(self.headers(Some(token))?))
            .await?;
        Self::decode(&body)
    }

    pub async fn auth_post<B, T>(&self, path: &str, payload: &B, token: Option<&str>) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.auth_post_raw(path, payload, token).await?;
        Self::decode(&body)
    }

    /// Auth call whose response body is ignored.
    pub async fn auth_post_empty<B>(&self, path: &str, payload: &B, token: Option<&str>) -> GatewayResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.auth_post_raw(path, payload, token).await.map(|_| ())
    }

    async fn auth_post_raw<B>(&self, path: &str, payload: &B, token: Option<&str>) -> GatewayResult<String>
    where
        B: Serialize + ?Sized,
    {
        let url = self.auth_url(path);
        debug!("[RestClient] POST {}", url);
        let headers = match token {
            Some(token) => self.headers(Some(token))?,
            None => self.anon_headers()?,
        };
        let (_, body) = self
            .send(self.client.post(&url).headers(headers).json(payload))
            .await?;
        Ok(body)
    }

    /// Headers authorised with the anon key only.
    fn anon_headers(&self) -> GatewayResult<HeaderMap> {
        let key = self
            .apikey
            .to_str()
            .map_err(|_| GatewayError::NotAuthenticated)?
            .to_string();
        self.headers(Some(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            map_error_status(StatusCode::UNAUTHORIZED, "{}"),
            GatewayError::NotAuthenticated
        );
        assert_eq!(
            map_error_status(StatusCode::FORBIDDEN, ""),
            GatewayError::NotAuthenticated
        );
        assert!(matches!(
            map_error_status(StatusCode::BAD_GATEWAY, "upstream down"),
            GatewayError::Transport(_)
        ));
        assert_eq!(
            map_error_status(
                StatusCode::BAD_REQUEST,
                r#"{"code":"P0001","message":"Insufficient funds"}"#
            ),
            GatewayError::Rejected("Insufficient funds".to_string())
        );
        assert_eq!(
            map_error_status(
                StatusCode::BAD_REQUEST,
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            GatewayError::Rejected("Invalid login credentials".to_string())
        );
        assert!(matches!(
            map_error_status(
                StatusCode::NOT_ACCEPTABLE,
                r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#
            ),
            GatewayError::NotFound(_)
        ));
        assert_eq!(
            map_error_status(StatusCode::NOT_FOUND, "not json"),
            GatewayError::Api {
                status: 404,
                message: "not json".to_string()
            }
        );
    }

    #[test]
    fn test_timeout_and_throttling_are_transport() {
        for (status, body) in [
            (StatusCode::REQUEST_TIMEOUT, r#"{"message":"Request timed out"}"#),
            (StatusCode::TOO_MANY_REQUESTS, r#"{"message":"Too many requests"}"#),
        ] {
            let err = map_error_status(status, body);
            assert!(matches!(err, GatewayError::Transport(_)), "{}: {:?}", status, err);
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/57"), Some(57));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}
