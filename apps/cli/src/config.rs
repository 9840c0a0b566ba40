use propshare_core::constants::DEFAULT_STALE_TIME_SECS;
use propshare_gateway::DEFAULT_TIMEOUT_SECS;
use std::time::Duration;

pub struct Config {
    pub api_url: Option<String>,
    pub anon_key: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub stale_time: Duration,
    pub request_timeout: Duration,
    pub log_format: String,
    pub demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let stale_secs: u64 = non_empty("PROPSHARE_STALE_TIME_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STALE_TIME_SECS);
        let timeout_ms: u64 = non_empty("PROPSHARE_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS * 1000);
        let demo = non_empty("PROPSHARE_DEMO")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            api_url: non_empty("PROPSHARE_API_URL"),
            anon_key: non_empty("PROPSHARE_ANON_KEY"),
            email: non_empty("PROPSHARE_EMAIL"),
            password: lookup("PROPSHARE_PASSWORD").filter(|v| !v.is_empty()),
            stale_time: Duration::from_secs(stale_secs),
            request_timeout: Duration::from_millis(timeout_ms),
            log_format: non_empty("PROPSHARE_LOG_FORMAT").unwrap_or_else(|| "text".into()),
            demo,
        }
    }

    /// Sign-in credentials, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.api_url, None);
        assert_eq!(config.stale_time, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, "text");
        assert!(!config.demo);
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PROPSHARE_API_URL", " https://demo.supabase.co "),
            ("PROPSHARE_EMAIL", "ana@example.com"),
            ("PROPSHARE_PASSWORD", "secret-pw"),
            ("PROPSHARE_STALE_TIME_SECS", "60"),
            ("PROPSHARE_REQUEST_TIMEOUT_MS", "oops"),
            ("PROPSHARE_DEMO", "TRUE"),
        ]);
        assert_eq!(config.api_url.as_deref(), Some("https://demo.supabase.co"));
        assert_eq!(config.credentials(), Some(("ana@example.com", "secret-pw")));
        assert_eq!(config.stale_time, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.demo);
    }
}
