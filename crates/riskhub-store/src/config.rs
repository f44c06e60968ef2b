//! BaaS connection settings

use std::time::Duration;

/// Default outbound request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the hosted row and auth APIs
#[derive(Clone)]
pub struct BaasConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Public key sent with auth requests
    pub anon_key: String,
    /// Privileged key sent with row requests
    pub service_role_key: String,
    /// Outbound request timeout
    pub timeout: Duration,
}

impl BaasConfig {
    /// Create config with the default timeout
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Row API endpoint for a table
    #[must_use]
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }

    /// Auth API endpoint
    #[must_use]
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }
}

// Keys stay out of logs.
impl std::fmt::Debug for BaasConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaasConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .field("service_role_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_built_from_trimmed_base() {
        let c = BaasConfig::new("https://proj.supabase.co/", "anon", "service");
        assert_eq!(c.rest_url("swot_analisis"), "https://proj.supabase.co/rest/v1/swot_analisis");
        assert_eq!(
            c.auth_url("/token?grant_type=password"),
            "https://proj.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn debug_redacts_keys() {
        let c = BaasConfig::new("https://x", "anon-secret", "service-secret");
        let text = format!("{c:?}");
        assert!(!text.contains("secret"));
    }
}
