//! Client configuration

use std::time::Duration;

/// Connection parameters for an Infoblox appliance.
///
/// Immutable after construction; the client holds no other state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Appliance management address. A bare host gets an `https://` scheme
    /// prepended; an explicit `http://` or `https://` prefix is honored
    /// as-is (useful against test servers).
    pub host: String,
    /// Basic-auth username, sent on every request
    pub username: String,
    /// Basic-auth password
    pub password: String,
    /// WAPI version string, e.g. "2.10"
    pub wapi_version: String,
    /// Default DNS view for record operations
    pub dns_view: String,
    /// Default network view for network operations
    pub network_view: String,
    /// TLS certificate validation, applied uniformly to every call
    pub verify_ssl: bool,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        wapi_version: impl Into<String>,
        dns_view: impl Into<String>,
        network_view: impl Into<String>,
        verify_ssl: bool,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            wapi_version: wapi_version.into(),
            dns_view: dns_view.into(),
            network_view: network_view.into(),
            verify_ssl,
            timeout: Duration::from_secs(30),
        }
    }

    /// Base URL up to and including the WAPI version segment
    pub(crate) fn wapi_base(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}/wapi/v{}", host, self.wapi_version)
        } else {
            format!("https://{}/wapi/v{}", host, self.wapi_version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wapi_base_adds_https_scheme() {
        let config = ClientConfig::new("gm.example.com", "u", "p", "2.10", "default", "default", true);
        assert_eq!(config.wapi_base(), "https://gm.example.com/wapi/v2.10");
    }

    #[test]
    fn wapi_base_keeps_explicit_scheme() {
        let config =
            ClientConfig::new("http://127.0.0.1:8080/", "u", "p", "1.0", "default", "default", false);
        assert_eq!(config.wapi_base(), "http://127.0.0.1:8080/wapi/v1.0");
    }
}
