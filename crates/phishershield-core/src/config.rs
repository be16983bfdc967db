//! Client-side (interceptor host) configuration.

/// Where the interceptor reaches its collaborators.
#[derive(Debug, Clone)]
pub struct ShieldConfig {
    /// Base URL of the scan server.
    pub gateway_base_url: String,

    /// Page opened when the user chooses "report".
    pub report_page_url: String,

    /// URL prefix of the extension's own surfaces; navigations there are
    /// never intercepted.
    pub own_surface_prefix: Option<String>,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            gateway_base_url: "http://localhost:4000".to_string(),
            report_page_url: "http://localhost:4000/report".to_string(),
            own_surface_prefix: None,
        }
    }
}

impl ShieldConfig {
    /// Environment overrides; every value has a workable default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let gateway_base_url = std::env::var("PHISHERSHIELD_GATEWAY_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.gateway_base_url);
        let report_page_url = std::env::var("PHISHERSHIELD_REPORT_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("{gateway_base_url}/report"));

        Self {
            gateway_base_url,
            report_page_url,
            own_surface_prefix: defaults.own_surface_prefix,
        }
    }
}
