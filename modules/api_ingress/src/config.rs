use serde::{Deserialize, Serialize};

/// `modules.api_ingress` section of the app config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port`; when unset the server section decides.
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default = "default_true")]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    /// Per-request handler timeout.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Request body cap; base64 images make bodies large.
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_docs: default_true(),
            cors_enabled: false,
            request_timeout_secs: default_timeout_secs(),
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_body_limit_mb() -> usize {
    16
}
