//! TLS presence probe.
//!
//! A HEAD request over HTTPS with certificate validation left on: a handshake
//! or network failure means `false`. Non-HTTPS URLs are `false` by definition.

use async_trait::async_trait;

use super::SslProbe;

pub struct HttpSslProbe {
    client: reqwest::Client,
}

impl HttpSslProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SslProbe for HttpSslProbe {
    async fn check(&self, url: &str) -> bool {
        if !url.starts_with("https://") {
            tracing::debug!(url, "not HTTPS, SSL considered absent");
            return false;
        }

        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let valid = (200..400).contains(&status);
                tracing::debug!(url, status, valid, "SSL probe completed");
                valid
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "SSL probe failed, considered invalid");
                false
            }
        }
    }
}
