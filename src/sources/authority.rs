use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::settings::AuthorityConfig;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::sources::response::{classify, AuthorityResponse};
use crate::utils::constants::{GRANT_PASSWORD, GRANT_REFRESH_TOKEN};

/// The two exchanges the broker performs against the token endpoint.
pub trait Authority: Send + Sync {
    /// `grant_type=password`
    fn acquire_new(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = AuthorityResponse> + Send;

    /// `grant_type=refresh_token`
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = AuthorityResponse> + Send;
}

/// Token endpoint client posting form-encoded grants.
#[derive(Debug, Clone)]
pub struct AuthorityClient {
    client: Client,
    token_endpoint: String,
    client_id: String,
    resource: String,
}

impl AuthorityClient {
    /// Builds its own HTTP client bounded by `timeout_ms`.
    pub fn new(cfg: &AuthorityConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("building token endpoint HTTP client")?;
        Ok(Self::with_client(client, cfg))
    }

    pub fn with_client(client: Client, cfg: &AuthorityConfig) -> Self {
        info!("token endpoint: {}", cfg.token_endpoint);
        Self {
            client,
            token_endpoint: cfg.token_endpoint.to_owned(),
            client_id: cfg.client_id.to_owned(),
            resource: cfg.resource.to_owned(),
        }
    }

    async fn post_grant(&self, grant_type: &'static str, form: &[(&str, &str)]) -> AuthorityResponse {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.authority_requests.with_label_values(&[grant_type]).inc();

        let outcome = match self.send(form).await {
            Ok(body) => classify(&body),
            Err(e) => {
                warn!("token endpoint call ({}) failed: {:#}", grant_type, e);
                AuthorityResponse::Unknown
            }
        };

        metrics
            .authority_duration
            .with_label_values(&[grant_type])
            .observe(start.elapsed().as_secs_f64());
        if !matches!(outcome, AuthorityResponse::Granted(_)) {
            metrics
                .authority_failures
                .with_label_values(&[grant_type, outcome.reason()])
                .inc();
        }
        debug!("token endpoint call ({}) classified as {}", grant_type, outcome.reason());
        outcome
    }

    async fn send(&self, form: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .post(&self.token_endpoint)
            .form(form)
            .send()
            .await
            .context("sending token request")?;

        debug!("token endpoint answered {}", response.status());
        response.text().await.context("reading token response body")
    }
}

impl Authority for AuthorityClient {
    async fn acquire_new(&self, username: &str, password: &str) -> AuthorityResponse {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("resource", self.resource.as_str()),
            ("username", username),
            ("password", password),
            ("grant_type", GRANT_PASSWORD),
        ];
        self.post_grant(GRANT_PASSWORD, &form).await
    }

    async fn refresh(&self, refresh_token: &str) -> AuthorityResponse {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("resource", self.resource.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", GRANT_REFRESH_TOKEN),
        ];
        self.post_grant(GRANT_REFRESH_TOKEN, &form).await
    }
}
