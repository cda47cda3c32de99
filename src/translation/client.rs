use crate::translation::translator::{TranslationRequest, TranslationResult, Translator};
use crate::translation::vendors::{adapter_for, VendorAdapter};
use crate::utils::config::ApiConfig;
use crate::utils::{Credentials, GatewayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP gateway to a machine-translation vendor.
///
/// Owns the HTTP client, the vendor adapter and the credentials. Every failure
/// is converted into a `TranslationResult::Failed` at this boundary.
pub struct TranslationGateway {
    client: Client,
    adapter: Box<dyn VendorAdapter>,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl TranslationGateway {
    pub fn new(
        adapter: Box<dyn VendorAdapter>,
        credentials: Option<Credentials>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.unwrap_or_else(|| adapter.default_endpoint().to_string());

        Ok(Self {
            client,
            adapter,
            endpoint,
            credentials,
        })
    }

    /// Builds the gateway for the configured backend, reading credentials
    /// from the environment.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let credentials = Credentials::from_env(config.backend);
        if credentials.is_none() {
            warn!(
                backend = %config.backend,
                app_id_var = config.backend.app_id_var(),
                secret_var = config.backend.secret_var(),
                "Translation API credentials missing; every lookup miss will be marked as failed"
            );
        }

        Self::new(
            adapter_for(config.backend),
            credentials,
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    async fn call_api(&self, request: &TranslationRequest) -> std::result::Result<String, GatewayError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(GatewayError::MissingCredentials)?;

        let response = self
            .adapter
            .build_request(&self.client, &self.endpoint, credentials, request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        if !json.is_object() {
            return Err(GatewayError::MalformedResponse(
                "expected a JSON object".to_string(),
            ));
        }

        self.adapter.parse_response(&json)
    }
}

#[async_trait]
impl Translator for TranslationGateway {
    async fn translate(&self, request: &TranslationRequest) -> TranslationResult {
        match self.call_api(request).await {
            Ok(translated) => {
                debug!(
                    provider = self.adapter.name(),
                    from = %request.from,
                    to = %request.to,
                    "Translated text"
                );
                TranslationResult::Translated(translated)
            }
            Err(e) => {
                warn!(
                    provider = self.adapter.name(),
                    from = %request.from,
                    to = %request.to,
                    error = %e,
                    "Translation request failed"
                );
                TranslationResult::failed(e, &request.text)
            }
        }
    }

    fn provider_name(&self) -> &str {
        self.adapter.name()
    }

    fn is_available(&self) -> bool {
        self.has_credentials()
    }
}
