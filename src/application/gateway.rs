// Client API gateway - one typed operation per backend capability
use crate::application::notifier::Notifier;
use crate::application::port_store::PortStore;
use crate::application::transport::{BackendRequest, Method, RequestBody, Transport};
use crate::domain::aggregate::{AggregateEnvelope, AggregateQuery, ProviderAggregate};
use crate::domain::provider::ProvidersSnapshot;
use crate::domain::script::{CounterList, Script, ScriptList};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Backend address is not configured")]
    NotConfigured,
    #[error("Invalid port {0}")]
    InvalidPort(u16),
    #[error("{0}")]
    Unreachable(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Invalid response from server: {0}")]
    Decode(String),
}

/// Outbound calls to the metrics backend.
///
/// Every failing operation notifies the user once and hands the error back to
/// the caller. Nothing is retried. [`ClientGateway::health_check`] is the only
/// call that neither notifies nor fails.
pub struct ClientGateway {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    port_store: Arc<dyn PortStore>,
    host: String,
    default_port: u16,
    base: RwLock<Option<String>>,
}

impl ClientGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        port_store: Arc<dyn PortStore>,
        host: String,
        default_port: u16,
    ) -> Self {
        Self {
            transport,
            notifier,
            port_store,
            host,
            default_port,
            base: RwLock::new(None),
        }
    }

    pub fn base_address(&self) -> Option<String> {
        self.base.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn adopt(&self, base: String) {
        *self.base.write().unwrap_or_else(|e| e.into_inner()) = Some(base);
    }

    fn address_for(&self, port: u16) -> String {
        format!("http://{}:{}", self.host, port)
    }

    /// Adopt the persisted port (or the default) if the backend answers on it
    pub async fn initialize(&self) -> bool {
        let port = self.port_store.load().await.unwrap_or(self.default_port);
        let base = self.address_for(port);

        if self.probe(&base).await {
            tracing::info!(base = %base, "Connected to metrics backend");
            self.adopt(base);
            true
        } else {
            tracing::warn!(base = %base, "Metrics backend not reachable");
            false
        }
    }

    /// Probe `port`; only a reachable port is persisted and adopted.
    /// Returns whether the address was adopted.
    pub async fn set_base_address(&self, port: u16) -> Result<bool, GatewayError> {
        if port == 0 {
            return Err(GatewayError::InvalidPort(port));
        }

        let base = self.address_for(port);
        if !self.probe(&base).await {
            tracing::warn!(base = %base, "Rejected backend address, health check failed");
            return Ok(false);
        }

        if let Err(e) = self.port_store.save(port).await {
            tracing::warn!(port, error = %e, "Failed to persist backend port");
        }
        tracing::info!(base = %base, "Backend address updated");
        self.adopt(base);
        Ok(true)
    }

    /// Reachability of the adopted address. Never notifies, never fails.
    pub async fn health_check(&self) -> bool {
        match self.base_address() {
            Some(base) => self.probe(&base).await,
            None => false,
        }
    }

    async fn probe(&self, base: &str) -> bool {
        match self.transport.send(base, BackendRequest::get("/api/health")).await {
            Ok(response) => response.is_success(),
            Err(e) => {
                tracing::debug!(base, error = %e, "Health check failed");
                false
            }
        }
    }

    pub async fn get_config(&self) -> Result<String, GatewayError> {
        self.call(BackendRequest::get("/api/config"), "Failed to get configuration")
            .await
    }

    pub async fn save_config(&self, config: &str) -> Result<String, GatewayError> {
        let request = BackendRequest::new(Method::Put, "/api/config/save")
            .with_body(RequestBody::Text(config.to_string()));
        self.call(request, "Failed to save configuration").await
    }

    pub async fn list_scripts(&self) -> Result<Vec<Script>, GatewayError> {
        let list: ScriptList = self
            .call_json(BackendRequest::get("/api/script"), "Failed to get scripts")
            .await?;
        Ok(list.scripts)
    }

    pub async fn save_script(&self, script: &Script) -> Result<(), GatewayError> {
        let request = BackendRequest::new(Method::Post, "/api/script/save")
            .with_body(script_body(script)?);
        self.call(request, "Failed to save script").await.map(|_| ())
    }

    pub async fn update_script(&self, script: &Script) -> Result<(), GatewayError> {
        let request = BackendRequest::new(Method::Patch, "/api/script/patch")
            .with_body(script_body(script)?);
        self.call(request, "Failed to update script").await.map(|_| ())
    }

    pub async fn delete_script(&self, name: &str) -> Result<(), GatewayError> {
        let path = format!("/api/script/delete/{}", urlencoding::encode(name));
        self.call(BackendRequest::new(Method::Delete, path), "Failed to delete script")
            .await
            .map(|_| ())
    }

    pub async fn list_counters(&self) -> Result<Vec<String>, GatewayError> {
        let list: CounterList = self
            .call_json(BackendRequest::get("/api/counters"), "Failed to get counters")
            .await?;
        Ok(list.counters)
    }

    /// Latest `window` samples of every provider
    pub async fn list_providers(&self, window: u32) -> Result<ProvidersSnapshot, GatewayError> {
        let path = format!("/api/providers/{}", window);
        self.call_json(BackendRequest::get(path), "Error occurred while fetching provider data!")
            .await
    }

    pub async fn provider_aggregate(
        &self,
        query: &AggregateQuery,
    ) -> Result<ProviderAggregate, GatewayError> {
        let request = BackendRequest::get("/api/provider/aggregate").with_query(query.to_pairs());
        let envelope: AggregateEnvelope = self
            .call_json(request, "Failed to get provider aggregate")
            .await?;
        Ok(envelope.data)
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        request: BackendRequest,
        fallback: &str,
    ) -> Result<T, GatewayError> {
        let body = self.call(request, fallback).await?;
        serde_json::from_str(&body)
            .map_err(|e| self.report(GatewayError::Decode(e.to_string())))
    }

    async fn call(&self, request: BackendRequest, fallback: &str) -> Result<String, GatewayError> {
        let base = self
            .base_address()
            .ok_or_else(|| self.report(GatewayError::NotConfigured))?;

        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(%method, path = %path, "Calling backend");

        let response = self.transport.send(&base, request).await.map_err(|e| {
            let message = if e.message.is_empty() {
                fallback.to_string()
            } else {
                e.message
            };
            self.report(GatewayError::Unreachable(message))
        })?;

        if !response.is_success() {
            let message = if response.body.trim().is_empty() {
                fallback.to_string()
            } else {
                response.body
            };
            return Err(self.report(GatewayError::Status {
                status: response.status,
                message,
            }));
        }

        Ok(response.body)
    }

    fn report(&self, error: GatewayError) -> GatewayError {
        tracing::error!(error = %error, "Backend call failed");
        self.notifier.error(&error.to_string());
        error
    }
}

fn script_body(script: &Script) -> Result<RequestBody, GatewayError> {
    serde_json::to_value(script)
        .map(RequestBody::Json)
        .map_err(|e| GatewayError::Decode(e.to_string()))
}
