// Config editor - load, validate and save the backend configuration document
use crate::application::gateway::{ClientGateway, GatewayError};
use crate::application::loading::LoadingIndicator;
use crate::application::notifier::Notifier;
use crate::domain::config_document::{diagnose, ConfigBaseline, ConfigDiagnostic};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum ConfigEditError {
    #[error("configuration is not valid JSON")]
    Invalid(Vec<ConfigDiagnostic>),
    #[error("configuration is unchanged")]
    Unchanged,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub struct ConfigEditor {
    gateway: Arc<ClientGateway>,
    notifier: Arc<dyn Notifier>,
    loading: LoadingIndicator,
    baseline: RwLock<ConfigBaseline>,
}

impl ConfigEditor {
    pub fn new(gateway: Arc<ClientGateway>, notifier: Arc<dyn Notifier>, loading: LoadingIndicator) -> Self {
        Self {
            gateway,
            notifier,
            loading,
            baseline: RwLock::new(ConfigBaseline::default()),
        }
    }

    /// Fetch the document and make it the new baseline
    pub async fn load(&self) -> Result<String, ConfigEditError> {
        let _loading = self.loading.start();
        let text = self.gateway.get_config().await?;
        *self.baseline.write().await = ConfigBaseline::new(text.clone());
        Ok(text)
    }

    pub fn validate(&self, draft: &str) -> Vec<ConfigDiagnostic> {
        diagnose(draft)
    }

    pub async fn has_changed(&self, draft: &str) -> bool {
        self.baseline.read().await.has_changed(draft)
    }

    /// Save a valid, changed draft. Takes effect after the backend restarts.
    pub async fn save(&self, draft: &str) -> Result<String, ConfigEditError> {
        let diagnostics = diagnose(draft);
        if !diagnostics.is_empty() {
            return Err(ConfigEditError::Invalid(diagnostics));
        }
        if !self.has_changed(draft).await {
            return Err(ConfigEditError::Unchanged);
        }

        let _loading = self.loading.start();
        let trimmed = draft.trim();
        let response = self.gateway.save_config(trimmed).await?;
        *self.baseline.write().await = ConfigBaseline::new(trimmed.to_string());
        tracing::info!("Backend configuration saved, restart required");
        self.notifier.success("Configuration saved successfully!");
        Ok(response)
    }
}
