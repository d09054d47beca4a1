// Script service - authoring and management of custom metric scripts
use crate::application::gateway::{ClientGateway, GatewayError};
use crate::application::loading::LoadingIndicator;
use crate::application::notifier::Notifier;
use crate::domain::script::{filter_counters, Script, ScriptError, MAX_COUNTER_SUGGESTIONS};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptServiceError {
    #[error(transparent)]
    Invalid(#[from] ScriptError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Clone)]
pub struct ScriptService {
    gateway: Arc<ClientGateway>,
    notifier: Arc<dyn Notifier>,
    loading: LoadingIndicator,
}

impl ScriptService {
    pub fn new(gateway: Arc<ClientGateway>, notifier: Arc<dyn Notifier>, loading: LoadingIndicator) -> Self {
        Self {
            gateway,
            notifier,
            loading,
        }
    }

    pub async fn list(&self) -> Result<Vec<Script>, ScriptServiceError> {
        let _loading = self.loading.start();
        Ok(self.gateway.list_scripts().await?)
    }

    pub async fn find(&self, name: &str) -> Result<Script, ScriptServiceError> {
        let _loading = self.loading.start();
        let scripts = self.gateway.list_scripts().await?;
        scripts
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| {
                self.notifier.error("Failed to fetch script details!");
                ScriptError::NotFound(name.to_string()).into()
            })
    }

    pub async fn create(&self, script: &Script) -> Result<(), ScriptServiceError> {
        script.validate_new()?;
        let _loading = self.loading.start();
        self.gateway.save_script(script).await?;
        tracing::info!(name = %script.name, "Script saved");
        self.notifier.success("Script saved successfully!");
        Ok(())
    }

    pub async fn update(&self, script: &Script) -> Result<(), ScriptServiceError> {
        script.validate_update()?;
        let _loading = self.loading.start();
        self.gateway.update_script(script).await?;
        tracing::info!(name = %script.name, "Script updated");
        self.notifier.success("Script updated successfully!");
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), ScriptServiceError> {
        if name.trim().is_empty() {
            return Err(ScriptError::MissingName.into());
        }
        let _loading = self.loading.start();
        self.gateway.delete_script(name).await?;
        tracing::info!(name, "Script deleted");
        self.notifier.success("Script deleted successfully!");
        Ok(())
    }

    /// Counter paths to suggest for a metric name being typed
    pub async fn counter_suggestions(&self, filter: &str) -> Result<Vec<String>, ScriptServiceError> {
        let counters = self.gateway.list_counters().await?;
        Ok(filter_counters(&counters, filter, MAX_COUNTER_SUGGESTIONS)
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}
