// File-backed port store, a small JSON key/value document
use crate::application::port_store::PortStore;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;

const PORT_KEY: &str = "Application.port";

#[derive(Debug, Clone)]
pub struct FilePortStore {
    path: PathBuf,
}

impl FilePortStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> Option<Map<String, Value>> {
        let text = tokio::fs::read_to_string(&self.path).await.ok()?;
        match serde_json::from_str(&text) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable state file");
                None
            }
        }
    }
}

#[async_trait]
impl PortStore for FilePortStore {
    async fn load(&self) -> Option<u16> {
        let document = self.read_document().await?;
        let port: Option<u16> = match document.get(PORT_KEY)? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        };
        port.filter(|port| *port != 0)
    }

    async fn save(&self, port: u16) -> anyhow::Result<()> {
        let mut document = self.read_document().await.unwrap_or_default();
        document.insert(PORT_KEY.to_string(), Value::String(port.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
