// Port store - persisted choice of backend port
use async_trait::async_trait;

#[async_trait]
pub trait PortStore: Send + Sync {
    /// Previously persisted port, if any
    async fn load(&self) -> Option<u16>;

    async fn save(&self, port: u16) -> anyhow::Result<()>;
}
