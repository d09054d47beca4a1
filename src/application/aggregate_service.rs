// Aggregate lookup - summary statistics for one series at a time
use crate::application::dashboard_state::SharedDashboard;
use crate::application::gateway::{ClientGateway, GatewayError};
use crate::application::notifier::Notifier;
use crate::domain::aggregate::{ProviderAggregate, SeriesRef, SeriesRefError};
use crate::domain::series::SeriesKey;
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    InvalidKey(#[from] SeriesRefError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Clone)]
pub struct AggregateLookup {
    gateway: Arc<ClientGateway>,
    notifier: Arc<dyn Notifier>,
    state: SharedDashboard,
}

impl AggregateLookup {
    pub fn new(gateway: Arc<ClientGateway>, notifier: Arc<dyn Notifier>, state: SharedDashboard) -> Self {
        Self {
            gateway,
            notifier,
            state,
        }
    }

    /// Fetch the aggregate for `key` and cache it. On failure the cached value
    /// is left as it was.
    pub async fn lookup(&self, key: &str) -> Result<ProviderAggregate, AggregateError> {
        let series_ref = self.resolve(key).await.inspect_err(|e| {
            self.notifier.error(&e.to_string());
        })?;

        let aggregate = self.gateway.provider_aggregate(&series_ref.to_query()).await?;
        self.state
            .write()
            .await
            .aggregates
            .insert(SeriesKey::new(key), aggregate);
        Ok(aggregate)
    }

    /// Independent lookups, issued concurrently, results in input order
    pub async fn lookup_many(&self, keys: &[SeriesKey]) -> Vec<Result<ProviderAggregate, AggregateError>> {
        join_all(keys.iter().map(|key| self.lookup(key.as_str()))).await
    }

    pub async fn cached(&self, key: &str) -> Option<ProviderAggregate> {
        self.state.read().await.aggregates.get(key).copied()
    }

    async fn resolve(&self, key: &str) -> Result<SeriesRef, SeriesRefError> {
        // Custom provider names may themselves contain the separator
        if self.state.read().await.series.is_custom(key) == Some(true) {
            return Ok(SeriesRef::Custom {
                provider: key.to_string(),
            });
        }
        SeriesRef::parse(key)
    }
}
