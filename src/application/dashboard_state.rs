// Materialized dashboard state shared by the scheduler and the HTTP layer
use crate::domain::aggregate::ProviderAggregate;
use crate::domain::chart::{build_datasets, ChartDataset};
use crate::domain::series::{SelectionSet, SeriesKey, SeriesMap};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedDashboard = Arc<RwLock<DashboardState>>;

#[derive(Debug, Default)]
pub struct DashboardState {
    pub series: SeriesMap,
    pub selection: SelectionSet,
    /// Server hint in epoch millis, display only
    pub next_update_time: i64,
    pub last_refreshed: Option<DateTime<Utc>>,
    /// Last successfully fetched aggregate per series
    pub aggregates: HashMap<SeriesKey, ProviderAggregate>,
    applied_sequence: u64,
}

impl DashboardState {
    pub fn shared() -> SharedDashboard {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Replace the series map with the result of fetch `sequence`.
    /// Results older than the last applied one are dropped.
    pub fn apply(&mut self, sequence: u64, series: SeriesMap, next_update_time: i64) -> bool {
        if sequence <= self.applied_sequence {
            return false;
        }
        self.applied_sequence = sequence;
        self.series = series;
        self.next_update_time = next_update_time;
        self.last_refreshed = Some(Utc::now());
        true
    }

    pub fn datasets(&self) -> Vec<ChartDataset> {
        build_datasets(&self.series, &self.selection)
    }
}
