// Chart datasets - selected series projected onto time/value points
use super::series::{SelectionSet, SeriesMap, SeriesPoint};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    /// Epoch millis
    #[serde(rename = "x")]
    pub time_ms: i64,
    #[serde(rename = "y")]
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

impl From<&SeriesPoint> for TimeSeriesPoint {
    fn from(point: &SeriesPoint) -> Self {
        Self::new(point.timestamp.saturating_mul(1000), point.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl ChartDataset {
    pub fn new(label: String, points: Vec<TimeSeriesPoint>) -> Self {
        Self { label, points }
    }
}

/// Datasets for every selected series, in series discovery order
pub fn build_datasets(series: &SeriesMap, selection: &SelectionSet) -> Vec<ChartDataset> {
    series
        .iter()
        .filter(|(key, _)| selection.contains(key.as_str()))
        .map(|(key, points)| {
            ChartDataset::new(
                key.to_string(),
                points.iter().map(TimeSeriesPoint::from).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::{Provider, ProviderSample, ProvidersSnapshot};
    use crate::domain::series::{reshape, SeriesKey};

    #[test]
    fn test_only_selected_series_are_drawn() {
        let snapshot = ProvidersSnapshot {
            next_update_time: 0,
            providers: vec![Provider::new(
                "CPU",
                false,
                vec![
                    ProviderSample::new(1, 1.0, 100)
                        .with_field("usage", 55)
                        .with_field("idle", 45),
                    ProviderSample::new(2, 1.0, 160).with_field("usage", 60),
                ],
            )],
        };
        let series = reshape(&snapshot);
        let mut selection = SelectionSet::default();
        selection.set(SeriesKey::from("CPU.usage"), true);
        selection.set(SeriesKey::from("Stale.key"), true);

        let datasets = build_datasets(&series, &selection);

        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].label, "CPU.usage");
        assert_eq!(
            datasets[0].points,
            vec![TimeSeriesPoint::new(100_000, 55.0), TimeSeriesPoint::new(160_000, 60.0)]
        );
    }

    #[test]
    fn test_huge_timestamp_saturates() {
        let point = SeriesPoint {
            key: SeriesKey::from("CPU.usage"),
            path: SeriesKey::from("CPU.usage"),
            field_name: "usage".to_string(),
            value: 1.0,
            counter: 1.0,
            timestamp: i64::MAX / 10,
            is_custom: false,
        };

        assert_eq!(TimeSeriesPoint::from(&point).time_ms, i64::MAX);
    }
}
