// Series reshaping - flattens provider snapshots into named, renderable series
use super::provider::{coerce_numeric, ProvidersSnapshot};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Identity of a renderable series.
///
/// Built-in providers produce `"{provider}.{field}"`, custom providers produce
/// just `"{provider}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesKey(String);

impl SeriesKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn for_field(provider: &str, field: &str, is_custom: bool) -> Self {
        if is_custom {
            Self(provider.to_string())
        } else {
            Self(format!("{}.{}", provider, field))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SeriesKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SeriesKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub key: SeriesKey,
    /// Same as `key`, kept for external lookup
    pub path: SeriesKey,
    /// Raw field name the value came from
    pub field_name: String,
    pub value: f64,
    pub counter: f64,
    pub timestamp: i64,
    pub is_custom: bool,
}

/// Series keyed by [`SeriesKey`], in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeriesMap(IndexMap<SeriesKey, Vec<SeriesPoint>>);

impl SeriesMap {
    pub fn get(&self, key: &str) -> Option<&[SeriesPoint]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &[SeriesPoint])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Whether the series was produced by a custom provider
    pub fn is_custom(&self, key: &str) -> Option<bool> {
        self.get(key)
            .and_then(|points| points.first())
            .map(|p| p.is_custom)
    }

    fn push(&mut self, point: SeriesPoint) {
        self.0.entry(point.key.clone()).or_default().push(point);
    }
}

/// Flatten a snapshot into a fresh [`SeriesMap`].
///
/// Single left-to-right pass over providers, samples and non-reserved fields.
/// Nothing is merged or reordered: every (sample, field) pair yields one point.
/// All fields of a custom provider collapse onto the provider name; the raw
/// field name stays on each point.
pub fn reshape(snapshot: &ProvidersSnapshot) -> SeriesMap {
    let mut series = SeriesMap::default();

    for provider in &snapshot.providers {
        for sample in &provider.data {
            for (field, raw) in sample.value_fields() {
                let key = SeriesKey::for_field(&provider.name, field, provider.is_custom);
                series.push(SeriesPoint {
                    path: key.clone(),
                    key,
                    field_name: field.to_string(),
                    value: coerce_numeric(raw),
                    counter: sample.counter,
                    timestamp: sample.timestamp,
                    is_custom: provider.is_custom,
                });
            }
        }
    }

    series
}

/// Series currently drawn on the chart. Survives refetches untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet(BTreeSet<SeriesKey>);

impl SelectionSet {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Flip membership, returns the new state
    pub fn toggle(&mut self, key: SeriesKey) -> bool {
        if self.0.remove(key.as_str()) {
            false
        } else {
            self.0.insert(key);
            true
        }
    }

    pub fn set(&mut self, key: SeriesKey, selected: bool) {
        if selected {
            self.0.insert(key);
        } else {
            self.0.remove(key.as_str());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::{Provider, ProviderSample};
    use serde_json::json;

    fn snapshot(providers: Vec<Provider>) -> ProvidersSnapshot {
        ProvidersSnapshot {
            next_update_time: 5000,
            providers,
        }
    }

    #[test]
    fn test_builtin_provider_keys_by_field() {
        let snap = snapshot(vec![Provider::new(
            "CPU",
            false,
            vec![ProviderSample::new(1, 10.0, 100).with_field("usage", 55)],
        )]);

        let map = reshape(&snap);

        assert_eq!(map.len(), 1);
        let points = map.get("CPU.usage").unwrap();
        assert_eq!(
            points,
            &[SeriesPoint {
                key: SeriesKey::from("CPU.usage"),
                path: SeriesKey::from("CPU.usage"),
                field_name: "usage".to_string(),
                value: 55.0,
                counter: 10.0,
                timestamp: 100,
                is_custom: false,
            }]
        );
    }

    #[test]
    fn test_custom_provider_uses_provider_name() {
        let snap = snapshot(vec![Provider::new(
            "MyScript",
            true,
            vec![ProviderSample::new(1, 1.0, 100).with_field("result", 42)],
        )]);

        let map = reshape(&snap);

        assert_eq!(map.keys().collect::<Vec<_>>(), vec![&SeriesKey::from("MyScript")]);
        let point = &map.get("MyScript").unwrap()[0];
        assert_eq!(point.value, 42.0);
        assert!(point.is_custom);
        assert_eq!(map.is_custom("MyScript"), Some(true));
    }

    #[test]
    fn test_custom_provider_extra_fields_share_one_key() {
        let snap = snapshot(vec![Provider::new(
            "MyScript",
            true,
            vec![
                ProviderSample::new(1, 1.0, 100)
                    .with_field("result", 1)
                    .with_field("other", 2),
                ProviderSample::new(2, 1.0, 101).with_field("result", 3),
            ],
        )]);

        let map = reshape(&snap);

        assert_eq!(map.len(), 1);
        let points = map.get("MyScript").unwrap();
        let fields: Vec<(&str, f64)> = points
            .iter()
            .map(|p| (p.field_name.as_str(), p.value))
            .collect();
        assert_eq!(fields, vec![("result", 1.0), ("other", 2.0), ("result", 3.0)]);
    }

    #[test]
    fn test_point_count_matches_non_reserved_fields() {
        let snap = snapshot(vec![
            Provider::new(
                "Memory",
                false,
                vec![
                    ProviderSample::new(1, 5.0, 10)
                        .with_field("available", 100)
                        .with_field("committed", 200),
                    ProviderSample::new(2, 5.0, 20).with_field("available", 90),
                ],
            ),
            Provider::new("Disk", false, vec![ProviderSample::new(1, 7.0, 10)]),
            Provider::new(
                "Script",
                true,
                vec![ProviderSample::new(1, 1.0, 10).with_field("v", 1)],
            ),
        ]);

        let map = reshape(&snap);

        assert_eq!(map.point_count(), 4);
        assert_eq!(
            map.keys().map(SeriesKey::as_str).collect::<Vec<_>>(),
            vec!["Memory.available", "Memory.committed", "Script"]
        );
        assert!(!map.contains("Disk"));
        for key in map.keys() {
            assert!(!["id", "timestamp", "counter"].contains(&key.as_str()));
        }
    }

    #[test]
    fn test_invalid_values_become_zero() {
        let sample: ProviderSample = serde_json::from_value(json!({
            "id": 1, "counter": 2, "timestamp": 3,
            "bad": "not a number", "missing": null, "good": 7.5
        }))
        .unwrap();
        let snap = snapshot(vec![Provider::new("P", false, vec![sample])]);

        let map = reshape(&snap);

        assert_eq!(map.get("P.bad").unwrap()[0].value, 0.0);
        assert_eq!(map.get("P.missing").unwrap()[0].value, 0.0);
        assert_eq!(map.get("P.good").unwrap()[0].value, 7.5);
    }

    #[test]
    fn test_reshape_is_deterministic() {
        let snap = snapshot(vec![Provider::new(
            "CPU",
            false,
            vec![
                ProviderSample::new(1, 10.0, 100).with_field("usage", 55),
                ProviderSample::new(2, 11.0, 160).with_field("usage", 60),
            ],
        )]);

        assert_eq!(reshape(&snap), reshape(&snap));
        assert!(reshape(&ProvidersSnapshot::default()).is_empty());
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = SelectionSet::default();

        assert!(selection.toggle(SeriesKey::from("CPU.usage")));
        assert!(selection.contains("CPU.usage"));
        assert!(!selection.toggle(SeriesKey::from("CPU.usage")));
        assert!(selection.is_empty());

        selection.set(SeriesKey::from("Gone"), true);
        selection.set(SeriesKey::from("Gone"), true);
        assert_eq!(selection.len(), 1);
        selection.set(SeriesKey::from("Gone"), false);
        assert!(selection.is_empty());
    }
}
