// HTTP request handlers
use crate::application::aggregate_service::AggregateError;
use crate::application::notifier::{Notification, Notifier};
use crate::application::refresh_scheduler::SchedulerStatus;
use crate::domain::aggregate::ProviderAggregate;
use crate::domain::chart::ChartDataset;
use crate::domain::config_document::ConfigDiagnostic;
use crate::domain::script::{Script, DEFAULT_SCRIPT_TEXT};
use crate::domain::series::{SelectionSet, SeriesKey, SeriesMap};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub backend: Option<String>,
    #[serde(flatten)]
    pub scheduler: SchedulerStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
    pub next_update_time: i64,
    pub series: SeriesMap,
    pub selected: SelectionSet,
}

#[derive(Deserialize)]
pub struct SelectionRequest {
    /// Absent means toggle
    pub selected: Option<bool>,
}

#[derive(Serialize)]
pub struct SelectionView {
    pub key: SeriesKey,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct AggregateView {
    pub key: String,
    pub aggregate: ProviderAggregate,
    /// Set when the refresh failed and `aggregate` is the last known value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct SinceQuery {
    pub since: Option<u64>,
}

#[derive(Deserialize)]
pub struct PortRequest {
    pub port: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigCheck {
    pub diagnostics: Vec<ConfigDiagnostic>,
    pub has_changed: bool,
}

#[derive(Deserialize)]
pub struct CounterQuery {
    #[serde(default)]
    pub filter: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusView> {
    Json(StatusView {
        backend: state.gateway.base_address(),
        scheduler: state.scheduler.status().await,
    })
}

/// Manual refresh; rearms polling on success
pub async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<StatusView> {
    state.scheduler.refresh().await?;
    Ok(status(State(state)).await)
}

pub async fn list_series(State(state): State<Arc<AppState>>) -> Json<SeriesView> {
    let dashboard = state.dashboard.read().await;
    Json(SeriesView {
        next_update_time: dashboard.next_update_time,
        series: dashboard.series.clone(),
        selected: dashboard.selection.clone(),
    })
}

pub async fn chart_datasets(State(state): State<Arc<AppState>>) -> Json<Vec<ChartDataset>> {
    Json(state.dashboard.read().await.datasets())
}

pub async fn set_selection(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectionRequest>,
) -> Json<SelectionView> {
    let key = SeriesKey::new(key);
    let mut dashboard = state.dashboard.write().await;
    let selected = match request.selected {
        Some(selected) => {
            dashboard.selection.set(key.clone(), selected);
            selected
        }
        None => dashboard.selection.toggle(key.clone()),
    };
    Json(SelectionView { key, selected })
}

pub async fn aggregate(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<AggregateView> {
    match state.aggregates.lookup(&key).await {
        Ok(aggregate) => Ok(Json(AggregateView {
            key,
            aggregate,
            error: None,
        })),
        Err(AggregateError::Gateway(e)) => match state.aggregates.cached(&key).await {
            Some(aggregate) => Ok(Json(AggregateView {
                key,
                aggregate,
                error: Some(e.to_string()),
            })),
            None => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn notifications(
    Query(query): Query<SinceQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<Notification>> {
    Json(state.notifications.since(query.since))
}

/// Point the dashboard at another backend port, then reload the series
pub async fn set_port(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PortRequest>,
) -> ApiResult<StatusView> {
    if !state.gateway.set_base_address(request.port).await? {
        let message = "Could not connect to server. Please confirm port.";
        state.notifications.error(message);
        return Err(ApiError::new(StatusCode::BAD_GATEWAY, message));
    }

    state.notifications.success("Server configured successfully");
    if let Err(e) = state.scheduler.refresh().await {
        tracing::warn!(error = %e, "Initial refresh after port change failed");
    }
    Ok(status(State(state)).await)
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    Ok(state.config_editor.load().await?)
}

pub async fn save_config(State(state): State<Arc<AppState>>, body: String) -> Result<String, ApiError> {
    Ok(state.config_editor.save(&body).await?)
}

pub async fn validate_config(State(state): State<Arc<AppState>>, body: String) -> Json<ConfigCheck> {
    Json(ConfigCheck {
        diagnostics: state.config_editor.validate(&body),
        has_changed: state.config_editor.has_changed(&body).await,
    })
}

pub async fn list_scripts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Script>> {
    Ok(Json(state.scripts.list().await?))
}

pub async fn get_script(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Script> {
    Ok(Json(state.scripts.find(&name).await?))
}

pub async fn create_script(
    State(state): State<Arc<AppState>>,
    Json(script): Json<Script>,
) -> Result<(StatusCode, Json<Script>), ApiError> {
    state.scripts.create(&script).await?;
    Ok((StatusCode::CREATED, Json(script)))
}

/// The name in the path wins over the one in the body; scripts are never renamed
pub async fn update_script(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(mut script): Json<Script>,
) -> ApiResult<Script> {
    script.name = name;
    state.scripts.update(&script).await?;
    Ok(Json(script))
}

pub async fn delete_script(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.scripts.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn script_template() -> Json<Script> {
    Json(Script::new("", DEFAULT_SCRIPT_TEXT, ""))
}

pub async fn counters(
    Query(query): Query<CounterQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<String>> {
    Ok(Json(state.scripts.counter_suggestions(&query.filter).await?))
}
