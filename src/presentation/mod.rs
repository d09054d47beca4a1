// Presentation layer - Local HTTP API consumed by the browser
pub mod app_state;
pub mod error;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/status", get(status))
        .route("/refresh", post(refresh))
        .route("/series", get(list_series))
        .route("/chart", get(chart_datasets))
        .route("/selection/:key", put(set_selection))
        .route("/aggregates/:key", get(aggregate))
        .route("/notifications", get(notifications))
        .route("/server/port", put(set_port))
        .route("/config", get(get_config).put(save_config))
        .route("/config/validate", post(validate_config))
        .route("/scripts", get(list_scripts).post(create_script))
        .route(
            "/scripts/:name",
            get(get_script).patch(update_script).delete(delete_script),
        )
        .route("/script-template", get(script_template))
        .route("/counters", get(counters))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
