use std::{collections::HashMap, sync::Arc};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::environment::Environment;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct HealthResponse {
    faults: HashMap<String, String>,
}

async fn health_check(Extension(record): Extension<Arc<Environment>>) -> Response {
    let faults = record.faults();

    if !faults.is_empty() {
        error!("Environment record has faults: {:?}", faults);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { faults }),
        )
            .into_response();
    }

    (StatusCode::OK, "OK").into_response()
}

pub(crate) fn health_routes(record: Arc<Environment>) -> Router {
    Router::new()
        .route("/up", get(|| async { "up" }))
        .route("/health", get(health_check).layer(Extension(record)))
}
