use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::pipeline::{run_forecast, ForecastRequest};
use crate::source::PanelSource;

/// Shared handle for request handlers: where prices come from and the
/// defaults applied to omitted request fields.
#[derive(Clone)]
pub struct ServerState {
    source: Arc<dyn PanelSource + Send + Sync>,
    defaults: ForecastConfig,
}

impl ServerState {
    pub fn new(source: Arc<dyn PanelSource + Send + Sync>, defaults: ForecastConfig) -> Self {
        Self { source, defaults }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastBody {
    pub ticker: String,
    pub lags: Option<usize>,
    pub horizon: Option<usize>,
    #[serde(alias = "per_rows")]
    pub row_window: Option<usize>,
}

impl ForecastBody {
    fn into_request(self, defaults: &ForecastConfig) -> ForecastRequest {
        let mut req = defaults.request(&self.ticker);
        if let Some(v) = self.lags {
            req.lags = v;
        }
        if let Some(v) = self.horizon {
            req.horizon = v;
        }
        if let Some(v) = self.row_window {
            req.row_window = v;
        }
        req
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorBody { detail })).into_response()
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/forecast", post(forecast))
        .with_state(state)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn forecast(
    State(state): State<ServerState>,
    Json(body): Json<ForecastBody>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let request = body.into_request(&state.defaults);
    tracing::info!(
        %request_id,
        ticker = %request.ticker,
        lags = request.lags,
        horizon = request.horizon,
        "Forecast request"
    );

    let source = Arc::clone(&state.source);
    let joined =
        tokio::task::spawn_blocking(move || run_forecast(source.as_ref(), &request)).await;

    match joined {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(e)) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(%request_id, error = %e, "Forecast failed");
            } else {
                tracing::warn!(%request_id, error = %e, "Forecast rejected");
            }
            let detail = if status.is_server_error() {
                format!("Internal error: {}", e)
            } else {
                e.to_string()
            };
            error_response(status, detail)
        }
        Err(e) => {
            tracing::error!(%request_id, error = %e, "Forecast task aborted");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", e),
            )
        }
    }
}

pub fn status_for(error: &ForecastError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub async fn serve(addr: SocketAddr, state: ServerState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, source = %state.source.describe(), "Forecast API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Ctrl+C received");
        })
        .await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
