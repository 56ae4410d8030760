//! HTTP API
//!
//! `POST /execute-order` plans a market order against the current snapshot.
//! Planning runs one at a time behind the admission guard.

pub mod admission;

pub use admission::AdmissionGuard;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::planner::ExecutionPlanner;
use crate::core::types::{Order, PlanRequest};
use crate::db::ExchangeService;
use crate::error::{MetaExchangeError, MetaExchangeResult};
use crate::service::MarketOrderService;
use crate::sources::OrderBookFile;

#[derive(Clone)]
pub struct AppState {
    service: MarketOrderService,
    admission: Arc<AdmissionGuard>,
    timeout: Duration,
}

impl AppState {
    pub fn new(service: MarketOrderService, queue_limit: usize, timeout: Duration) -> Self {
        Self {
            service,
            admission: Arc::new(AdmissionGuard::new(queue_limit)),
            timeout,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteOrderResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub category: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/execute-order", post(execute_order))
        .with_state(state)
}

/// Build the service from config and serve until Ctrl+C
pub async fn serve(config: &Config, bind_override: Option<&str>) -> MetaExchangeResult<()> {
    let exchanges = ExchangeService::open(&config.database)?;
    let books = OrderBookFile::from_config(&config.order_books, None)?;
    info!("📖 Order books from {}", books.path().display());

    let service = MarketOrderService::new(
        Arc::new(books),
        Arc::new(exchanges),
        ExecutionPlanner::new(config.planner.tie_break),
    );
    let state = AppState::new(
        service,
        config.server.queue_limit,
        Duration::from_millis(config.server.request_timeout_ms),
    );

    let addr = bind_override.unwrap_or(config.server.bind_address.as_str());
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        MetaExchangeError::InvalidParameter("bind_address".to_string(), e.to_string())
    })?;
    info!("🚀 Meta exchange listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MetaExchangeError::Internal(e.to_string()))?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn execute_order(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<ExecuteOrderResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        MetaExchangeError::InvalidParameter("body".to_string(), rejection.body_text())
    })?;

    let run = async {
        let permit = state.admission.admit().await?;
        let service = state.service.clone();
        // The permit moves into the blocking task: a run that outlives its
        // request still holds the slot until it is done
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            service.place_market_order(request.amount, request.order_type)
        })
        .await?
    };

    let plan = tokio::time::timeout(state.timeout, run)
        .await
        .map_err(|_| MetaExchangeError::Timeout(state.timeout.as_millis() as u64))??;

    Ok(Json(ExecuteOrderResponse {
        orders: plan.orders,
    }))
}

/// `MetaExchangeError` as an HTTP response
pub struct ApiError(MetaExchangeError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MetaExchangeError::QueueFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            MetaExchangeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            err if err.category() == "validation" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MetaExchangeError> for ApiError {
    fn from(err: MetaExchangeError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("❌ {} ({})", self.0, self.0.category());
        } else {
            warn!("Rejected request: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
            category: self.0.category().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
