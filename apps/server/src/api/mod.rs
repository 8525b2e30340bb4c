mod market;

use std::{any::Any as PanicPayload, sync::Arc};

use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::Config, error::ApiError, main_lib::AppState};

/// Version of the public API contract, independent of the crate version.
pub const API_VERSION: &str = "1.0";

/// Public endpoints with a short description, as listed by `/`.
pub const ENDPOINTS: [(&str, &str); 7] = [
    ("/api/indices", "Get all NSE indices"),
    ("/api/stocks", "Get NIFTY 50 stocks"),
    ("/api/stock/{symbol}", "Get specific stock data"),
    ("/api/market-status", "Get market status"),
    ("/api/gainers", "Get top gainers"),
    ("/api/losers", "Get top losers"),
    ("/api/search/{query}", "Search for stocks"),
];

#[derive(Serialize)]
struct ApiInfo {
    name: &'static str,
    version: &'static str,
    status: &'static str,
    endpoints: serde_json::Map<String, serde_json::Value>,
}

#[utoipa::path(get, path = "/", responses((status = 200, description = "API information")))]
async fn api_info() -> Json<ApiInfo> {
    let endpoints = ENDPOINTS
        .iter()
        .map(|(path, description)| (path.to_string(), (*description).into()))
        .collect();
    Json(ApiInfo {
        name: "NSE Data API",
        version: API_VERSION,
        status: "active",
        endpoints,
    })
}

#[utoipa::path(get, path = "/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api_info,
        healthz,
        market::get_market_status,
        market::get_indices,
        market::get_stocks,
        market::get_stock,
        market::get_gainers,
        market::get_losers,
        market::search_stocks
    ),
    tags((name = "nse"))
)]
pub struct ApiDoc;

fn handle_panic(err: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);
    ApiError::Internal("Internal server error".to_string()).into_response()
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/", get(api_info))
        .route("/healthz", get(healthz))
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .nest("/api", market::router())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
