use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use nse_market_data::{
    AggregateResponse, IndexQuote, MarketStatus, Quote, SearchResponse, StockResponse,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[utoipa::path(get, path = "/api/market-status", responses((status = 200, description = "Exchange session state in IST")))]
pub async fn get_market_status(State(state): State<Arc<AppState>>) -> Json<MarketStatus> {
    Json(state.market.market_status())
}

#[utoipa::path(get, path = "/api/indices", responses((status = 200, description = "Benchmark and sector indices")))]
pub async fn get_indices(
    State(state): State<Arc<AppState>>,
) -> Json<Arc<AggregateResponse<IndexQuote>>> {
    Json(state.market.indices().await)
}

#[utoipa::path(get, path = "/api/stocks", responses((status = 200, description = "Leading stocks, largest moves first")))]
pub async fn get_stocks(State(state): State<Arc<AppState>>) -> Json<Arc<AggregateResponse<Quote>>> {
    Json(state.market.stocks().await)
}

#[utoipa::path(
    get,
    path = "/api/stock/{symbol}",
    params(("symbol" = String, Path, description = "Symbol; bare symbols are treated as NSE")),
    responses(
        (status = 200, description = "Single stock quote"),
        (status = 404, description = "Stock not found or data unavailable")
    )
)]
pub async fn get_stock(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StockResponse>> {
    state
        .market
        .stock(&symbol)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(get, path = "/api/gainers", responses((status = 200, description = "Top gainers")))]
pub async fn get_gainers(
    State(state): State<Arc<AppState>>,
) -> Json<Arc<AggregateResponse<Quote>>> {
    Json(state.market.gainers().await)
}

#[utoipa::path(get, path = "/api/losers", responses((status = 200, description = "Top losers")))]
pub async fn get_losers(State(state): State<Arc<AppState>>) -> Json<Arc<AggregateResponse<Quote>>> {
    Json(state.market.losers().await)
}

#[utoipa::path(
    get,
    path = "/api/search/{query}",
    params(("query" = String, Path, description = "Case-insensitive symbol fragment")),
    responses((status = 200, description = "Matching stocks"))
)]
pub async fn search_stocks(
    Path(query): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<SearchResponse> {
    Json(state.market.search(&query).await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market-status", get(get_market_status))
        .route("/indices", get(get_indices))
        .route("/stocks", get(get_stocks))
        .route("/stock/{symbol}", get(get_stock))
        .route("/gainers", get(get_gainers))
        .route("/losers", get(get_losers))
        .route("/search/{query}", get(search_stocks))
}
