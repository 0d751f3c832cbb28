//! Request handlers.

use crate::auth::CallerIdentity;
use crate::error::ApiError;
use crate::models::{
    AccruedFeesResponse, AddLiquidityRequest, AddLiquidityResponse, EventsQuery,
    FeePercentResponse, HealthResponse, PositionResponse, PositionsResponse,
    SetFeePercentRequest, SetFeePercentResponse, parse_address,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use clmm_provider_domain::FeePercent;
use clmm_provider_execution::lifecycle::{AggregateStats, LifecycleEvent};
use tracing::info;

/// Health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        owner: state.provider.owner().to_string(),
        fee_percent: state.provider.fee_percent().await.value(),
    })
}

/// Current fee percentage.
pub async fn get_fee_percent(State(state): State<AppState>) -> Json<FeePercentResponse> {
    Json(FeePercentResponse {
        fee_percent: state.provider.fee_percent().await.value(),
    })
}

/// Changes the fee percentage. Owner only.
pub async fn set_fee_percent(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<SetFeePercentRequest>,
) -> Result<Json<SetFeePercentResponse>, ApiError> {
    let new = FeePercent::new(request.fee_percent);
    let old = state.provider.set_fee_percent(caller, new).await?;

    Ok(Json(SetFeePercentResponse {
        old_fee_percent: old.value(),
        fee_percent: new.value(),
    }))
}

/// Deposits a token pair for the caller.
pub async fn add_liquidity(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<AddLiquidityRequest>,
) -> Result<Json<AddLiquidityResponse>, ApiError> {
    let params = request.into_params()?;
    info!(
        caller = %caller,
        token_a = %params.token_a,
        token_b = %params.token_b,
        "Deposit requested"
    );

    let receipt = state.provider.add_liquidity(caller, params).await?;
    Ok(Json(AddLiquidityResponse::new(caller, &receipt)))
}

/// Position record stored for an identity.
pub async fn get_position(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<PositionResponse>, ApiError> {
    let owner = parse_address("owner", &owner)?;

    let record = state
        .provider
        .position(owner)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no position recorded for {owner}")))?;

    Ok(Json(PositionResponse::new(owner, &record)))
}

/// All stored position records.
pub async fn list_positions(
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, ApiError> {
    let records = state.provider.positions().await?;
    Ok(Json(PositionsResponse::new(&records)))
}

/// Fees retained for a token.
pub async fn get_accrued_fees(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<AccruedFeesResponse>, ApiError> {
    let token = parse_address("token", &token)?;

    Ok(Json(AccruedFeesResponse {
        token: token.to_string(),
        accrued: state.provider.accrued_fees(token).await.to_string(),
        custody_balance: state.provider.custody_balance(token).await.to_string(),
    }))
}

/// Lifecycle events, optionally for one actor.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<LifecycleEvent>>, ApiError> {
    let lifecycle = state.provider.lifecycle();
    let events = match query.actor {
        Some(actor) => lifecycle.get_events(&parse_address("actor", &actor)?).await,
        None => lifecycle.all_events().await,
    };
    Ok(Json(events))
}

/// Aggregate event counts.
pub async fn get_stats(State(state): State<AppState>) -> Json<AggregateStats> {
    Json(state.provider.lifecycle().get_aggregate_stats().await)
}
