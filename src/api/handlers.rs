use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::Utc;
use std::sync::Arc;

use crate::cardholder::profile_store::{CardholderRecord, NewCardholder};
use crate::db::repository;
use crate::transaction::types::CardTransaction;

use super::queries;
use super::types::*;
use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: msg.into(),
        }),
    )
}

fn is_unique_violation(err: &eyre::Report) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

// ============================================================
// Health & Metrics
// ============================================================

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    queries::get_health(&state.pool)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> ApiResult<MetricsResponse> {
    queries::get_metrics(&state.pool)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

// ============================================================
// Transaction analysis
// ============================================================

pub async fn analyze_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "amount must be a positive number",
        ));
    }
    if req.merchant_id.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "merchant_id must not be empty",
        ));
    }

    let amount = BigDecimal::try_from(req.amount)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid amount: {}", e)))?
        .with_scale_round(2, RoundingMode::HalfEven);

    let tx = CardTransaction {
        cardholder_id: req.cardholder_id,
        amount,
        merchant_id: req.merchant_id.trim().to_string(),
        merchant_category: req.merchant_category,
        location: req.location,
        date_time: req.date_time.unwrap_or_else(Utc::now),
    };

    let outcome = {
        let mut pipeline = state.pipeline.lock().await;
        pipeline
            .analyze(&state.pool, tx)
            .await
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    };

    let outcome = outcome.ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("cardholder {} not found", req.cardholder_id),
        )
    })?;

    let response = match outcome.breakdown {
        Some(breakdown) => AnalyzeResponse {
            transaction_id: outcome.transaction_id,
            analysis_id: format!("ANA{:06}", outcome.transaction_id),
            rule_score: Some(breakdown.rule_score),
            profile_score: Some(breakdown.profile_score),
            final_score: Some(breakdown.final_score),
            decision: Some(breakdown.decision.as_str().to_string()),
            risk_level: Some(breakdown.decision.risk_level().as_str().to_string()),
            flags: breakdown.flags,
            case_created: outcome.case_id.is_some(),
            case_id: outcome.case_id,
            analyzed_at: Utc::now(),
        },
        // Scoring disabled: the transaction is recorded, nothing is decided.
        None => AnalyzeResponse {
            transaction_id: outcome.transaction_id,
            analysis_id: format!("ANA{:06}", outcome.transaction_id),
            rule_score: None,
            profile_score: None,
            final_score: None,
            decision: None,
            risk_level: None,
            flags: Vec::new(),
            case_created: false,
            case_id: None,
            analyzed_at: Utc::now(),
        },
    };

    Ok(Json(response))
}

// ============================================================
// Transactions & Cases
// ============================================================

pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ApiResult<TransactionsResponse> {
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    queries::get_transactions(&state.pool, limit, offset)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn list_cases(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ApiResult<CasesResponse> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let offset = params.offset.unwrap_or(0).max(0);
    queries::get_cases(&state.pool, limit, offset)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

// ============================================================
// Cardholders
// ============================================================

pub async fn get_cardholder(
    State(state): State<Arc<AppState>>,
    Path(cardholder_id): Path<i32>,
) -> ApiResult<CardholderResponse> {
    let cardholder = queries::get_cardholder(&state.pool, cardholder_id)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    cardholder.map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("cardholder {} not found", cardholder_id),
        )
    })
}

pub async fn create_cardholder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCardholderRequest>,
) -> ApiResult<CreateCardholderResponse> {
    if req.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "name must not be empty"));
    }
    if req.card_number.is_empty() || req.card_number.len() > 16 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "card_number must be 1-16 characters",
        ));
    }

    let new = NewCardholder {
        name: req.name.trim().to_string(),
        card_number: req.card_number,
        account_number: req.account_number,
        behavior_profile: req.behavior_profile,
    };

    match repository::insert_cardholder(&state.pool, &new).await {
        Ok(cardholder_id) => {
            let mut pipeline = state.pipeline.lock().await;
            pipeline.profile_store.insert_memory(CardholderRecord {
                cardholder_id,
                name: new.name,
                card_number: new.card_number,
                account_number: new.account_number,
                profile: new.behavior_profile,
            });
            Ok(Json(CreateCardholderResponse { cardholder_id }))
        }
        Err(e) if is_unique_violation(&e) => Err(api_error(
            StatusCode::CONFLICT,
            "card number already registered",
        )),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

// ============================================================
// Client actions & assets
// ============================================================

pub async fn log_action(Json(req): Json<ActionLogRequest>) -> ApiResult<ActionLogResponse> {
    tracing::info!(
        action = %req.action,
        page = req.page.as_deref(),
        details = ?req.details,
        "Client action logged"
    );

    Ok(Json(ActionLogResponse {
        success: true,
        message: "Action logged successfully".to_string(),
    }))
}

pub async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        include_str!("../../assets/app.js"),
    )
}
