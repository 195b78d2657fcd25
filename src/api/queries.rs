use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::cardholder::profile_store::decode_profile;

use super::types::*;

// ============================================================
// Health & Metrics
// ============================================================

pub async fn get_health(pool: &PgPool) -> eyre::Result<HealthResponse> {
    let (total_cardholders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cardholders")
        .fetch_one(pool)
        .await?;

    let (total_transactions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?;

    let (open_cases,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM case_management WHERE status = 'Pending'")
            .fetch_one(pool)
            .await?;

    Ok(HealthResponse {
        status: "ok".to_string(),
        total_cardholders,
        total_transactions,
        open_cases,
    })
}

pub async fn get_metrics(pool: &PgPool) -> eyre::Result<MetricsResponse> {
    let (total_transactions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?;

    let (fraudulent_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM fraud_detection_logs WHERE decision = 'Fraudulent'",
    )
    .fetch_one(pool)
    .await?;

    let (suspicious_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM fraud_detection_logs WHERE decision = 'Suspicious'",
    )
    .fetch_one(pool)
    .await?;

    let detection_rate = if total_transactions > 0 {
        let rate = fraudulent_count as f64 / total_transactions as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(MetricsResponse {
        total_transactions,
        fraudulent_count,
        suspicious_count,
        detection_rate,
    })
}

// ============================================================
// Transactions
// ============================================================

pub async fn get_transactions(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> eyre::Result<TransactionsResponse> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?;

    #[allow(clippy::type_complexity)]
    let rows: Vec<(
        i32,
        i32,
        String,
        BigDecimal,
        String,
        Option<String>,
        DateTime<Utc>,
        DateTime<Utc>,
    )> = sqlx::query_as(
        "SELECT t.transaction_id, t.cardholder_id, c.name, t.amount, t.merchant_id,
                t.location, t.date_time, t.created_at
         FROM transactions t
         JOIN cardholders c ON t.cardholder_id = c.cardholder_id
         ORDER BY t.date_time DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(TransactionsResponse {
        transactions: rows
            .into_iter()
            .map(
                |(
                    transaction_id,
                    cardholder_id,
                    cardholder_name,
                    amount,
                    merchant_id,
                    location,
                    date_time,
                    created_at,
                )| TransactionEntry {
                    transaction_id,
                    cardholder_id,
                    cardholder_name,
                    amount,
                    merchant_id,
                    location,
                    date_time,
                    created_at,
                },
            )
            .collect(),
        total,
        limit,
        offset,
    })
}

// ============================================================
// Cases
// ============================================================

pub async fn get_cases(pool: &PgPool, limit: i64, offset: i64) -> eyre::Result<CasesResponse> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM case_management")
        .fetch_one(pool)
        .await?;

    #[allow(clippy::type_complexity)]
    let rows: Vec<(
        i32,
        i32,
        String,
        String,
        Option<String>,
        BigDecimal,
        String,
        Option<String>,
        String,
        DateTime<Utc>,
    )> = sqlx::query_as(
        "SELECT cm.case_id, cm.transaction_id, cm.risk_level, cm.status, cm.audit_trail,
                t.amount, t.merchant_id, t.location, c.name, cm.created_at
         FROM case_management cm
         JOIN transactions t ON cm.transaction_id = t.transaction_id
         JOIN cardholders c ON t.cardholder_id = c.cardholder_id
         ORDER BY cm.created_at DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(CasesResponse {
        cases: rows
            .into_iter()
            .map(
                |(
                    case_id,
                    transaction_id,
                    risk_level,
                    status,
                    audit_trail,
                    amount,
                    merchant_id,
                    location,
                    cardholder_name,
                    created_at,
                )| CaseEntry {
                    case_id,
                    transaction_id,
                    risk_level,
                    status,
                    audit_trail,
                    amount,
                    merchant_id,
                    location,
                    cardholder_name,
                    created_at,
                },
            )
            .collect(),
        total,
        limit,
        offset,
    })
}

// ============================================================
// Cardholders
// ============================================================

pub async fn get_cardholder(
    pool: &PgPool,
    cardholder_id: i32,
) -> eyre::Result<Option<CardholderResponse>> {
    let row: Option<(
        i32,
        String,
        String,
        String,
        Option<serde_json::Value>,
        DateTime<Utc>,
    )> = sqlx::query_as(
        "SELECT cardholder_id, name, card_number, account_number, behavior_profile, created_at
         FROM cardholders WHERE cardholder_id = $1",
    )
    .bind(cardholder_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(cardholder_id, name, card_number, account_number, profile_json, created_at)| {
            CardholderResponse {
                cardholder_id,
                name,
                card_number,
                account_number,
                behavior_profile: decode_profile(cardholder_id, profile_json),
                created_at,
            }
        },
    ))
}
