use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cardholder::profile_store::BehaviorProfile;

// ============================================================
// Query params
// ============================================================

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ============================================================
// Requests
// ============================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub cardholder_id: i32,
    pub amount: f64,
    pub merchant_id: String,
    pub merchant_category: Option<String>,
    pub location: Option<String>,
    /// Defaults to the time of the request.
    pub date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCardholderRequest {
    pub name: String,
    pub card_number: String,
    pub account_number: String,
    pub behavior_profile: Option<BehaviorProfile>,
}

#[derive(Debug, Deserialize)]
pub struct ActionLogRequest {
    pub action: String,
    pub page: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

// ============================================================
// Responses
// ============================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub total_cardholders: i64,
    pub total_transactions: i64,
    pub open_cases: i64,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub total_transactions: i64,
    pub fraudulent_count: i64,
    pub suspicious_count: i64,
    /// Share of transactions decided Fraudulent, as a percentage rounded to
    /// two decimals.
    pub detection_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub transaction_id: i32,
    pub analysis_id: String,
    pub rule_score: Option<f64>,
    pub profile_score: Option<f64>,
    pub final_score: Option<f64>,
    pub decision: Option<String>,
    pub risk_level: Option<String>,
    pub flags: Vec<String>,
    pub case_created: bool,
    pub case_id: Option<i32>,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionEntry>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct TransactionEntry {
    pub transaction_id: i32,
    pub cardholder_id: i32,
    pub cardholder_name: String,
    pub amount: BigDecimal,
    pub merchant_id: String,
    pub location: Option<String>,
    pub date_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CasesResponse {
    pub cases: Vec<CaseEntry>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct CaseEntry {
    pub case_id: i32,
    pub transaction_id: i32,
    pub risk_level: String,
    pub status: String,
    pub audit_trail: Option<String>,
    pub amount: BigDecimal,
    pub merchant_id: String,
    pub location: Option<String>,
    pub cardholder_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CardholderResponse {
    pub cardholder_id: i32,
    pub name: String,
    pub card_number: String,
    pub account_number: String,
    pub behavior_profile: Option<BehaviorProfile>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CreateCardholderResponse {
    pub cardholder_id: i32,
}

#[derive(Debug, Serialize)]
pub struct ActionLogResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
