use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

/// A card transaction ready for DB insertion and scoring.
#[derive(Debug, Clone)]
pub struct CardTransaction {
    pub cardholder_id: i32,
    pub amount: BigDecimal,
    pub merchant_id: String,
    /// Category the client reported for this merchant. Feeds the feature
    /// vector only; the persisted column is the merchant identifier.
    pub merchant_category: Option<String>,
    pub location: Option<String>,
    pub date_time: DateTime<Utc>,
}
