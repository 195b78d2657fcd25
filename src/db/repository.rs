use sqlx::PgPool;

use crate::cardholder::profile_store::{decode_profile, CardholderRecord, NewCardholder};
use crate::transaction::types::CardTransaction;

/// Insert a transaction row. Returns the generated transaction id.
/// Fails with an FK violation if the cardholder does not exist.
pub async fn insert_transaction(pool: &PgPool, tx: &CardTransaction) -> eyre::Result<i32> {
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO transactions (cardholder_id, amount, merchant_id, location, date_time)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING transaction_id",
    )
    .bind(tx.cardholder_id)
    .bind(&tx.amount)
    .bind(&tx.merchant_id)
    .bind(&tx.location)
    .bind(tx.date_time)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Insert a cardholder. Returns the generated id.
/// Fails with a unique violation on a duplicate card number.
pub async fn insert_cardholder(pool: &PgPool, new: &NewCardholder) -> eyre::Result<i32> {
    let profile_json = new
        .behavior_profile
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO cardholders (name, card_number, account_number, behavior_profile)
         VALUES ($1, $2, $3, $4)
         RETURNING cardholder_id",
    )
    .bind(&new.name)
    .bind(&new.card_number)
    .bind(&new.account_number)
    .bind(profile_json)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Fetch one cardholder row. Returns None if unknown.
pub async fn fetch_cardholder(
    pool: &PgPool,
    cardholder_id: i32,
) -> eyre::Result<Option<CardholderRecord>> {
    let row: Option<(i32, String, String, String, Option<serde_json::Value>)> = sqlx::query_as(
        "SELECT cardholder_id, name, card_number, account_number, behavior_profile
         FROM cardholders WHERE cardholder_id = $1",
    )
    .bind(cardholder_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(cardholder_id, name, card_number, account_number, profile_json)| CardholderRecord {
            cardholder_id,
            name,
            card_number,
            account_number,
            profile: decode_profile(cardholder_id, profile_json),
        },
    ))
}

/// Open a review case for a transaction. Returns the case id; status takes
/// the schema default 'Pending'.
pub async fn insert_case(
    pool: &PgPool,
    transaction_id: i32,
    risk_level: &str,
    audit_trail: &str,
) -> eyre::Result<i32> {
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO case_management (transaction_id, risk_level, audit_trail)
         VALUES ($1, $2, $3)
         RETURNING case_id",
    )
    .bind(transaction_id)
    .bind(risk_level)
    .bind(audit_trail)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}
