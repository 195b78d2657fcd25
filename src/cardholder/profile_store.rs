use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

/// Spending profile stored per cardholder. The column is JSONB but the only
/// observed fields are a numeric average and a list of merchant categories,
/// so it is decoded into a typed record rather than handled as an opaque
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub avg_transaction: f64,
    #[serde(default)]
    pub usual_merchants: Vec<String>,
}

impl BehaviorProfile {
    /// Whether a merchant category is one the cardholder usually shops in.
    pub fn is_usual_merchant(&self, category: &str) -> bool {
        self.usual_merchants
            .iter()
            .any(|m| m.eq_ignore_ascii_case(category))
    }
}

/// A cardholder row as loaded into memory.
#[derive(Debug, Clone)]
pub struct CardholderRecord {
    pub cardholder_id: i32,
    pub name: String,
    pub card_number: String,
    pub account_number: String,
    pub profile: Option<BehaviorProfile>,
}

/// A cardholder to be created (API or seed file).
#[derive(Debug, Clone, Deserialize)]
pub struct NewCardholder {
    pub name: String,
    pub card_number: String,
    pub account_number: String,
    pub behavior_profile: Option<BehaviorProfile>,
}

/// In-memory index of cardholders keyed by id, so the scoring path does not
/// re-query the profile for every transaction.
pub struct CardholderProfileStore {
    by_id: HashMap<i32, CardholderRecord>,
}

impl CardholderProfileStore {
    /// Load all cardholders from the database into memory.
    pub async fn load_from_db(pool: &PgPool) -> eyre::Result<Self> {
        let rows: Vec<(i32, String, String, String, Option<serde_json::Value>)> = sqlx::query_as(
            "SELECT cardholder_id, name, card_number, account_number, behavior_profile
             FROM cardholders",
        )
        .fetch_all(pool)
        .await?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for (cardholder_id, name, card_number, account_number, profile_json) in rows {
            let profile = decode_profile(cardholder_id, profile_json);
            by_id.insert(
                cardholder_id,
                CardholderRecord {
                    cardholder_id,
                    name,
                    card_number,
                    account_number,
                    profile,
                },
            );
        }

        tracing::info!(cardholders = by_id.len(), "Loaded cardholder profile store");
        Ok(Self { by_id })
    }

    /// Look up a cardholder by id. Returns None if unknown.
    pub fn lookup(&self, cardholder_id: i32) -> Option<&CardholderRecord> {
        self.by_id.get(&cardholder_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Insert a record into the in-memory store (after DB insertion).
    pub fn insert_memory(&mut self, record: CardholderRecord) {
        self.by_id.insert(record.cardholder_id, record);
    }

    /// Seed a cardholder into the database and the in-memory store,
    /// idempotently on card number. Returns the cardholder id.
    pub async fn seed_cardholder(
        &mut self,
        pool: &PgPool,
        new: &NewCardholder,
    ) -> eyre::Result<i32> {
        let profile_json = new
            .behavior_profile
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row: (i32,) = sqlx::query_as(
            "INSERT INTO cardholders (name, card_number, account_number, behavior_profile)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (card_number) DO UPDATE
             SET name = $1, account_number = $3, behavior_profile = $4
             RETURNING cardholder_id",
        )
        .bind(&new.name)
        .bind(&new.card_number)
        .bind(&new.account_number)
        .bind(profile_json)
        .fetch_one(pool)
        .await?;

        self.insert_memory(CardholderRecord {
            cardholder_id: row.0,
            name: new.name.clone(),
            card_number: new.card_number.clone(),
            account_number: new.account_number.clone(),
            profile: new.behavior_profile.clone(),
        });

        Ok(row.0)
    }
}

/// Decode a stored profile document, tolerating malformed rows.
pub fn decode_profile(
    cardholder_id: i32,
    value: Option<serde_json::Value>,
) -> Option<BehaviorProfile> {
    let value = value?;
    match serde_json::from_value(value) {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(cardholder_id, error = %e, "Malformed behavior profile, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_round_trip() {
        let json = r#"{"avg_transaction": 85.50, "usual_merchants": ["retail", "grocery"]}"#;
        let profile: BehaviorProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.avg_transaction, 85.50);
        assert_eq!(profile.usual_merchants, vec!["retail", "grocery"]);

        let back = serde_json::to_value(&profile).unwrap();
        let again: BehaviorProfile = serde_json::from_value(back).unwrap();
        assert_eq!(again, profile);
    }

    #[test]
    fn test_profile_missing_merchants_defaults_empty() {
        let json = r#"{"avg_transaction": 42.0}"#;
        let profile: BehaviorProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.avg_transaction, 42.0);
        assert!(profile.usual_merchants.is_empty());
    }

    #[test]
    fn test_is_usual_merchant_case_insensitive() {
        let profile = BehaviorProfile {
            avg_transaction: 85.5,
            usual_merchants: vec!["retail".to_string(), "grocery".to_string()],
        };
        assert!(profile.is_usual_merchant("Retail"));
        assert!(profile.is_usual_merchant("grocery"));
        assert!(!profile.is_usual_merchant("online"));
    }

    #[test]
    fn test_decode_malformed_profile_is_none() {
        let value = serde_json::json!({"avg_transaction": "not a number"});
        assert!(decode_profile(1, Some(value)).is_none());
        assert!(decode_profile(1, None).is_none());
    }
}
