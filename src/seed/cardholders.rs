use sqlx::PgPool;

use crate::cardholder::profile_store::{CardholderProfileStore, NewCardholder};

/// Seed cardholders from a JSON file into the cardholders table and the
/// in-memory profile store. Existing card numbers are updated in place.
pub async fn seed_cardholders(
    pool: &PgPool,
    store: &mut CardholderProfileStore,
    path: &str,
) -> eyre::Result<u64> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("Failed to read cardholder seed file '{}': {}", path, e))?;

    let cardholders: Vec<NewCardholder> = serde_json::from_str(&content)
        .map_err(|e| eyre::eyre!("Failed to parse cardholder seed JSON: {}", e))?;

    let mut count = 0u64;

    for cardholder in &cardholders {
        if cardholder.card_number.is_empty() {
            return Err(eyre::eyre!(
                "Seed cardholder '{}' has an empty card number",
                cardholder.name
            ));
        }

        let cardholder_id = store.seed_cardholder(pool, cardholder).await?;
        tracing::debug!(
            cardholder_id,
            name = %cardholder.name,
            "Seeded cardholder"
        );
        count += 1;
    }

    tracing::info!(count, "Cardholders seeded from JSON");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file_format() {
        let json = r#"
        [
            {
                "name": "Mike Brown",
                "card_number": "4333333333333333",
                "account_number": "ACC003",
                "behavior_profile": {
                    "avg_transaction": 120.00,
                    "usual_merchants": ["entertainment", "gas"]
                }
            },
            {
                "name": "Ana Torres",
                "card_number": "4444444444444444",
                "account_number": "ACC004"
            }
        ]
        "#;

        let cardholders: Vec<NewCardholder> = serde_json::from_str(json).unwrap();
        assert_eq!(cardholders.len(), 2);
        assert_eq!(cardholders[0].name, "Mike Brown");
        let profile = cardholders[0].behavior_profile.as_ref().unwrap();
        assert_eq!(profile.avg_transaction, 120.00);
        assert_eq!(profile.usual_merchants, vec!["entertainment", "gas"]);
        assert!(cardholders[1].behavior_profile.is_none());
    }
}
