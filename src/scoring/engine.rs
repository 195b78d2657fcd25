use sqlx::PgPool;

use crate::cardholder::profile_store::BehaviorProfile;
use crate::config::ScoringConfig;
use crate::transaction::types::CardTransaction;

use super::features;
use super::rules;
use super::types::{Decision, ScoreBreakdown};

/// The fraud scoring engine. Runs both sub-scorers against a transaction and
/// maps the combined score to a decision.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Score one transaction against the cardholder's behavior profile.
    pub fn evaluate(
        &self,
        tx: &CardTransaction,
        profile: Option<&BehaviorProfile>,
    ) -> ScoreBreakdown {
        let features = features::extract(tx, profile);

        let mut flags = Vec::new();
        let rule_score = rules::amount_rule_score(&features, &mut flags);
        let profile_score = rules::profile_deviation_score(&features, &mut flags);
        let final_score = (rule_score + profile_score) / 2.0;

        ScoreBreakdown {
            rule_score,
            profile_score,
            final_score,
            decision: self.decide(final_score),
            flags,
        }
    }

    /// Map a combined score to a decision using the configured thresholds.
    pub fn decide(&self, final_score: f64) -> Decision {
        if final_score >= self.config.fraud_threshold {
            Decision::Fraudulent
        } else if final_score >= self.config.suspicious_threshold {
            Decision::Suspicious
        } else {
            Decision::Legitimate
        }
    }
}

/// Insert a fraud detection log row. Returns the log id.
pub async fn persist_detection(
    pool: &PgPool,
    transaction_id: i32,
    breakdown: &ScoreBreakdown,
) -> eyre::Result<i32> {
    let flags: Vec<&str> = breakdown.flags.iter().map(|s| s.as_str()).collect();

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO fraud_detection_logs
             (transaction_id, rule_score, profile_score, final_score, decision, flags)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING log_id",
    )
    .bind(transaction_id)
    .bind(breakdown.rule_score)
    .bind(breakdown.profile_score)
    .bind(breakdown.final_score)
    .bind(breakdown.decision.as_str())
    .bind(&flags)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}
