use sqlx::PgPool;

use crate::cardholder::profile_store::{BehaviorProfile, CardholderProfileStore};
use crate::config::Config;
use crate::db::repository;
use crate::scoring::engine::{self, ScoringEngine};
use crate::scoring::types::ScoreBreakdown;
use crate::transaction::types::CardTransaction;

/// Result of analyzing one transaction.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub transaction_id: i32,
    /// None when scoring is disabled in config.
    pub breakdown: Option<ScoreBreakdown>,
    pub log_id: Option<i32>,
    pub case_id: Option<i32>,
}

/// Orchestrates the analysis flow for a submitted transaction:
/// 1. Cardholder resolution against the in-memory profile store
/// 2. Transaction insertion
/// 3. Scoring
/// 4. Detection logging and case creation
pub struct TransactionPipeline {
    pub profile_store: CardholderProfileStore,
    pub scoring_engine: ScoringEngine,
}

impl TransactionPipeline {
    /// Initialize the pipeline: load cardholder profiles and the scoring
    /// config.
    pub async fn init(pool: &PgPool, config: &Config) -> eyre::Result<Self> {
        let profile_store = CardholderProfileStore::load_from_db(pool).await?;
        let scoring_engine = ScoringEngine::new(config.scoring.clone());

        Ok(Self {
            profile_store,
            scoring_engine,
        })
    }

    /// Run the full analysis flow. Returns Ok(None) when the cardholder does
    /// not exist.
    pub async fn analyze(
        &mut self,
        pool: &PgPool,
        tx: CardTransaction,
    ) -> eyre::Result<Option<AnalysisOutcome>> {
        let profile = match self.resolve_cardholder(pool, tx.cardholder_id).await? {
            Some(profile) => profile,
            None => return Ok(None),
        };

        let transaction_id = repository::insert_transaction(pool, &tx).await?;

        if !self.scoring_engine.enabled() {
            tracing::debug!(transaction_id, "Scoring disabled, transaction recorded only");
            return Ok(Some(AnalysisOutcome {
                transaction_id,
                breakdown: None,
                log_id: None,
                case_id: None,
            }));
        }

        let breakdown = self.scoring_engine.evaluate(&tx, profile.as_ref());
        let log_id = engine::persist_detection(pool, transaction_id, &breakdown).await?;

        let case_id = if breakdown.decision.opens_case() {
            let risk = breakdown.decision.risk_level();
            let audit = format!(
                "Auto-opened: combined score {:.2} -> {}",
                breakdown.final_score,
                breakdown.decision.as_str()
            );
            let case_id =
                repository::insert_case(pool, transaction_id, risk.as_str(), &audit).await?;

            tracing::warn!(
                transaction_id,
                case_id,
                decision = breakdown.decision.as_str(),
                final_score = breakdown.final_score,
                flags = ?breakdown.flags,
                "FRAUD REVIEW CASE OPENED"
            );
            Some(case_id)
        } else {
            None
        };

        Ok(Some(AnalysisOutcome {
            transaction_id,
            breakdown: Some(breakdown),
            log_id: Some(log_id),
            case_id,
        }))
    }

    /// Resolve a cardholder's profile, falling back to the database for rows
    /// created after startup by another instance. Returns Ok(None) for an
    /// unknown cardholder; Ok(Some(None)) for a known cardholder without a
    /// profile.
    async fn resolve_cardholder(
        &mut self,
        pool: &PgPool,
        cardholder_id: i32,
    ) -> eyre::Result<Option<Option<BehaviorProfile>>> {
        if let Some(record) = self.profile_store.lookup(cardholder_id) {
            return Ok(Some(record.profile.clone()));
        }

        match repository::fetch_cardholder(pool, cardholder_id).await? {
            Some(record) => {
                let profile = record.profile.clone();
                self.profile_store.insert_memory(record);
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }
}
