use super::features::{FeatureVector, MerchantCategory};

const BASE_SCORE: f64 = 0.10;
const SCORE_CAP: f64 = 0.95;

// Absolute amount tiers.
const AMOUNT_HIGH: f64 = 1000.0;
const AMOUNT_MID: f64 = 500.0;
const AMOUNT_LOW: f64 = 100.0;

// Amount-to-average ratio tiers.
const RATIO_EXTREME: f64 = 10.0;
const RATIO_HIGH: f64 = 5.0;
const RATIO_ELEVATED: f64 = 2.0;

/// Hours 00:00..=05:59 count as night-time activity.
const NIGHT_END_HOUR: u32 = 5;

/// Score a transaction on absolute amount and merchant channel.
/// Appends a flag for every rule that fires.
pub fn amount_rule_score(features: &FeatureVector, flags: &mut Vec<String>) -> f64 {
    let mut score = BASE_SCORE;

    if features.amount > AMOUNT_HIGH {
        score += 0.40;
        flags.push(format!("amount_{:.0}_over_{:.0}", features.amount, AMOUNT_HIGH));
    } else if features.amount > AMOUNT_MID {
        score += 0.20;
        flags.push(format!("amount_{:.0}_over_{:.0}", features.amount, AMOUNT_MID));
    } else if features.amount > AMOUNT_LOW {
        score += 0.10;
        flags.push(format!("amount_{:.0}_over_{:.0}", features.amount, AMOUNT_LOW));
    }

    if features.category == MerchantCategory::Online {
        score += 0.20;
        flags.push("online_merchant".to_string());
    }

    score.clamp(0.0, SCORE_CAP)
}

/// Score a transaction on deviation from the cardholder's behavior profile:
/// spend relative to their average, merchant familiarity, time of day, and
/// location. Without a profile baseline, falls back to a mild amount-only
/// signal.
pub fn profile_deviation_score(features: &FeatureVector, flags: &mut Vec<String>) -> f64 {
    let mut score = BASE_SCORE;

    match features.amount_ratio {
        Some(ratio) if ratio >= RATIO_EXTREME => {
            score += 0.40;
            flags.push(format!("amount_{:.1}x_usual_spend", ratio));
        }
        Some(ratio) if ratio >= RATIO_HIGH => {
            score += 0.25;
            flags.push(format!("amount_{:.1}x_usual_spend", ratio));
        }
        Some(ratio) if ratio >= RATIO_ELEVATED => {
            score += 0.10;
            flags.push(format!("amount_{:.1}x_usual_spend", ratio));
        }
        Some(_) => {}
        None => {
            score += (features.log_amount / 25.0).min(0.20);
        }
    }

    if features.usual_merchant == Some(false) {
        score += 0.15;
        flags.push(format!("unfamiliar_merchant_{}", features.category.as_str()));
    }

    if features.hour_of_day <= NIGHT_END_HOUR {
        score += 0.10;
        flags.push(format!("night_hour_{:02}", features.hour_of_day));
    }

    if features.foreign_location {
        score += 0.15;
        flags.push("foreign_location".to_string());
    }

    score.clamp(0.0, SCORE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(amount: f64) -> FeatureVector {
        FeatureVector {
            amount,
            log_amount: amount.ln_1p(),
            hour_of_day: 14,
            weekday: 4,
            category: MerchantCategory::Retail,
            foreign_location: false,
            amount_ratio: None,
            usual_merchant: None,
        }
    }

    #[test]
    fn test_amount_tiers() {
        let mut flags = Vec::new();
        assert!((amount_rule_score(&features(50.0), &mut flags) - 0.10).abs() < 1e-9);
        assert!(flags.is_empty());

        assert!((amount_rule_score(&features(250.0), &mut flags) - 0.20).abs() < 1e-9);
        assert!((amount_rule_score(&features(750.0), &mut flags) - 0.30).abs() < 1e-9);
        assert!((amount_rule_score(&features(1500.0), &mut flags) - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_online_merchant_adds() {
        let mut f = features(1500.0);
        f.category = MerchantCategory::Online;
        let mut flags = Vec::new();
        let score = amount_rule_score(&f, &mut flags);
        assert!((score - 0.70).abs() < 1e-9);
        assert!(flags.iter().any(|s| s == "online_merchant"));
    }

    #[test]
    fn test_ratio_tiers() {
        let mut flags = Vec::new();

        let mut f = features(200.0);
        f.amount_ratio = Some(1.5);
        assert!((profile_deviation_score(&f, &mut flags) - 0.10).abs() < 1e-9);

        f.amount_ratio = Some(3.0);
        assert!((profile_deviation_score(&f, &mut flags) - 0.20).abs() < 1e-9);

        f.amount_ratio = Some(6.0);
        assert!((profile_deviation_score(&f, &mut flags) - 0.35).abs() < 1e-9);

        f.amount_ratio = Some(12.0);
        assert!((profile_deviation_score(&f, &mut flags) - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_deviation_signals_stack() {
        let mut f = features(1200.0);
        f.amount_ratio = Some(14.0);
        f.usual_merchant = Some(false);
        f.category = MerchantCategory::Online;
        f.hour_of_day = 2;
        f.foreign_location = true;

        let mut flags = Vec::new();
        let score = profile_deviation_score(&f, &mut flags);
        assert!((score - 0.90).abs() < 1e-9);
        assert_eq!(flags.len(), 4);
    }

    #[test]
    fn test_no_profile_fallback_is_mild() {
        let mut flags = Vec::new();
        let score = profile_deviation_score(&features(5000.0), &mut flags);
        // Fallback contribution is capped at 0.20 over base.
        assert!(score <= 0.30 + 1e-9);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_scores_never_exceed_cap() {
        let mut f = features(100_000.0);
        f.amount_ratio = Some(1000.0);
        f.usual_merchant = Some(false);
        f.category = MerchantCategory::Online;
        f.hour_of_day = 0;
        f.foreign_location = true;

        let mut flags = Vec::new();
        assert!(amount_rule_score(&f, &mut flags) <= SCORE_CAP);
        assert!(profile_deviation_score(&f, &mut flags) <= SCORE_CAP);
    }
}
