use bigdecimal::ToPrimitive;
use chrono::{Datelike, Timelike};

use crate::cardholder::profile_store::BehaviorProfile;
use crate::transaction::types::CardTransaction;

/// Merchant categories the scorers understand. Unknown input maps to Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerchantCategory {
    Retail,
    Online,
    Travel,
    Entertainment,
    Grocery,
    Gas,
    Other,
}

impl MerchantCategory {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "retail" => Self::Retail,
            "online" => Self::Online,
            "travel" => Self::Travel,
            "entertainment" => Self::Entertainment,
            "grocery" => Self::Grocery,
            "gas" => Self::Gas,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retail => "retail",
            Self::Online => "online",
            Self::Travel => "travel",
            Self::Entertainment => "entertainment",
            Self::Grocery => "grocery",
            Self::Gas => "gas",
            Self::Other => "other",
        }
    }
}

/// Inputs to the two scorers, extracted once per transaction.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub amount: f64,
    pub log_amount: f64,
    pub hour_of_day: u32,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u32,
    pub category: MerchantCategory,
    pub foreign_location: bool,
    /// Amount relative to the cardholder's average. None without a profile
    /// baseline.
    pub amount_ratio: Option<f64>,
    /// Whether the category is one the cardholder usually shops in. None when
    /// either the profile or the reported category is missing.
    pub usual_merchant: Option<bool>,
}

pub fn extract(tx: &CardTransaction, profile: Option<&BehaviorProfile>) -> FeatureVector {
    let amount = tx.amount.to_f64().unwrap_or(0.0);

    let category = tx
        .merchant_category
        .as_deref()
        .map(MerchantCategory::parse)
        .unwrap_or(MerchantCategory::Other);

    let foreign_location = tx
        .location
        .as_deref()
        .map(|l| l.to_ascii_lowercase().contains("foreign"))
        .unwrap_or(false);

    let amount_ratio = profile
        .filter(|p| p.avg_transaction > 0.0)
        .map(|p| amount / p.avg_transaction);

    let usual_merchant = match (profile, tx.merchant_category.as_deref()) {
        (Some(p), Some(_)) => Some(p.is_usual_merchant(category.as_str())),
        _ => None,
    };

    FeatureVector {
        amount,
        log_amount: amount.ln_1p(),
        hour_of_day: tx.date_time.hour(),
        weekday: tx.date_time.weekday().num_days_from_monday(),
        category,
        foreign_location,
        amount_ratio,
        usual_merchant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::{DateTime, Utc};
    use std::str::FromStr;

    fn tx(amount: &str, category: Option<&str>, location: Option<&str>) -> CardTransaction {
        CardTransaction {
            cardholder_id: 1,
            amount: BigDecimal::from_str(amount).unwrap(),
            merchant_id: "M-1001".to_string(),
            merchant_category: category.map(str::to_string),
            location: location.map(str::to_string),
            // A Friday, 14:30 UTC.
            date_time: DateTime::parse_from_rfc3339("2024-03-15T14:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn profile() -> BehaviorProfile {
        BehaviorProfile {
            avg_transaction: 85.50,
            usual_merchants: vec!["retail".to_string(), "grocery".to_string()],
        }
    }

    #[test]
    fn test_time_features() {
        let f = extract(&tx("25.00", None, None), None);
        assert_eq!(f.hour_of_day, 14);
        assert_eq!(f.weekday, 4); // Friday
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(MerchantCategory::parse("Online"), MerchantCategory::Online);
        assert_eq!(MerchantCategory::parse(" gas "), MerchantCategory::Gas);
        assert_eq!(MerchantCategory::parse("crypto"), MerchantCategory::Other);

        let f = extract(&tx("25.00", Some("travel"), None), None);
        assert_eq!(f.category, MerchantCategory::Travel);
        let f = extract(&tx("25.00", None, None), None);
        assert_eq!(f.category, MerchantCategory::Other);
    }

    #[test]
    fn test_foreign_location_flag() {
        let f = extract(&tx("25.00", None, Some("Foreign - Lagos")), None);
        assert!(f.foreign_location);
        let f = extract(&tx("25.00", None, Some("New York, NY")), None);
        assert!(!f.foreign_location);
        let f = extract(&tx("25.00", None, None), None);
        assert!(!f.foreign_location);
    }

    #[test]
    fn test_profile_features() {
        let p = profile();

        let f = extract(&tx("171.00", Some("online"), None), Some(&p));
        assert!((f.amount_ratio.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(f.usual_merchant, Some(false));

        let f = extract(&tx("50.00", Some("grocery"), None), Some(&p));
        assert_eq!(f.usual_merchant, Some(true));

        // No reported category: familiarity is unknown, not false.
        let f = extract(&tx("50.00", None, None), Some(&p));
        assert_eq!(f.usual_merchant, None);
    }

    #[test]
    fn test_no_baseline_without_profile() {
        let f = extract(&tx("500.00", Some("retail"), None), None);
        assert_eq!(f.amount_ratio, None);
        assert_eq!(f.usual_merchant, None);
        assert!((f.log_amount - 501.0_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_average_gives_no_ratio() {
        let p = BehaviorProfile {
            avg_transaction: 0.0,
            usual_merchants: vec![],
        };
        let f = extract(&tx("500.00", None, None), Some(&p));
        assert_eq!(f.amount_ratio, None);
    }
}
