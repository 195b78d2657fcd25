use serde::Serialize;

/// Outcome label attached to every scored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Fraudulent,
    Suspicious,
    Legitimate,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fraudulent => "Fraudulent",
            Self::Suspicious => "Suspicious",
            Self::Legitimate => "Legitimate",
        }
    }

    /// Whether this decision opens a review case.
    pub fn opens_case(&self) -> bool {
        !matches!(self, Self::Legitimate)
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Self::Fraudulent => RiskLevel::High,
            Self::Suspicious => RiskLevel::Medium,
            Self::Legitimate => RiskLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Full scoring result for one transaction, ready for DB insertion.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub rule_score: f64,
    pub profile_score: f64,
    pub final_score: f64,
    pub decision: Decision,
    pub flags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_labels() {
        assert_eq!(Decision::Fraudulent.as_str(), "Fraudulent");
        assert_eq!(Decision::Suspicious.as_str(), "Suspicious");
        assert_eq!(Decision::Legitimate.as_str(), "Legitimate");
    }

    #[test]
    fn test_case_opening_and_risk_mapping() {
        assert!(Decision::Fraudulent.opens_case());
        assert!(Decision::Suspicious.opens_case());
        assert!(!Decision::Legitimate.opens_case());

        assert_eq!(Decision::Fraudulent.risk_level(), RiskLevel::High);
        assert_eq!(Decision::Suspicious.risk_level(), RiskLevel::Medium);
        assert_eq!(Decision::Legitimate.risk_level(), RiskLevel::Low);
    }
}
