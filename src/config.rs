use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

// ============================================================
// Scoring Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Combined score at or above this opens a High-risk case.
    #[serde(default = "default_fraud_threshold")]
    pub fraud_threshold: f64,
    /// Combined score at or above this opens a Medium-risk case.
    #[serde(default = "default_suspicious_threshold")]
    pub suspicious_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fraud_threshold: 0.7,
            suspicious_threshold: 0.3,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fraud_threshold() -> f64 {
    0.7
}

fn default_suspicious_threshold() -> f64 {
    0.3
}

// ============================================================
// API Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_host")]
    pub host: String,
    pub seed_cardholders_path: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
            host: "0.0.0.0".to_string(),
            seed_cardholders_path: None,
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        let scoring = &self.scoring;
        if scoring.fraud_threshold <= 0.0 || scoring.fraud_threshold > 1.0 {
            return Err(eyre::eyre!(
                "fraud_threshold must be in (0, 1], got {}",
                scoring.fraud_threshold
            ));
        }
        if scoring.suspicious_threshold <= 0.0 || scoring.suspicious_threshold > 1.0 {
            return Err(eyre::eyre!(
                "suspicious_threshold must be in (0, 1], got {}",
                scoring.suspicious_threshold
            ));
        }
        if scoring.suspicious_threshold >= scoring.fraud_threshold {
            return Err(eyre::eyre!(
                "suspicious_threshold ({}) must be below fraud_threshold ({})",
                scoring.suspicious_threshold,
                scoring.fraud_threshold
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[database]
url = "postgres://localhost/test"
max_connections = 5

[scoring]
fraud_threshold = 0.8
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.scoring.fraud_threshold, 0.8);
        assert_eq!(config.scoring.suspicious_threshold, 0.3); // default
        assert!(config.scoring.enabled); // default
        assert_eq!(config.api.port, 3000); // default
    }

    #[test]
    fn test_defaults_validate() {
        let toml_str = r#"
[database]
url = "postgres://localhost/test"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.fraud_threshold, 0.7);
        assert_eq!(config.scoring.suspicious_threshold, 0.3);
    }

    #[test]
    fn test_validate_inverted_thresholds() {
        let config = Config {
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 5,
            },
            scoring: ScoringConfig {
                enabled: true,
                fraud_threshold: 0.3,
                suspicious_threshold: 0.7,
            },
            api: ApiConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_out_of_range() {
        let config = Config {
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 5,
            },
            scoring: ScoringConfig {
                enabled: true,
                fraud_threshold: 1.5,
                suspicious_threshold: 0.3,
            },
            api: ApiConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}
