use crate::datasource::IndexerAuth;
use crate::domain::Contract;
use crate::engine::{SplitProfile, TierThresholds};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_INDEXER_BASE_URL: &str = "https://api.findlabs.io";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub indexer_base_url: String,
    pub indexer_api_key: Option<String>,
    pub indexer_user: Option<String>,
    pub indexer_pass: Option<String>,
    pub indexer_retry_max: Duration,
    pub flow_network: String,
    pub contract: Contract,
    pub split_profile: ProfileKind,
    pub tier_thresholds: TierThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Guild,
    Subs,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Guild => "guild",
            ProfileKind::Subs => "subs",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let indexer_base_url = ["INDEXER_BASE_URL", "FINDLABS_BASE", "FINDLABS_API_BASE"]
            .iter()
            .find_map(|key| non_empty(&env_map, key))
            .unwrap_or_else(|| DEFAULT_INDEXER_BASE_URL.to_string());

        let indexer_api_key = non_empty(&env_map, "INDEXER_API_KEY");
        let indexer_user = non_empty(&env_map, "INDEXER_USER");
        let indexer_pass = non_empty(&env_map, "INDEXER_PASS");
        if indexer_user.is_some() && indexer_pass.is_none() {
            return Err(ConfigError::MissingEnv("INDEXER_PASS".to_string()));
        }

        let indexer_retry_max = env_map
            .get("INDEXER_RETRY_MAX_MS")
            .map(|s| s.as_str())
            .unwrap_or("30000")
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "INDEXER_RETRY_MAX_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let flow_network =
            non_empty(&env_map, "FLOW_NETWORK").unwrap_or_else(|| "testnet".to_string());

        let contract = Contract::new(
            env_map
                .get("CONTRACT_ADDRESS")
                .map(|s| s.as_str())
                .unwrap_or("0xDeployer"),
            env_map
                .get("CONTRACT_NAME")
                .map(|s| s.as_str())
                .unwrap_or("SubscriptionManagerV2"),
        );

        let split_profile = match env_map
            .get("SPLIT_PROFILE")
            .map(|s| s.as_str())
            .unwrap_or("guild")
        {
            "guild" => ProfileKind::Guild,
            "subs" => ProfileKind::Subs,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SPLIT_PROFILE".to_string(),
                    format!("must be guild or subs, got {}", other),
                ))
            }
        };

        let tier_thresholds = match env_map.get("TIER_THRESHOLDS") {
            Some(raw) => parse_tier_thresholds(raw)?,
            None => TierThresholds::default(),
        };

        Ok(Config {
            port,
            indexer_base_url,
            indexer_api_key,
            indexer_user,
            indexer_pass,
            indexer_retry_max,
            flow_network,
            contract,
            split_profile,
            tier_thresholds,
        })
    }

    /// The configured profile with any threshold override applied.
    pub fn profile(&self) -> SplitProfile {
        let base = match self.split_profile {
            ProfileKind::Guild => SplitProfile::guild(),
            ProfileKind::Subs => SplitProfile::subs(),
        };
        base.with_thresholds(self.tier_thresholds)
    }

    /// API key wins over basic credentials.
    pub fn indexer_auth(&self) -> IndexerAuth {
        match (&self.indexer_api_key, &self.indexer_user, &self.indexer_pass) {
            (Some(key), _, _) => IndexerAuth::Bearer(key.clone()),
            (None, Some(user), Some(pass)) => IndexerAuth::Basic {
                user: user.clone(),
                pass: pass.clone(),
            },
            _ => IndexerAuth::None,
        }
    }
}

fn non_empty(env_map: &HashMap<String, String>, key: &str) -> Option<String> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn parse_tier_thresholds(raw: &str) -> Result<TierThresholds, ConfigError> {
    let invalid = || {
        ConfigError::InvalidValue(
            "TIER_THRESHOLDS".to_string(),
            format!("must be two ascending numbers \"low,high\", got {}", raw),
        )
    };
    let parts: Vec<f64> = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;
    match parts.as_slice() {
        [mid, high] if mid.is_finite() && high.is_finite() && mid <= high => Ok(TierThresholds {
            mid: *mid,
            high: *high,
        }),
        _ => Err(invalid()),
    }
}
