//! Configuration for the claimer process.
//!
//! Values come from the environment once at startup and are immutable
//! afterwards. [`ClaimerConfig::from_lookup`] takes any key → value source so
//! tests never touch the process environment.

use std::fmt;

use serde::Serialize;

use crate::{constants, AirdropError, Result};

/// Network endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    /// Network name (e.g. "mainnet", "sepolia").
    pub name: String,
    /// Explicit JSON-RPC endpoint. Takes precedence over Infura.
    pub rpc_url: Option<String>,
    /// Infura project token, used with `name` when no `rpc_url` is set.
    pub infura_token: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_NETWORK.to_string(),
            rpc_url: None,
            infura_token: None,
        }
    }
}

impl NetworkConfig {
    /// Resolve the JSON-RPC endpoint to connect to.
    ///
    /// # Errors
    /// Returns [`AirdropError::Configuration`] when neither an explicit URL
    /// nor an Infura token is configured.
    pub fn rpc_url(&self) -> Result<String> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        match &self.infura_token {
            Some(token) => Ok(format!("https://{}.infura.io/v3/{token}", self.name)),
            None => Err(AirdropError::Configuration(
                "no RPC endpoint: set RPC_URL, or NETWORK and TOKEN".to_string(),
            )),
        }
    }
}

/// Process-wide claimer configuration.
///
/// Built only through [`ClaimerConfig::from_lookup`]; serializing it for logs
/// never includes the private key.
#[derive(Clone, Serialize)]
pub struct ClaimerConfig {
    /// Network endpoint.
    pub network: NetworkConfig,
    /// Address of the airdrop settlement contract.
    pub contract_address: String,
    /// Hex private key of the submitting wallet.
    #[serde(skip_serializing)]
    pub private_key: String,
    /// Replay guard capacity; `0` disables the guard.
    pub dedup_cache_size: usize,
    /// Call the contract's diagnostic views before each claim.
    pub preflight: bool,
}

impl ClaimerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key → value source.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| AirdropError::Configuration(format!("{key} is not set")))
        };

        let dedup_cache_size = match get("DEDUP_CACHE_SIZE") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                AirdropError::Configuration(format!("DEDUP_CACHE_SIZE `{raw}`: {e}"))
            })?,
            None => constants::DEFAULT_DEDUP_CACHE_SIZE,
        };
        let preflight = match get("AIRDROP_PREFLIGHT") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AirdropError::Configuration(format!("AIRDROP_PREFLIGHT `{raw}` is not a flag"))
            })?,
            None => false,
        };

        Ok(Self {
            network: NetworkConfig {
                name: get("NETWORK").unwrap_or_else(|| constants::DEFAULT_NETWORK.to_string()),
                rpc_url: get("RPC_URL"),
                infura_token: get("TOKEN"),
            },
            contract_address: require("AIRDROP_CONTRACT")?,
            private_key: require("PRIVATE_KEY")?,
            dedup_cache_size,
            preflight,
        })
    }

    /// Whether the replay guard should wrap the settlement binding.
    #[must_use]
    pub fn dedup_enabled(&self) -> bool {
        self.dedup_cache_size > 0
    }
}

impl fmt::Debug for ClaimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimerConfig")
            .field("network", &self.network)
            .field("contract_address", &self.contract_address)
            .field("private_key", &"<redacted>")
            .field("dedup_cache_size", &self.dedup_cache_size)
            .field("preflight", &self.preflight)
            .finish()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
