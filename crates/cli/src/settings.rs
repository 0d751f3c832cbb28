//! Environment configuration for the binary.

use anyhow::{Context, Result};
use clmm_provider_domain::{Address, FeePercent};
use clmm_provider_execution::provider::ProviderConfig;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Everything the binary reads from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Privileged identity.
    pub owner: Address,
    /// Provider construction data.
    pub provider: ProviderConfig,
    /// API listen address.
    pub bind_addr: SocketAddr,
    /// PostgreSQL URL; records stay in memory when absent.
    pub database_url: Option<String>,
    /// API keys and the identity each one acts as; empty leaves reads open.
    pub api_keys: Vec<(String, Address)>,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ProviderConfig::default();

        let provider = ProviderConfig {
            provider_address: parse_or(&lookup, "LP_CUSTODY", defaults.provider_address)?,
            position_manager: parse_or(&lookup, "LP_POSITION_MANAGER", defaults.position_manager)?,
            swap_router: parse_or(&lookup, "LP_SWAP_ROUTER", defaults.swap_router)?,
            settlement_asset: parse_or(
                &lookup,
                "LP_SETTLEMENT_ASSET",
                defaults.settlement_asset,
            )?,
            fee_percent: FeePercent::new(parse_or(
                &lookup,
                "LP_FEE_PERCENT",
                defaults.fee_percent.value(),
            )?),
            position_timeout_ms: parse_or::<u64>(
                &lookup,
                "LP_POSITION_TIMEOUT_SECS",
                defaults.position_timeout_ms / 1000,
            )?
            .saturating_mul(1000),
            max_events: parse_or(&lookup, "LP_MAX_EVENTS", defaults.max_events)?,
        };

        let api_keys = match lookup("LP_API_KEYS") {
            Some(raw) => parse_api_keys(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            owner: parse_or(&lookup, "LP_OWNER", Address::from_low_u64(1))?,
            provider,
            bind_addr: parse_or(&lookup, "LP_BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8080)))?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            api_keys,
        })
    }
}

/// Parses `key=address` pairs separated by commas.
fn parse_api_keys(raw: &str) -> Result<Vec<(String, Address)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(String, Address)> {
            let (key, address) = entry
                .split_once('=')
                .with_context(|| format!("LP_API_KEYS entry is not key=address: {entry}"))?;
            let key = key.trim();
            anyhow::ensure!(!key.is_empty(), "LP_API_KEYS entry has an empty key: {entry}");
            let address = address
                .trim()
                .parse()
                .with_context(|| format!("LP_API_KEYS entry has an invalid address: {entry}"))?;
            Ok((key.to_string(), address))
        })
        .collect()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
