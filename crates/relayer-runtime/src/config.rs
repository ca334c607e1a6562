//! Relayer configuration.
//!
//! Aggregates every subsystem config. Production values come from the
//! subsystem defaults; `RELAYER_*` environment variables override the knobs
//! operators actually turn.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rl_01_validator_cache::ValidatorCacheConfig;
use rl_02_light_client::LightClientConfig;
use rl_04_assembler::{AssemblerConfig, Direction};
use serde::{Deserialize, Serialize};
use shared_types::BlsPublicKey;

use crate::telemetry::TelemetryConfig;

/// Everything one relayer process needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerConfig {
    /// Chain A to Chain B assembler.
    pub a_to_b: AssemblerConfig,
    /// Chain B to Chain A assembler.
    pub b_to_a: AssemblerConfig,
    /// Chain A relayer roster cache.
    pub relayer_roster: ValidatorCacheConfig,
    /// Chain B validator roster cache.
    pub validator_roster: ValidatorCacheConfig,
    /// Chain A light client of Chain B.
    pub light_client: LightClientConfig,
    /// Log output.
    pub telemetry: TelemetryConfig,
}

impl RelayerConfig {
    /// Production defaults for the relayer voting with `local_bls_public_key`.
    pub fn new(local_bls_public_key: BlsPublicKey) -> Self {
        Self {
            a_to_b: AssemblerConfig::new(Direction::AToB, local_bls_public_key),
            b_to_a: AssemblerConfig::new(Direction::BToA, local_bls_public_key),
            relayer_roster: ValidatorCacheConfig::default(),
            validator_roster: ValidatorCacheConfig::default(),
            light_client: LightClientConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Create a config for testing.
    pub fn for_testing(local_bls_public_key: BlsPublicKey) -> Self {
        Self {
            a_to_b: AssemblerConfig::for_testing(Direction::AToB, local_bls_public_key),
            b_to_a: AssemblerConfig::for_testing(Direction::BToA, local_bls_public_key),
            relayer_roster: ValidatorCacheConfig::for_testing(),
            validator_roster: ValidatorCacheConfig::for_testing(),
            light_client: LightClientConfig::for_testing("chain-b_1017-1"),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Load configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `RELAYER_BLS_PUBLIC_KEY`: hex BLS key of this relayer (required)
    /// - `RELAYER_CHAIN_A_ID`: Chain A chain id (default: 56)
    /// - `RELAYER_CHAIN_B_ID`: Chain B chain id (default: chain-b_1017-1)
    /// - `RELAYER_TICK_INTERVAL_MS`: assembler tick (default: 500)
    /// - `RELAYER_SEQUENCE_UPDATE_LATENCY_SECS`: grace after rotation (default: 8)
    /// - `RELAYER_INTURN_TIMEOUT_SECS`: non-leader failover delay (default: 40)
    /// - `RELAYER_TX_DELAY_ALERT_SECS`: delay alert threshold (default: 300)
    /// - `RELAYER_ROSTER_REFRESH_SECS`: roster refresh interval (default: 60)
    /// - `RELAYER_HALT_ON_VERIFICATION_FAILURE`: latch light client failures (default: true)
    /// - `RELAYER_LOG_LEVEL`, `RELAYER_JSON_LOGS`: see [`TelemetryConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let key_hex = lookup("RELAYER_BLS_PUBLIC_KEY")
            .ok_or_else(|| anyhow!("RELAYER_BLS_PUBLIC_KEY is not set"))?;
        let local_key = BlsPublicKey::from_hex(&key_hex)
            .ok_or_else(|| anyhow!("RELAYER_BLS_PUBLIC_KEY is not a 48-byte hex key"))?;

        let mut config = Self::new(local_key);
        config.telemetry = TelemetryConfig::from_lookup(&lookup);

        if let Some(chain_a_id) = parse::<u64>(&lookup, "RELAYER_CHAIN_A_ID")? {
            config.a_to_b.chain_a_id = chain_a_id;
            config.b_to_a.chain_a_id = chain_a_id;
        }
        if let Some(chain_b_id) = lookup("RELAYER_CHAIN_B_ID") {
            config.light_client.chain_id = chain_b_id;
        }
        if let Some(ms) = parse::<u64>(&lookup, "RELAYER_TICK_INTERVAL_MS")? {
            for assembler in config.assemblers_mut() {
                assembler.tick_interval = Duration::from_millis(ms);
            }
        }
        if let Some(secs) = parse::<u64>(&lookup, "RELAYER_SEQUENCE_UPDATE_LATENCY_SECS")? {
            for assembler in config.assemblers_mut() {
                assembler.sequence_update_latency = Duration::from_secs(secs);
            }
        }
        if let Some(secs) = parse::<u64>(&lookup, "RELAYER_INTURN_TIMEOUT_SECS")? {
            for assembler in config.assemblers_mut() {
                assembler.inturn_relayer_timeout = Duration::from_secs(secs);
            }
        }
        if let Some(secs) = parse::<u64>(&lookup, "RELAYER_TX_DELAY_ALERT_SECS")? {
            for assembler in config.assemblers_mut() {
                assembler.tx_delay_alert_threshold = Duration::from_secs(secs);
            }
        }
        if let Some(secs) = parse::<u64>(&lookup, "RELAYER_ROSTER_REFRESH_SECS")? {
            config.relayer_roster.refresh_interval = Duration::from_secs(secs);
            config.validator_roster.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(halt) = parse::<bool>(&lookup, "RELAYER_HALT_ON_VERIFICATION_FAILURE")? {
            config.light_client.halt_on_verification_failure = halt;
        }

        Ok(config)
    }

    fn assemblers_mut(&mut self) -> [&mut AssemblerConfig; 2] {
        [&mut self.a_to_b, &mut self.b_to_a]
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{key}={raw:?}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY_HEX: &str = "0x070707070707070707070707070707070707070707070707070707070707070707070707070707070707070707070707";

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key: &str| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let config = RelayerConfig::from_lookup(lookup(&[("RELAYER_BLS_PUBLIC_KEY", KEY_HEX)])).unwrap();
        assert_eq!(config.a_to_b.local_bls_public_key, BlsPublicKey([7; 48]));
        assert_eq!(config.a_to_b.direction, Direction::AToB);
        assert_eq!(config.b_to_a.direction, Direction::BToA);
        assert_eq!(config.a_to_b.inturn_relayer_timeout, Duration::from_secs(40));
        assert_eq!(config.relayer_roster.refresh_interval, Duration::from_secs(60));
        assert!(config.light_client.halt_on_verification_failure);
    }

    #[test]
    fn test_overrides_apply_to_both_directions() {
        let config = RelayerConfig::from_lookup(lookup(&[
            ("RELAYER_BLS_PUBLIC_KEY", KEY_HEX),
            ("RELAYER_CHAIN_A_ID", "204"),
            ("RELAYER_CHAIN_B_ID", "chain-b_9000-1"),
            ("RELAYER_TICK_INTERVAL_MS", "250"),
            ("RELAYER_INTURN_TIMEOUT_SECS", "90"),
            ("RELAYER_HALT_ON_VERIFICATION_FAILURE", "false"),
        ]))
        .unwrap();

        for assembler in [&config.a_to_b, &config.b_to_a] {
            assert_eq!(assembler.chain_a_id, 204);
            assert_eq!(assembler.tick_interval, Duration::from_millis(250));
            assert_eq!(assembler.inturn_relayer_timeout, Duration::from_secs(90));
        }
        assert_eq!(config.light_client.chain_id, "chain-b_9000-1");
        assert!(!config.light_client.halt_on_verification_failure);
    }

    #[test]
    fn test_missing_or_bad_key_is_rejected() {
        assert!(RelayerConfig::from_lookup(lookup(&[])).is_err());
        assert!(RelayerConfig::from_lookup(lookup(&[("RELAYER_BLS_PUBLIC_KEY", "0xabcd")])).is_err());
    }

    #[test]
    fn test_unparsable_number_names_variable() {
        let err = RelayerConfig::from_lookup(lookup(&[
            ("RELAYER_BLS_PUBLIC_KEY", KEY_HEX),
            ("RELAYER_TICK_INTERVAL_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(format!("{err:#}").contains("RELAYER_TICK_INTERVAL_MS"));
    }

    #[test]
    fn test_config_serializes() {
        let config = RelayerConfig::for_testing(BlsPublicKey([1; 48]));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["a_to_b"]["tick_interval"], 50);
    }
}
