//! Host configuration

use crate::att::ATT_DEFAULT_MTU;
use log::warn;

/// Environment variable enabling multi-role operation
pub const ENV_MULTI_ROLE: &str = "BLUELINK_MULTI_ROLE";
/// Environment variable holding the MTU to request on connect, `0` disables it
pub const ENV_MTU: &str = "BLUELINK_MTU";

/// Default MTU requested when a connection comes up
pub const DEFAULT_PREFERRED_MTU: u16 = 256;

/// Host configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// A local GATT server shares the link; peer requests are left for it
    /// instead of being refused
    pub multi_role: bool,
    /// MTU requested as soon as a connection is established
    pub preferred_mtu: Option<u16>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            multi_role: false,
            preferred_mtu: Some(DEFAULT_PREFERRED_MTU),
        }
    }
}

impl HostConfig {
    /// Build a configuration from `BLUELINK_MULTI_ROLE` and `BLUELINK_MTU`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_MULTI_ROLE) {
            config.multi_role = !value.is_empty();
        }

        if let Some(value) = lookup(ENV_MTU) {
            match value.trim().parse::<u16>() {
                Ok(0) => config.preferred_mtu = None,
                Ok(mtu) if mtu >= ATT_DEFAULT_MTU => config.preferred_mtu = Some(mtu),
                _ => warn!("Ignoring {}={:?}", ENV_MTU, value),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HostConfig::from_lookup(lookup(&[]));
        assert_eq!(config, HostConfig::default());
        assert!(!config.multi_role);
        assert_eq!(config.preferred_mtu, Some(256));
    }

    #[test]
    fn test_env_overrides() {
        let config = HostConfig::from_lookup(lookup(&[(ENV_MULTI_ROLE, "1"), (ENV_MTU, "185")]));
        assert!(config.multi_role);
        assert_eq!(config.preferred_mtu, Some(185));

        let config = HostConfig::from_lookup(lookup(&[(ENV_MULTI_ROLE, ""), (ENV_MTU, "0")]));
        assert!(!config.multi_role);
        assert_eq!(config.preferred_mtu, None);
    }

    #[test]
    fn test_bad_mtu_keeps_default() {
        for value in ["abc", "12", "70000"] {
            let config = HostConfig::from_lookup(lookup(&[(ENV_MTU, value)]));
            assert_eq!(config.preferred_mtu, Some(DEFAULT_PREFERRED_MTU));
        }
    }
}
