//! Runtime configuration read from the environment.
//!
//! | variable           | default | meaning                                   |
//! |--------------------|---------|-------------------------------------------|
//! | `MIXER_TREE_DEPTH` | `20`    | depth of the commitment tree and circuit  |
//! | `MIXER_KEYS_DIR`   | `keys`  | where withdraw circuit keys are kept      |
//! | `MIXER_LOG`        | `info`  | `tracing` filter directive                |

use std::path::PathBuf;

use thiserror::Error;

use mixer_circuits::{DEFAULT_DEPTH, MAX_DEPTH};

pub const TREE_DEPTH_VAR: &str = "MIXER_TREE_DEPTH";
pub const KEYS_DIR_VAR: &str = "MIXER_KEYS_DIR";
pub const LOG_VAR: &str = "MIXER_LOG";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{}={0:?} is not a non-negative integer", TREE_DEPTH_VAR)]
    InvalidDepth(String),
    #[error("{}={0} exceeds the maximum depth of {}", TREE_DEPTH_VAR, MAX_DEPTH)]
    DepthTooLarge(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub tree_depth: usize,
    pub keys_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree_depth: DEFAULT_DEPTH,
            keys_dir: PathBuf::from("keys"),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or empty variables
    /// take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let tree_depth = match get(TREE_DEPTH_VAR) {
            Some(raw) => {
                let depth = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidDepth(raw.clone()))?;
                if depth > MAX_DEPTH {
                    return Err(ConfigError::DepthTooLarge(depth));
                }
                depth
            }
            None => defaults.tree_depth,
        };

        Ok(Self {
            tree_depth,
            keys_dir: get(KEYS_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.keys_dir),
            log_filter: get(LOG_VAR).unwrap_or(defaults.log_filter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]).unwrap(), Config::default());
        assert_eq!(config(&[]).unwrap().tree_depth, 20);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            (TREE_DEPTH_VAR, "16"),
            (KEYS_DIR_VAR, "/var/lib/mixer"),
            (LOG_VAR, "mixer_prover=debug"),
        ])
        .unwrap();

        assert_eq!(cfg.tree_depth, 16);
        assert_eq!(cfg.keys_dir, PathBuf::from("/var/lib/mixer"));
        assert_eq!(cfg.log_filter, "mixer_prover=debug");
    }

    #[test]
    fn test_empty_value_uses_default() {
        assert_eq!(config(&[(TREE_DEPTH_VAR, "")]).unwrap().tree_depth, DEFAULT_DEPTH);
    }

    #[test]
    fn test_invalid_depth() {
        assert_eq!(
            config(&[(TREE_DEPTH_VAR, "-1")]),
            Err(ConfigError::InvalidDepth("-1".to_string()))
        );
        assert_eq!(
            config(&[(TREE_DEPTH_VAR, "33")]),
            Err(ConfigError::DepthTooLarge(33))
        );
    }
}
