// src/config/mod.rs
pub mod checker;

pub use checker::{CheckerConfig, LogFormat};

use std::path::PathBuf;

use crate::error::CheckerError;

pub const ENV_CONFIG_PATH: &str = "CHECKER_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/checker.toml";

/// Resolve config using env var + fallbacks:
/// 1) $CHECKER_CONFIG_PATH (must exist)
/// 2) config/checker.toml
/// 3) built-in defaults
pub fn load_default() -> Result<CheckerConfig, CheckerError> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return CheckerConfig::load_from_file(&pb);
        } else {
            return Err(CheckerError::Config(format!(
                "{ENV_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            )));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if toml_p.exists() {
        return CheckerConfig::load_from_file(&toml_p);
    }
    CheckerConfig::default().sanitized()
}
