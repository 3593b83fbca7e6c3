//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use viewmeter_core::error::{MeterError, Result};

pub use schema::{MeterConfig, ServerSection, StoreSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<MeterConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        MeterError::Internal(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

/// Like [`load_from_file`], but a missing file yields the built-in defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<MeterConfig> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(_) => load_from_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found; using defaults");
            Ok(MeterConfig::default())
        }
        Err(e) => Err(MeterError::Internal(format!(
            "stat config {} failed: {e}",
            path.display()
        ))),
    }
}

pub fn load_from_str(s: &str) -> Result<MeterConfig> {
    let cfg: MeterConfig = serde_yaml::from_str(s)
        .map_err(|e| MeterError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
