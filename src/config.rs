//! Configuration for the accounting subsystem.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MeteringError, Result};
use crate::units::{UnitSize, DEFAULT_DOC_UNIT_SIZE_BYTES};

/// Environment variable that overrides
/// [`MeteringConfig::measure_operation_resource_consumption`].
pub const MEASURE_ENV_VAR: &str = "OPMETER_MEASURE_RESOURCE_CONSUMPTION";

/// Settings for per-operation resource accounting.
///
/// Loaded from TOML; every key is optional:
///
/// ```toml
/// measure_operation_resource_consumption = true
/// document_unit_size_bytes = 128
/// slow_op_threshold_ms = 100
/// empty_document_when_disabled = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeteringConfig {
    /// Process-wide toggle for measurement.
    pub measure_operation_resource_consumption: bool,
    /// Bytes per document unit.
    pub document_unit_size_bytes: u64,
    /// Operations slower than this are written to the slow-operation log.
    pub slow_op_threshold_ms: u64,
    /// Attach an empty `operationMetrics` document to profiler entries of
    /// operations that ran with measurement disabled.
    pub empty_document_when_disabled: bool,
}

impl Default for MeteringConfig {
    fn default() -> Self {
        Self {
            measure_operation_resource_consumption: false,
            document_unit_size_bytes: DEFAULT_DOC_UNIT_SIZE_BYTES,
            slow_op_threshold_ms: 100,
            empty_document_when_disabled: false,
        }
    }
}

impl MeteringConfig {
    /// Configuration with measurement switched on and default sizes.
    pub fn enabled() -> Self {
        Self {
            measure_operation_resource_consumption: true,
            ..Self::default()
        }
    }

    /// Reads a TOML file and applies the environment override.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| MeteringError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| MeteringError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        config.with_env_override()
    }

    /// Parses TOML without consulting the environment.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| MeteringError::Parse {
            origin: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies [`MEASURE_ENV_VAR`] if it is set.
    pub fn with_env_override(self) -> Result<Self> {
        let value = std::env::var(MEASURE_ENV_VAR).ok();
        self.with_override(value.as_deref())
    }

    /// Applies an override value for the measurement toggle.
    ///
    /// Accepts `1`/`true`/`on`/`yes` and `0`/`false`/`off`/`no`,
    /// case-insensitively. `None` leaves the toggle unchanged.
    pub fn with_override(mut self, value: Option<&str>) -> Result<Self> {
        if let Some(raw) = value {
            self.measure_operation_resource_consumption = parse_flag(raw).ok_or_else(|| {
                MeteringError::InvalidConfig(format!(
                    "{MEASURE_ENV_VAR}: unrecognized value '{raw}'"
                ))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Rejects settings the accounting core cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.document_unit_size_bytes == 0 {
            return Err(MeteringError::InvalidConfig(
                "document_unit_size_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Document unit size, falling back to the default for an invalid value.
    pub fn unit_size(&self) -> UnitSize {
        UnitSize::new(self.document_unit_size_bytes).unwrap_or_default()
    }

    /// Slow-operation threshold as a [`Duration`].
    pub fn slow_op_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_op_threshold_ms)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
