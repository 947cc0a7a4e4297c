//! Generator configuration.
//!
//! Layered with figment, later layers winning:
//! 1. built-in defaults
//! 2. `lanesmith.toml` (or an explicit file)
//! 3. `LANESMITH_*` environment variables, `__` separating nested keys
//!    (`LANESMITH_LOGGING__FILTER=debug`)

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::codegen::BackendKind;
use crate::cpu::Microarchitecture;
use crate::error::{Error, Result};
use crate::schedule::TARGETS;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "lanesmith.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LANESMITH_";

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// What the generator emits and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root of the generated tree.
    pub output_dir: PathBuf,
    /// Target microarchitectures by name (`Haswell`, `CortexA9`, ...).
    pub targets: Vec<String>,
    /// Listing backends.
    pub backends: Vec<BackendKind>,
    /// Write `manifest.json`.
    pub manifest: bool,
    /// Logging.
    pub logging: LoggingConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            targets: TARGETS.iter().map(|m| m.name().to_string()).collect(),
            backends: BackendKind::ALL.to_vec(),
            manifest: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Layered provider, with `path` (or `lanesmith.toml`) as the file layer.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads and validates the configuration.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        tracing::debug!(
            targets = config.targets.len(),
            backends = config.backends.len(),
            output = %config.output_dir.display(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parses a TOML document over the defaults, without file or env layers.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(text))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to TOML, e.g. to write a starter file.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Rejects empty selections, unknown targets and an empty output path.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("output_dir must not be empty".to_string()));
        }
        if self.targets.is_empty() {
            return Err(Error::Config("at least one target is required".to_string()));
        }
        if self.backends.is_empty() {
            return Err(Error::Config("at least one backend is required".to_string()));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(Error::Config("logging.filter must not be empty".to_string()));
        }
        self.microarchitectures().map(|_| ())
    }

    /// Selected targets, in configuration order, duplicates removed.
    pub fn microarchitectures(&self) -> Result<Vec<Microarchitecture>> {
        let mut out = Vec::with_capacity(self.targets.len());
        for name in &self.targets {
            let microarch = Microarchitecture::from_name(name)
                .filter(|m| TARGETS.contains(m))
                .ok_or_else(|| {
                    let known: Vec<&str> = TARGETS.iter().map(|m| m.name()).collect();
                    Error::Config(format!("unknown target '{name}' (expected one of {})", known.join(", ")))
                })?;
            if !out.contains(&microarch) {
                out.push(microarch);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
