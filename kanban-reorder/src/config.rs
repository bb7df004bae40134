//! Engine configuration loaded with Figment.
//!
//! Sources in precedence order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `reorder.toml`, `reorder.yaml`, `reorder.json` in the board directory
//! 3. Environment variables prefixed `KANBAN_REORDER_`

use crate::error::{ReorderError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "KANBAN_REORDER_";

/// Base name of configuration files in the board directory
pub const CONFIG_FILE_STEM: &str = "reorder";

/// How ranks are rewritten after a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStrategy {
    /// Renumber every item of the affected lane whose position changed
    Dense,
    /// Write only the moved item, compacting when keys run out
    #[default]
    Sparse,
}

/// How a batch of writes is issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    #[default]
    Sequential,
    Parallel,
}

/// Tunables for the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rank_strategy: RankStrategy,
    pub write_mode: WriteMode,
    /// Upper bound on a single store write; exceeding it counts as a failure
    pub write_timeout_ms: u64,
    /// Sparse keys longer than this trigger a lane compaction
    pub max_rank_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rank_strategy: RankStrategy::Sparse,
            write_mode: WriteMode::Sequential,
            write_timeout_ms: 5_000,
            max_rank_len: 16,
        }
    }
}

impl EngineConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn with_rank_strategy(mut self, strategy: RankStrategy) -> Self {
        self.rank_strategy = strategy;
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_rank_len(mut self, len: usize) -> Self {
        self.max_rank_len = len;
        self
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.write_timeout_ms == 0 {
            return Err(ReorderError::config("write_timeout_ms must be greater than 0"));
        }
        if self.max_rank_len < 4 {
            return Err(ReorderError::config(format!(
                "max_rank_len must be at least 4, got {}",
                self.max_rank_len
            )));
        }
        Ok(())
    }
}

/// Load configuration for a board directory.
///
/// Missing files are skipped. `dir` of `None` reads only defaults and the
/// environment.
pub fn load_config(dir: Option<&Path>) -> Result<EngineConfig> {
    let mut figment = Figment::new().merge(Serialized::defaults(EngineConfig::default()));

    if let Some(dir) = dir {
        let toml = dir.join(format!("{CONFIG_FILE_STEM}.toml"));
        let yaml = dir.join(format!("{CONFIG_FILE_STEM}.yaml"));
        let json = dir.join(format!("{CONFIG_FILE_STEM}.json"));
        for path in [&toml, &yaml, &json] {
            if path.exists() {
                debug!(path = %path.display(), "loading config file");
            }
        }
        figment = figment
            .merge(Toml::file(toml))
            .merge(Yaml::file(yaml))
            .merge(Json::file(json));
    }

    let config: EngineConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
    config.validate()?;
    debug!(?config, "loaded engine config");
    Ok(config)
}
