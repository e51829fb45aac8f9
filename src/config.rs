//! Runtime configuration — loaded from `config.toml`.
//!
//! Every field has a default matching the original plugin behavior, so a
//! partial (or absent) file always yields a working configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Hard cap on the per-tick restoration batch, however it is raised.
pub const MAX_BATCH_SIZE: usize = 20;
/// Hard cap on the per-player area quota, however it is adjusted.
pub const MAX_AREAS_CAP: u32 = 10;

/// Top-level config file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenConfig {
    pub regeneration: RegenerationConfig,
    pub area: AreaConfig,
    pub presence: PresenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegenerationConfig {
    /// How long a broken block stays gone before restoration, in millis.
    /// Fixed at 24 h in observed behavior; carried as a config constant.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Ledger records visited per scheduler tick.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Host ticks between periodic snapshot saves.
    #[serde(default = "default_save_interval")]
    pub save_interval: u32,
    /// Upper bound on pending restoration records.
    #[serde(default = "default_max_tracked_blocks")]
    pub max_tracked_blocks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AreaConfig {
    /// Build areas a single player may own.
    #[serde(default = "default_max_areas_per_player")]
    pub max_areas_per_player: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PresenceConfig {
    /// When true, actors are only tracked against areas they own.
    #[serde(default = "default_owner_only")]
    pub owner_only: bool,
}

fn default_delay_ms() -> u64 {
    24 * 60 * 60 * 1000
}
fn default_batch_size() -> usize {
    2
}
fn default_save_interval() -> u32 {
    6000
}
fn default_max_tracked_blocks() -> usize {
    10_000
}
fn default_max_areas_per_player() -> u32 {
    3
}
fn default_owner_only() -> bool {
    true
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            batch_size: default_batch_size(),
            save_interval: default_save_interval(),
            max_tracked_blocks: default_max_tracked_blocks(),
        }
    }
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            max_areas_per_player: default_max_areas_per_player(),
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            owner_only: default_owner_only(),
        }
    }
}

impl RegenConfig {
    /// Load config from a TOML file, writing the bundled default file
    /// first when none exists.
    pub fn load(path: &Path) -> Result<Self, String> {
        if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|e| format!("read config: {e}"))?;
            toml::from_str(&text).map_err(|e| format!("parse config: {e}"))
        } else {
            let default_toml = include_str!("../config.toml");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("create config dir: {e}"))?;
            }
            std::fs::write(path, default_toml)
                .map_err(|e| format!("write default config: {e}"))?;
            log::info!("oreregen: Created default config at {path:?}");
            toml::from_str(default_toml).map_err(|e| format!("parse default config: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_plugin() {
        let cfg = RegenConfig::default();
        assert_eq!(cfg.regeneration.delay_ms, 86_400_000);
        assert_eq!(cfg.regeneration.batch_size, 2);
        assert_eq!(cfg.regeneration.save_interval, 6000);
        assert_eq!(cfg.regeneration.max_tracked_blocks, 10_000);
        assert_eq!(cfg.area.max_areas_per_player, 3);
        assert!(cfg.presence.owner_only);
    }

    #[test]
    fn bundled_default_file_parses_to_the_defaults() {
        let cfg: RegenConfig = toml::from_str(include_str!("../config.toml")).unwrap();
        let defaults = RegenConfig::default();
        assert_eq!(cfg.regeneration.delay_ms, defaults.regeneration.delay_ms);
        assert_eq!(cfg.regeneration.batch_size, defaults.regeneration.batch_size);
        assert_eq!(cfg.area.max_areas_per_player, defaults.area.max_areas_per_player);
        assert_eq!(cfg.presence.owner_only, defaults.presence.owner_only);
    }

    #[test]
    fn partial_files_fall_back_per_field() {
        let cfg: RegenConfig = toml::from_str("[regeneration]\nbatch-size = 5\n").unwrap();
        assert_eq!(cfg.regeneration.batch_size, 5);
        assert_eq!(cfg.regeneration.delay_ms, 86_400_000);
        assert_eq!(cfg.area.max_areas_per_player, 3);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = RegenConfig::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.regeneration.batch_size, 2);
    }
}
