use std::path::{Path, PathBuf};

pub(crate) use common::config::{
    ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer,
};
use common::{LogLevel, PlayerId};
use serde::{Deserialize, Serialize};

use crate::session_registry::SessionSettings;

pub const DEFAULT_CONFIG_FILE: &str = "grid_adventure.yaml";

pub fn get_config_manager(
    path: &Path,
) -> ConfigManager<FileContentConfigProvider, Config, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub log: LogConfig,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), String> {
        self.game.validate()?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub map_file: PathBuf,
    pub players: usize,
    pub seed: Option<u64>,
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<(), String> {
        if self.map_file.as_os_str().is_empty() {
            return Err("map_file must not be empty".to_string());
        }
        if self.players == 0 {
            return Err("players must be greater than 0".to_string());
        }
        if self.players > PlayerId::MAX_PLAYERS {
            return Err(format!("players must not exceed {}", PlayerId::MAX_PLAYERS));
        }
        Ok(())
    }
}

impl GameConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            map_file: self.map_file.clone(),
            players: self.players,
            seed: self.seed,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LogConfig {
    pub prefix: Option<String>,
    pub level: LogLevel,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_file: PathBuf::from("map.txt"),
            players: 2,
            seed: None,
        }
    }
}
