use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use log::info;

/// Application configuration, loaded from a TOML file next to the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub mqtt: MqttConfig,
    pub sounds: SoundConfig,
    pub channels: ChannelConfig,
}

/// Connection settings for the accelerometer feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub qos: u8,
    pub keep_alive: u16,
}

/// Where the sound effects live and which files make up the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    pub directory: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub sample_channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig::default(),
            sounds: SoundConfig::default(),
            channels: ChannelConfig::default(),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "localhost".to_string(),
            port: 1883,
            client_id: "shakeplay_client".to_string(),
            topic: "sensor/accelerometer".to_string(),
            qos: 1,
            keep_alive: 60,
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            directory: "sounds".to_string(),
            files: [
                "train.wav",
                "pew.wav",
                "monkey.wav",
                "kid_laugh.wav",
                "dial_tone.wav",
                "cow.wav",
                "laugh.wav",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            sample_channel_capacity: 5000,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// Loads the config file if it exists; otherwise writes the defaults
    /// out as a template and runs with them.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            let config = Self::default();
            config.save_to_file(path)?;
            info!("Wrote default configuration to {}", path.display());
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.sample_channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "Sample channel capacity must be positive".to_string(),
            ));
        }

        if self.mqtt.qos > 2 {
            return Err(ConfigError::ValidationError(
                "MQTT QoS must be 0, 1 or 2".to_string(),
            ));
        }

        if self.mqtt.keep_alive == 0 {
            return Err(ConfigError::ValidationError(
                "MQTT keep-alive must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn sounds_directory(&self) -> PathBuf {
        PathBuf::from(&self.sounds.directory)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
