// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file.
//!
//! The TOML file is parsed into [`FileConfig`] and validated once into
//! [`Settings`]. Nothing downstream sees unvalidated values.

use bluesnap_core::{
    AudioBackend, IdentitySnapshot, LaunchOptions, LinkTarget, MacAddress, MacAddressError,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field}: {source}")]
    InvalidMac {
        field: String,
        #[source]
        source: MacAddressError,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("identity.unique_suffix must be 1-8 characters, got {0}")]
    SuffixLength(usize),

    #[error("duplicate speaker name '{0}'")]
    DuplicateSpeaker(String),

    #[error("{0} must be at least 1 second")]
    IntervalTooShort(&'static str),
}

/// Log level names accepted in `[logging]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// Directive for `EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Raw file layout
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub identity: IdentityConfig,
    pub bluetooth: BluetoothConfig,
    pub snapcast: SnapcastConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    pub instance_name: String,
    pub friendly_name: String,
    #[serde(default)]
    pub unique_suffix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BluetoothConfig {
    #[serde(default = "default_adapter")]
    pub adapter: String,
    /// Seconds between connect attempts
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval: u64,
    /// Control tool driven over stdin
    #[serde(default = "default_control_tool")]
    pub control_tool: PathBuf,
    pub speaker: SpeakerConfig,
    #[serde(default)]
    pub known_speakers: Vec<SpeakerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeakerConfig {
    pub name: String,
    pub mac: String,
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapcastConfig {
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Milliseconds
    #[serde(default = "default_latency")]
    pub latency: u32,
    #[serde(default = "default_buffer_ms")]
    pub buffer_ms: u32,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub audio_backend: AudioBackend,
    #[serde(default)]
    pub audio_device: Option<String>,
    #[serde(default)]
    pub server_stream: Option<String>,
    /// Stream client executable
    #[serde(default = "default_client_binary")]
    pub binary: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Seconds between snapshots; floored at 5 by the publisher
    #[serde(default = "default_telemetry_interval")]
    pub interval: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval: default_telemetry_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
}

fn default_adapter() -> String {
    "hci0".to_string()
}

fn default_reconnect_interval() -> u64 {
    10
}

fn default_control_tool() -> PathBuf {
    PathBuf::from("bluetoothctl")
}

fn default_keepalive_interval() -> u64 {
    30
}

fn default_server_port() -> u16 {
    1704
}

fn default_control_port() -> u16 {
    1705
}

fn default_latency() -> u32 {
    80
}

fn default_buffer_ms() -> u32 {
    200
}

fn default_client_binary() -> PathBuf {
    PathBuf::from("snapclient")
}

fn default_telemetry_interval() -> u64 {
    15
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub identity: IdentitySnapshot,
    pub unique_suffix: Option<String>,
    pub adapter: String,
    pub reconnect_interval: Duration,
    pub control_tool: PathBuf,
    pub speaker: LinkTarget,
    /// Additional targets a switch may select
    pub known_speakers: Vec<LinkTarget>,
    pub client_binary: PathBuf,
    pub launch: LaunchOptions,
    pub control_port: u16,
    pub telemetry_interval: Duration,
    pub log_level: LogLevel,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        file.validate()
    }
}

fn non_empty(value: &str, field: &'static str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(field));
    }
    Ok(trimmed.to_string())
}

fn speaker_target(speaker: &SpeakerConfig, field: &str) -> Result<LinkTarget, ConfigError> {
    let name = non_empty(&speaker.name, "bluetooth speaker name")?;
    let address = MacAddress::parse(&speaker.mac).map_err(|source| ConfigError::InvalidMac {
        field: format!("{field}.mac"),
        source,
    })?;
    if speaker.keepalive_interval == 0 {
        return Err(ConfigError::IntervalTooShort("keepalive_interval"));
    }
    Ok(LinkTarget::new(name, address, speaker.keepalive_interval))
}

impl FileConfig {
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let instance_name = non_empty(&self.identity.instance_name, "identity.instance_name")?;
        let friendly_name = non_empty(&self.identity.friendly_name, "identity.friendly_name")?;
        let unique_suffix = match self.identity.unique_suffix.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.chars().count() > 8 => {
                return Err(ConfigError::SuffixLength(s.chars().count()))
            }
            Some(s) => Some(s.to_string()),
        };

        let bt = &self.bluetooth;
        if bt.reconnect_interval == 0 {
            return Err(ConfigError::IntervalTooShort("bluetooth.reconnect_interval"));
        }
        let speaker = speaker_target(&bt.speaker, "bluetooth.speaker")?;
        let mut seen = HashSet::from([speaker.name.to_lowercase()]);
        let mut known_speakers = Vec::with_capacity(bt.known_speakers.len());
        for (i, known) in bt.known_speakers.iter().enumerate() {
            let target = speaker_target(known, &format!("bluetooth.known_speakers[{i}]"))?;
            if !seen.insert(target.name.to_lowercase()) {
                return Err(ConfigError::DuplicateSpeaker(target.name));
            }
            known_speakers.push(target);
        }

        let sc = &self.snapcast;
        let server_host = non_empty(&sc.server_host, "snapcast.server_host")?;
        let display_name = match sc.client_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => instance_name.clone(),
        };
        if self.telemetry.interval == 0 {
            return Err(ConfigError::IntervalTooShort("telemetry.interval"));
        }

        Ok(Settings {
            identity: IdentitySnapshot {
                instance_name,
                friendly_name,
            },
            unique_suffix,
            adapter: non_empty(&bt.adapter, "bluetooth.adapter")?,
            reconnect_interval: Duration::from_secs(bt.reconnect_interval),
            control_tool: bt.control_tool.clone(),
            speaker,
            known_speakers,
            client_binary: sc.binary.clone(),
            launch: LaunchOptions {
                host: server_host,
                port: sc.server_port,
                latency_ms: sc.latency,
                buffer_ms: sc.buffer_ms,
                display_name,
                audio_backend: sc.audio_backend,
                audio_device: sc.audio_device.clone(),
                stream: sc.server_stream.clone(),
            },
            control_port: sc.control_port,
            telemetry_interval: Duration::from_secs(self.telemetry.interval),
            log_level: self.logging.level,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
