// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound control commands.
//!
//! Commands arrive from the control plane as a kind string plus a raw text
//! payload. They are parsed exactly once, here, into a tagged [`Command`];
//! nothing downstream inspects raw payloads.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Lowest and highest accepted volume percentage
pub const VOLUME_MIN: u8 = 0;
pub const VOLUME_MAX: u8 = 100;

/// A validated control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set volume, already clamped to 0..=100
    Volume(u8),
    Mute(bool),
    Reconnect,
    /// Switch the link to a pre-approved speaker by name
    SwitchTarget(String),
}

/// Errors from parsing a command payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("invalid volume payload '{0}': expected an integer")]
    InvalidVolume(String),
    #[error("invalid mute payload '{0}': expected on/off")]
    InvalidMute(String),
    #[error("invalid switch-target payload: {0}")]
    InvalidTarget(String),
}

#[derive(Deserialize)]
struct SwitchPayload {
    name: String,
}

impl Command {
    /// Parse a command from its kind and raw payload text
    pub fn parse(kind: &str, payload: &str) -> Result<Self, CommandParseError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "volume" => parse_volume(payload).map(Command::Volume),
            "mute" => parse_mute(payload).map(Command::Mute),
            "reconnect" => Ok(Command::Reconnect),
            "switch-target" | "switch_target" | "switch" => {
                parse_target(payload).map(Command::SwitchTarget)
            }
            other => Err(CommandParseError::UnknownCommand(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Volume(_) => "volume",
            Command::Mute(_) => "mute",
            Command::Reconnect => "reconnect",
            Command::SwitchTarget(_) => "switch-target",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Volume(v) => write!(f, "volume {}", v),
            Command::Mute(true) => f.write_str("mute on"),
            Command::Mute(false) => f.write_str("mute off"),
            Command::Reconnect => f.write_str("reconnect"),
            Command::SwitchTarget(name) => write!(f, "switch-target {}", name),
        }
    }
}

/// Clamp any integer into the volume range
pub fn clamp_volume(value: i64) -> u8 {
    value.clamp(VOLUME_MIN as i64, VOLUME_MAX as i64) as u8
}

fn parse_volume(payload: &str) -> Result<u8, CommandParseError> {
    let text = payload.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Ok(clamp_volume(value));
    }
    // Out-of-range integers still carry an unambiguous direction
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return Ok(if negative { VOLUME_MIN } else { VOLUME_MAX });
    }
    Err(CommandParseError::InvalidVolume(payload.to_string()))
}

fn parse_mute(payload: &str) -> Result<bool, CommandParseError> {
    match payload.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(CommandParseError::InvalidMute(payload.to_string())),
    }
}

fn parse_target(payload: &str) -> Result<String, CommandParseError> {
    let text = payload.trim();
    let name = if text.starts_with('{') {
        serde_json::from_str::<SwitchPayload>(text)
            .map_err(|e| CommandParseError::InvalidTarget(e.to_string()))?
            .name
    } else {
        text.to_string()
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandParseError::InvalidTarget(
            "speaker name is empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
