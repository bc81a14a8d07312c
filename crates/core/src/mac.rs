// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bluetooth hardware address.
//!
//! Addresses are accepted in any letter case with surrounding whitespace and
//! always stored and displayed as six uppercase hex octets separated by
//! colons (`AA:BB:CC:DD:EE:FF`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a hardware address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacAddressError {
    #[error("expected six colon-separated octets, got {0} in '{1}'")]
    OctetCount(usize, String),
    #[error("invalid octet '{octet}' in '{input}'")]
    InvalidOctet { octet: String, input: String },
}

/// Canonical (uppercase) Bluetooth hardware address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    pub fn parse(input: &str) -> Result<Self, MacAddressError> {
        let cleaned = input.trim();
        let octets: Vec<&str> = cleaned.split(':').collect();
        if octets.len() != 6 {
            return Err(MacAddressError::OctetCount(
                octets.len(),
                cleaned.to_string(),
            ));
        }
        for octet in &octets {
            if octet.len() != 2 || !octet.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(MacAddressError::InvalidOctet {
                    octet: octet.to_string(),
                    input: cleaned.to_string(),
                });
            }
        }
        Ok(Self(cleaned.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against raw text
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = MacAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = MacAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
#[path = "mac_tests.rs"]
mod tests;
