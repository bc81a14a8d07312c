// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial(env)]
fn btctl_timeout_defaults_to_thirty_seconds() {
    std::env::remove_var("BLUESNAP_BTCTL_TIMEOUT_MS");
    assert_eq!(btctl_timeout(), Duration::from_secs(30));
}

#[test]
#[serial(env)]
fn btctl_timeout_is_overridable() {
    std::env::set_var("BLUESNAP_BTCTL_TIMEOUT_MS", "250");
    assert_eq!(btctl_timeout(), Duration::from_millis(250));
    std::env::remove_var("BLUESNAP_BTCTL_TIMEOUT_MS");
}

#[test]
#[serial(env)]
fn garbage_override_falls_back_to_default() {
    std::env::set_var("BLUESNAP_HCICONFIG_TIMEOUT_MS", "soon");
    assert_eq!(hciconfig_timeout(), Duration::from_secs(5));
    std::env::remove_var("BLUESNAP_HCICONFIG_TIMEOUT_MS");
}
