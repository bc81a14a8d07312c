//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for running `bluesnap` and `bluesnapd` against an
//! isolated state directory with fake Bluetooth and stream client tools.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

// Aggressive timeouts for fast tests.
const BLUESNAP_TIMEOUT_IPC_MS: &str = "2000";
const BLUESNAP_BTCTL_TIMEOUT_MS: &str = "2000";

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn bluesnap_binary() -> PathBuf {
    binary_path("bluesnap")
}

pub fn bluesnapd_binary() -> PathBuf {
    binary_path("bluesnapd")
}

/// Create a CLI builder for bluesnap commands
pub fn cli() -> CliBuilder {
    CliBuilder::new(bluesnap_binary())
}

/// Create a CLI builder for the daemon binary (foreground runs)
pub fn daemon_cli() -> CliBuilder {
    CliBuilder::new(bluesnapd_binary())
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            envs: vec![
                ("BLUESNAP_TIMEOUT_IPC_MS".into(), BLUESNAP_TIMEOUT_IPC_MS.into()),
                ("BLUESNAP_BTCTL_TIMEOUT_MS".into(), BLUESNAP_BTCTL_TIMEOUT_MS.into()),
            ],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        // A developer's own config or state must never leak into a spec
        cmd.env_remove("BLUESNAP_CONFIG");
        cmd.env_remove("BLUESNAP_STATE_DIR");
        cmd.env_remove("RUST_LOG");

        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    /// Assert stdout equals expected exactly (with diff on failure)
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    /// Assert stderr equals expected exactly (with diff on failure)
    pub fn stderr_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stderr(), expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).expect("stdout should be JSON")
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Bridge
// =============================================================================

/// Control tool stand-in: reports a live link and two known peers for
/// every script it is fed. Sleeps first while a `slow` marker sits next to it.
const FAKE_BLUETOOTHCTL: &str = "cat >/dev/null
[ -e \"$(dirname \"$0\")/slow\" ] && sleep 1.5
echo 'Connected: yes'
echo 'Device 11:22:33:44:55:66 Patio'
echo 'Device AA:BB:CC:DD:EE:FF Kitchen'";

/// Stream client stand-in that idles until signalled
const FAKE_SNAPCLIENT: &str = "exec sleep 600";

/// Isolated bridge installation: config, fake tools, and state directory.
pub struct Bridge {
    dir: tempfile::TempDir,
    daemon: Option<Child>,
}

impl Bridge {
    /// Bridge with working fake tools
    pub fn new() -> Self {
        let bridge = Self {
            dir: tempfile::tempdir().unwrap(),
            daemon: None,
        };
        let tool = bridge.script("bin/bluetoothctl", FAKE_BLUETOOTHCTL);
        let client = bridge.script("bin/snapclient", FAKE_SNAPCLIENT);
        bridge.write_config(&tool, &client);
        bridge
    }

    /// Bridge whose configured stream client does not exist
    pub fn without_snapclient() -> Self {
        let bridge = Self {
            dir: tempfile::tempdir().unwrap(),
            daemon: None,
        };
        let tool = bridge.script("bin/bluetoothctl", FAKE_BLUETOOTHCTL);
        bridge.write_config(&tool, &bridge.path().join("bin/snapclient"));
        bridge
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("bluesnap.toml")
    }

    pub fn state_path(&self) -> PathBuf {
        self.path().join("state")
    }

    /// Make every following control tool run take longer than one IPC timeout
    pub fn slow_down_control_tool(&self) {
        std::fs::write(self.path().join("bin/slow"), "").unwrap();
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_path().join("daemon.sock")
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn write_config(&self, tool: &Path, client: &Path) {
        let config = format!(
            r#"
[identity]
instance_name = "bluesnap-spec"
friendly_name = "Spec Bridge"
unique_suffix = "spec"

[bluetooth]
adapter = "00:11:22:33:44:55"
control_tool = "{}"

[bluetooth.speaker]
name = "Kitchen"
mac = "aa:bb:cc:dd:ee:ff"

[[bluetooth.known_speakers]]
name = "Patio"
mac = "11:22:33:44:55:66"

[snapcast]
server_host = "127.0.0.1"
control_port = 1
binary = "{}"

[logging]
level = "debug"
"#,
            tool.display(),
            client.display()
        );
        std::fs::write(self.config_path(), config).unwrap();
    }

    /// Run bluesnap against this bridge's state directory
    pub fn bluesnap(&self) -> CliBuilder {
        cli().env("BLUESNAP_STATE_DIR", self.state_path())
    }

    /// Run bluesnapd in the foreground with this bridge's config
    pub fn bluesnapd(&self) -> CliBuilder {
        daemon_cli()
            .args(&["--config", &self.config_path().to_string_lossy()])
            .env("BLUESNAP_STATE_DIR", self.state_path())
    }

    /// Start the daemon in the background and wait for its socket
    pub fn start(&mut self) {
        let mut cmd = self.bluesnapd().command();
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        self.daemon = Some(cmd.spawn().expect("bluesnapd should spawn"));

        let socket = self.socket_path();
        assert!(
            wait_for(SPEC_WAIT_MAX_MS, || socket.exists()),
            "daemon socket never appeared\nlog:\n{}",
            self.daemon_log()
        );
    }

    /// Wait for the background daemon to exit, returning its exit code
    pub fn wait_exit(&mut self) -> Option<i32> {
        let mut child = self.daemon.take()?;
        let mut code = None;
        let exited = wait_for(SPEC_WAIT_MAX_MS, || match child.try_wait() {
            Ok(Some(status)) => {
                code = status.code();
                true
            }
            _ => false,
        });
        assert!(exited, "daemon did not exit\nlog:\n{}", self.daemon_log());
        code
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("bluesnapd.log"))
            .unwrap_or_else(|_| "(no daemon log)".to_string())
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(mut child) = self.daemon.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
