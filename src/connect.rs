//! Authenticated connection attempts against known targets.
//!
//! The workflow refuses to spawn anything without key material, and it
//! distrusts the connection tool: success requires both a clean exit and an
//! explicit affirmative marker in the output. Ambiguity is failure.

use crate::config::ToolConfig;
use crate::error::{Result, WifiError};
use crate::registry::TargetRegistry;
use crate::runner::{Cmd, CommandRunner};

pub struct ConnectWorkflow<'r, R: CommandRunner> {
    runner: &'r R,
    config: &'r ToolConfig,
    registry: &'r TargetRegistry,
}

impl<'r, R: CommandRunner> ConnectWorkflow<'r, R> {
    pub fn new(runner: &'r R, config: &'r ToolConfig, registry: &'r TargetRegistry) -> Self {
        Self {
            runner,
            config,
            registry,
        }
    }

    /// Attempt to join the access point stored under `essid`. Returns whether
    /// the connection tool reported success; the registry is never mutated.
    pub fn connect(&self, essid: &str) -> Result<bool> {
        let Some(target) = self.registry.get(essid) else {
            return Err(WifiError::MissingCredential(format!(
                "'{}' is not a known target",
                essid
            )));
        };
        let Some(password) = target.password.clone().filter(|p| !p.is_empty()) else {
            return Err(WifiError::MissingCredential(format!(
                "no password stored for '{}'",
                essid
            )));
        };

        tracing::info!("Connecting to {}", essid);
        let mut cmd = Cmd::new(&self.config.connect_tool)
            .arg(essid)
            .arg(password)
            .privileged();
        if !target.bssid.is_empty() {
            cmd = cmd.arg(&target.bssid);
        }
        let outcome = self.runner.run(&cmd)?;

        let connected = outcome.success() && reports_connected(&outcome.stdout);
        if connected {
            tracing::info!("Connected to {}", essid);
        } else {
            tracing::warn!("Connection to {} failed", essid);
        }
        Ok(connected)
    }
}

/// An affirmative outcome is a line reading `OK` or `CONNECTED`, or a
/// supplicant event line. Anything else does not count as success.
fn reports_connected(output: &str) -> bool {
    output.lines().map(str::trim).any(|line| {
        line.eq_ignore_ascii_case("ok")
            || line.eq_ignore_ascii_case("connected")
            || line.contains("CTRL-EVENT-CONNECTED")
    })
}
