//! Monitor/managed mode lifecycle for wireless interfaces.
//!
//! Entering monitor mode usually renames the interface, and the control tool
//! announces the new name unreliably. The manager snapshots the inventory
//! before and after the transition and reconciles the announcement against the
//! set difference, so callers always learn the name the OS actually created.
//! Half-completed transitions are reported, not rolled back: the underlying
//! tools are not transactional, so the manager's only guarantee is a fresh
//! inventory in every outcome.

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::ToolConfig;
use crate::error::{Result, WifiError};
use crate::runner::{Cmd, CommandRunner};
use crate::{inventory, rfkill};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceMode {
    Managed,
    Monitor,
}

/// Result of a completed toggle. `interfaces` is queried after the last
/// mutation, so callers never act on stale state.
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    pub mode: InterfaceMode,
    /// OS-assigned monitor interface name; set only when entering monitor mode.
    pub monitor_name: Option<String>,
    pub interfaces: BTreeMap<String, bool>,
}

/// Rename announcement emitted by the monitor-control tool, e.g.
/// `(mac80211 monitor mode vif enabled for [phy0]wlan0 on [phy0]wlan0mon)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameAnnouncement {
    /// Driver-level device name (`phy0`), distinct from the interface name.
    /// This is the key into the rfkill listing.
    pub driver: String,
    pub interface: String,
}

/// Extract the rename announcement from control tool output. The tool may
/// print the pattern several times on one line (old name, then new); the last
/// occurrence is the interface that exists after the transition.
pub fn parse_rename_announcement(output: &str) -> Option<RenameAnnouncement> {
    let pattern = Regex::new(r"\[([a-z]+\d+)\](\w+)").unwrap();
    for line in output.lines() {
        if !line.contains("monitor mode") {
            continue;
        }
        if let Some(caps) = pattern.captures_iter(line).last() {
            return Some(RenameAnnouncement {
                driver: caps[1].to_string(),
                interface: caps[2].to_string(),
            });
        }
    }
    None
}

pub struct ModeManager<'r, R: CommandRunner> {
    runner: &'r R,
    config: &'r ToolConfig,
}

impl<'r, R: CommandRunner> ModeManager<'r, R> {
    pub fn new(runner: &'r R, config: &'r ToolConfig) -> Self {
        Self { runner, config }
    }

    /// Toggle the interface between managed and monitor mode, based on its
    /// mode in a fresh inventory snapshot.
    pub fn toggle(&self, interface: &str) -> Result<ToggleOutcome> {
        let before = inventory::list_interfaces(self.runner, self.config)?;
        let Some(&monitored) = before.get(interface) else {
            return Err(WifiError::precondition(format!(
                "unknown wireless interface '{}'",
                interface
            )));
        };
        if monitored {
            self.leave_monitor(interface)
        } else {
            self.enter_monitor(interface, &before)
        }
    }

    fn leave_monitor(&self, interface: &str) -> Result<ToggleOutcome> {
        tracing::info!("Setting {} back to managed mode", interface);
        self.stop_monitor(interface)?;
        let interfaces = inventory::list_interfaces(self.runner, self.config)?;
        Ok(ToggleOutcome {
            mode: InterfaceMode::Managed,
            monitor_name: None,
            interfaces,
        })
    }

    fn enter_monitor(
        &self,
        interface: &str,
        before: &BTreeMap<String, bool>,
    ) -> Result<ToggleOutcome> {
        tracing::info!("Enabling monitor mode on {}", interface);

        // Normalize first: safe even when already managed, and clears a
        // half-configured interface left behind by an earlier failure.
        self.stop_monitor(interface)?;

        let kill = self.runner.run(
            &Cmd::new(&self.config.monitor_tool)
                .args(["check", "kill"])
                .privileged(),
        )?;
        if !kill.success() {
            tracing::warn!(
                "{} check kill exited with status {}",
                self.config.monitor_tool,
                kill.exit_code
            );
        }

        // The start subcommand may prompt for confirmation on stdin.
        let start = self.runner.run(
            &Cmd::new(&self.config.monitor_tool)
                .arg("start")
                .arg(interface)
                .stdin_text("y\n")
                .privileged(),
        )?;

        let Some(announced) = parse_rename_announcement(&start.stdout) else {
            let interfaces = inventory::list_interfaces(self.runner, self.config)?;
            return Err(WifiError::ModeToggle {
                reason: format!(
                    "could not set '{}' to monitor mode: no rename announcement from {}",
                    interface, self.config.monitor_tool
                ),
                interfaces,
            });
        };

        let after = inventory::list_interfaces(self.runner, self.config)?;
        let appeared = inventory::newly_monitored(before, &after);

        // Prefer the announced name when the OS confirms it; fall back to the
        // snapshot diff, which is a singleton under per-interface serialization.
        let monitor_name = if after.get(&announced.interface).copied().unwrap_or(false) {
            announced.interface.clone()
        } else if let Some(first) = appeared.first() {
            first.clone()
        } else {
            // Interface may be left half-configured; operator inspection needed.
            return Err(WifiError::ModeToggle {
                reason: format!("no monitor interface observed for '{}'", interface),
                interfaces: after,
            });
        };
        tracing::info!("{} set to monitor mode on {}", interface, monitor_name);

        if let Err(err) = self.unblock_if_soft_blocked(&announced.driver) {
            tracing::warn!("Soft-block check for {} failed: {}", announced.driver, err);
        }

        let interfaces = inventory::list_interfaces(self.runner, self.config)?;
        Ok(ToggleOutcome {
            mode: InterfaceMode::Monitor,
            monitor_name: Some(monitor_name),
            interfaces,
        })
    }

    /// Stop monitor mode on an interface. The control tool exits non-zero for
    /// an interface that is already managed; that no-op is benign.
    fn stop_monitor(&self, interface: &str) -> Result<()> {
        let outcome = self.runner.run(
            &Cmd::new(&self.config.monitor_tool)
                .arg("stop")
                .arg(interface)
                .privileged(),
        )?;
        if !outcome.success() {
            tracing::debug!(
                "{} stop {} exited with status {} (already managed?)",
                self.config.monitor_tool,
                interface,
                outcome.exit_code
            );
        }
        Ok(())
    }

    fn unblock_if_soft_blocked(&self, driver: &str) -> Result<()> {
        let devices = rfkill::list(self.runner, self.config)?;
        if let Some(device) = rfkill::find_device(&devices, driver) {
            if device.soft_blocked {
                rfkill::unblock(self.runner, self.config, device.index)?;
            }
        }
        Ok(())
    }
}
