//! Radio soft-block listing and control.
//!
//! Drivers occasionally come out of a mode change with the radio kill-switch
//! soft-engaged. The listing tool emits a header row per device,
//! `<index>: <device-name>: <description>`, followed by indented detail lines
//! such as `Soft blocked: yes`.

use crate::config::ToolConfig;
use crate::error::Result;
use crate::runner::{Cmd, CommandRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfkillEntry {
    pub index: u32,
    pub device: String,
    pub soft_blocked: bool,
}

/// List all kill-switch devices and their soft-block state.
pub fn list<R: CommandRunner>(runner: &R, config: &ToolConfig) -> Result<Vec<RfkillEntry>> {
    let outcome = runner
        .run(&Cmd::new(&config.rfkill_tool).arg("list").privileged())?
        .ensure_success(&format!("{} list", config.rfkill_tool))?;
    Ok(parse_rfkill_listing(&outcome.stdout))
}

/// Clear the soft block on a device by its listing index.
pub fn unblock<R: CommandRunner>(runner: &R, config: &ToolConfig, index: u32) -> Result<()> {
    tracing::info!("Unblocking rfkill device {}", index);
    runner
        .run(
            &Cmd::new(&config.rfkill_tool)
                .arg("unblock")
                .arg(index.to_string())
                .privileged(),
        )?
        .ensure_success(&format!("{} unblock {}", config.rfkill_tool, index))?;
    Ok(())
}

pub fn parse_rfkill_listing(text: &str) -> Vec<RfkillEntry> {
    let mut entries: Vec<RfkillEntry> = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            let mut parts = line.splitn(3, ':');
            let (Some(index), Some(device)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(index) = index.trim().parse::<u32>() else {
                continue;
            };
            entries.push(RfkillEntry {
                index,
                device: device.trim().to_string(),
                soft_blocked: false,
            });
        } else if let Some(entry) = entries.last_mut() {
            if let Some(state) = line.trim().strip_prefix("Soft blocked:") {
                entry.soft_blocked = state.trim().eq_ignore_ascii_case("yes");
            }
        }
    }
    entries
}

/// Find a device row by its driver-level name (e.g. `phy0`).
pub fn find_device<'a>(entries: &'a [RfkillEntry], device: &str) -> Option<&'a RfkillEntry> {
    entries.iter().find(|e| e.device == device)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "0: phy0: Wireless LAN\n\
                           \tSoft blocked: yes\n\
                           \tHard blocked: no\n\
                           1: hci0: Bluetooth\n\
                           \tSoft blocked: no\n\
                           \tHard blocked: no\n";

    #[test]
    fn test_parse_listing() {
        let entries = parse_rfkill_listing(LISTING);
        assert_eq!(
            entries,
            vec![
                RfkillEntry {
                    index: 0,
                    device: "phy0".to_string(),
                    soft_blocked: true,
                },
                RfkillEntry {
                    index: 1,
                    device: "hci0".to_string(),
                    soft_blocked: false,
                },
            ]
        );
    }

    #[test]
    fn test_parse_skips_malformed_headers() {
        let entries = parse_rfkill_listing("garbage line\nnot-a-number: phy0: x\n2: phy1: ok\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 2);
    }

    #[test]
    fn test_find_device() {
        let entries = parse_rfkill_listing(LISTING);
        assert_eq!(find_device(&entries, "phy0").map(|e| e.index), Some(0));
        assert!(find_device(&entries, "phy9").is_none());
    }
}
