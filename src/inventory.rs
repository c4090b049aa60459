//! Wireless interface enumeration.
//!
//! Interface state is ephemeral: names change when a driver enters monitor
//! mode, so every decision is made against a fresh snapshot rather than a
//! cached one. The snapshot diff used for rename detection is a pure function
//! over two mappings, kept separate from process invocation.

use std::collections::BTreeMap;

use crate::config::ToolConfig;
use crate::error::{Result, WifiError};
use crate::runner::{Cmd, CommandRunner};

/// Query current wireless interfaces, mapping name to monitor-mode flag.
/// Read-only and idempotent; an unavailable enumeration tool is fatal to
/// the calling operation.
pub fn list_interfaces<R: CommandRunner>(
    runner: &R,
    config: &ToolConfig,
) -> Result<BTreeMap<String, bool>> {
    let outcome = runner.run(&Cmd::new(&config.enum_tool)).map_err(|e| {
        WifiError::inventory(format!("{} unavailable: {}", config.enum_tool, e))
    })?;
    // Enumeration tools commonly exit non-zero while still listing usable
    // interfaces (e.g. a trailing wired device with no extensions).
    if !outcome.success() && outcome.stdout.trim().is_empty() {
        return Err(WifiError::inventory(format!(
            "{} exited with status {}: {}",
            config.enum_tool,
            outcome.exit_code,
            outcome.stderr.trim()
        )));
    }
    Ok(parse_interface_listing(&outcome.stdout))
}

/// Parse one interface per line: the name in the first column and a
/// `Mode:<mode>` marker somewhere on the line. Extra whitespace and columns
/// are tolerated; lines without a mode marker are skipped.
pub fn parse_interface_listing(text: &str) -> BTreeMap<String, bool> {
    let mut interfaces = BTreeMap::new();
    for line in text.lines() {
        if line.starts_with(char::is_whitespace) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        let Some(mode) = fields.find_map(|f| f.strip_prefix("Mode:")) else {
            continue;
        };
        interfaces.insert(name.to_string(), mode.eq_ignore_ascii_case("monitor"));
    }
    interfaces
}

/// Monitor interfaces present in `after` that were not monitoring in `before`.
/// Sorted by name, so ties in rename detection resolve deterministically.
pub fn newly_monitored(
    before: &BTreeMap<String, bool>,
    after: &BTreeMap<String, bool>,
) -> Vec<String> {
    after
        .iter()
        .filter(|(name, monitor)| **monitor && !before.get(*name).copied().unwrap_or(false))
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
        entries
            .iter()
            .map(|(n, m)| (n.to_string(), *m))
            .collect()
    }

    #[test]
    fn test_parse_listing_classifies_modes() {
        let text = "wlan0     IEEE 802.11  ESSID:off/any  Mode:Managed  Access Point: Not-Associated\n\
                    wlan1mon  IEEE 802.11  Mode:Monitor  Frequency:2.437 GHz\n";
        let parsed = parse_interface_listing(text);
        assert_eq!(parsed.get("wlan0"), Some(&false));
        assert_eq!(parsed.get("wlan1mon"), Some(&true));
    }

    #[test]
    fn test_parse_listing_skips_noise_and_continuations() {
        let text = concat!(
            "lo        no wireless extensions.\n",
            "eth0      no wireless extensions.\n",
            "wlan0     IEEE 802.11  Mode:Managed\n",
            "          Retry short limit:7   RTS thr:off\n",
            "\n",
        );
        let parsed = parse_interface_listing(text);
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains_key("wlan0"));
    }

    #[test]
    fn test_parse_listing_tolerates_extra_columns() {
        let parsed = parse_interface_listing("wlan0\t \tIEEE  802.11abgn   extra  Mode:MONITOR  more\n");
        assert_eq!(parsed.get("wlan0"), Some(&true));
    }

    #[test]
    fn test_newly_monitored_diff() {
        let before = snapshot(&[("wlan0", false)]);
        let after = snapshot(&[("wlan0mon", true), ("wlan1", false)]);
        assert_eq!(newly_monitored(&before, &after), vec!["wlan0mon"]);
    }

    #[test]
    fn test_newly_monitored_ignores_preexisting_monitors() {
        let before = snapshot(&[("wlan0mon", true)]);
        let after = snapshot(&[("wlan0mon", true)]);
        assert!(newly_monitored(&before, &after).is_empty());
    }

    #[test]
    fn test_newly_monitored_counts_mode_flips_in_place() {
        let before = snapshot(&[("wlan0", false)]);
        let after = snapshot(&[("wlan0", true)]);
        assert_eq!(newly_monitored(&before, &after), vec!["wlan0"]);
    }
}
