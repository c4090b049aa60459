//! Bounded capture runs against a monitor-mode interface.
//!
//! The capture tool is handed the interface and a duration, but the deadline
//! is enforced here: the runner kills the child when time is up and the
//! pipeline works with whatever records were emitted. Malformed records are
//! skipped and counted, never fatal to the batch.
//!
//! Record format, one access point per line:
//! `essid,bssid,channel,power,encryption,cipher,auth`. Numeric fields that
//! fail to parse default to zero; a record is only discarded when it has no
//! essid or fewer than two fields.

use std::time::Duration;

use crate::config::ToolConfig;
use crate::error::{Result, WifiError};
use crate::inventory;
use crate::registry::{Target, TargetRegistry};
use crate::runner::{Cmd, CommandRunner};

/// Parsed capture output plus the count of discarded lines.
#[derive(Debug, Default)]
pub struct CaptureRecords {
    pub records: Vec<Target>,
    pub skipped: usize,
}

pub struct ScanPipeline<'r, R: CommandRunner> {
    runner: &'r R,
    config: &'r ToolConfig,
    registry: &'r TargetRegistry,
}

impl<'r, R: CommandRunner> ScanPipeline<'r, R> {
    pub fn new(runner: &'r R, config: &'r ToolConfig, registry: &'r TargetRegistry) -> Self {
        Self {
            runner,
            config,
            registry,
        }
    }

    /// Run the capture tool on a monitor-mode interface for up to
    /// `timeout_secs`, merging every observed access point into the registry.
    /// Returns the merged targets in first-sighting order; an empty capture is
    /// not an error.
    pub fn scan(&self, interface: &str, timeout_secs: u64) -> Result<Vec<Target>> {
        if timeout_secs == 0 {
            return Err(WifiError::invalid_argument(
                "scan timeout must be greater than 0",
            ));
        }

        // Verified immediately before launch; interface state is ephemeral.
        let interfaces = inventory::list_interfaces(self.runner, self.config)?;
        match interfaces.get(interface) {
            None => {
                return Err(WifiError::precondition(format!(
                    "unknown wireless interface '{}'",
                    interface
                )))
            }
            Some(false) => {
                return Err(WifiError::precondition(format!(
                    "'{}' is not in monitor mode",
                    interface
                )))
            }
            Some(true) => {}
        }

        tracing::info!("Scanning on {} for {}s", interface, timeout_secs);
        let outcome = self.runner.run(
            &Cmd::new(&self.config.capture_tool)
                .arg(interface)
                .arg(timeout_secs.to_string())
                .privileged()
                .timeout(Duration::from_secs(timeout_secs))
                .harvest_on_timeout(),
        )?;
        // A capture killed at the deadline is the normal bounded run; an early
        // non-zero exit means the tool itself refused to capture.
        let outcome = if outcome.timed_out {
            outcome
        } else {
            outcome.ensure_success(&format!("{} {}", self.config.capture_tool, interface))?
        };

        let parsed = parse_capture_records(&outcome.stdout);
        if parsed.skipped > 0 {
            tracing::warn!("Skipped {} malformed capture records", parsed.skipped);
        }

        let mut seen: Vec<String> = Vec::new();
        for record in parsed.records {
            if !seen.contains(&record.essid) {
                seen.push(record.essid.clone());
            }
            self.registry.upsert(record)?;
        }

        if seen.is_empty() {
            tracing::info!("No targets observed on {}", interface);
        }
        Ok(seen
            .iter()
            .filter_map(|essid| self.registry.get(essid))
            .collect())
    }
}

pub fn parse_capture_records(text: &str) -> CaptureRecords {
    let mut parsed = CaptureRecords::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_capture_line(line) {
            Some(record) => parsed.records.push(record),
            None => parsed.skipped += 1,
        }
    }
    parsed
}

fn parse_capture_line(line: &str) -> Option<Target> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 2 {
        return None;
    }
    let essid = fields[0];
    if essid.is_empty() {
        return None;
    }
    let text = |i: usize| fields.get(i).copied().unwrap_or("").to_string();
    let number = |i: usize| {
        fields
            .get(i)
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(0)
    };
    Some(Target {
        essid: essid.to_string(),
        bssid: text(1),
        channel: number(2),
        power: number(3),
        encryption: text(4),
        cipher: text(5),
        auth: text(6),
        password: None,
    })
}
