//! Tool names and defaults for the external collaborators.
//!
//! Every external tool this crate drives is configurable, with environment
//! overrides (`DRONEJACK_*`) and an optional JSON override file for appliance
//! deployments where the tools live behind site wrappers.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

pub const DEFAULT_ESCALATION_TOOL: &str = "sudo";
pub const DEFAULT_ENUM_TOOL: &str = "iwconfig";
pub const DEFAULT_MONITOR_TOOL: &str = "airmon-ng";
pub const DEFAULT_RFKILL_TOOL: &str = "rfkill";
/// Site wrapper around the capture suite; prints one CSV record per observed
/// access point and is invoked as `<tool> <interface> <timeout-seconds>`.
pub const DEFAULT_CAPTURE_TOOL: &str = "apdump";
/// Site wrapper around wpa_supplicant; invoked as `<tool> <essid> <password> [bssid]`.
pub const DEFAULT_CONNECT_TOOL: &str = "wpaconnect";
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub escalation_tool: String,
    pub enum_tool: String,
    pub monitor_tool: String,
    pub rfkill_tool: String,
    pub capture_tool: String,
    pub connect_tool: String,
    pub scan_timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            escalation_tool: DEFAULT_ESCALATION_TOOL.to_string(),
            enum_tool: DEFAULT_ENUM_TOOL.to_string(),
            monitor_tool: DEFAULT_MONITOR_TOOL.to_string(),
            rfkill_tool: DEFAULT_RFKILL_TOOL.to_string(),
            capture_tool: DEFAULT_CAPTURE_TOOL.to_string(),
            connect_tool: DEFAULT_CONNECT_TOOL.to_string(),
            scan_timeout_secs: DEFAULT_SCAN_TIMEOUT_SECS,
        }
    }
}

impl ToolConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("DRONEJACK_ESCALATION_TOOL") {
            cfg.escalation_tool = v;
        }
        if let Ok(v) = env::var("DRONEJACK_ENUM_TOOL") {
            cfg.enum_tool = v;
        }
        if let Ok(v) = env::var("DRONEJACK_MONITOR_TOOL") {
            cfg.monitor_tool = v;
        }
        if let Ok(v) = env::var("DRONEJACK_RFKILL_TOOL") {
            cfg.rfkill_tool = v;
        }
        if let Ok(v) = env::var("DRONEJACK_CAPTURE_TOOL") {
            cfg.capture_tool = v;
        }
        if let Ok(v) = env::var("DRONEJACK_CONNECT_TOOL") {
            cfg.connect_tool = v;
        }
        if let Some(secs) = env::var("DRONEJACK_SCAN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            cfg.scan_timeout_secs = secs;
        }
        cfg
    }

    /// Load a JSON override file, if present and well-formed.
    pub fn load_override(path: &Path) -> Option<Self> {
        let text = fs::read_to_string(path).ok()?;
        serde_json::from_str(&text).ok()
    }
}
