//! # dronejack
//!
//! Wireless recon and access core: monitor/managed mode lifecycle, access
//! point discovery, per-target credentials, and authenticated connection
//! attempts. All privileged work is delegated to external tools (monitor-mode
//! control, capture, rfkill, a WPA connection wrapper) whose line-oriented
//! output is parsed into typed records; this crate owns the orchestration,
//! the interface-rename reconciliation, and the in-memory target registry.
//!
//! ## Example
//!
//! ```no_run
//! use dronejack::{
//!     ConnectWorkflow, ModeManager, ScanPipeline, ShellRunner, TargetRegistry, ToolConfig,
//! };
//!
//! # fn main() -> dronejack::Result<()> {
//! let config = ToolConfig::from_env();
//! let runner = ShellRunner::new(&config.escalation_tool);
//! let registry = TargetRegistry::new();
//!
//! let up = ModeManager::new(&runner, &config).toggle("wlan0")?;
//! let monitor = up.monitor_name.unwrap_or_else(|| "wlan0".to_string());
//!
//! ScanPipeline::new(&runner, &config, &registry).scan(&monitor, 60)?;
//! registry.set_credential("Parrot-A1", "s3cr3t")?;
//!
//! let joined = ConnectWorkflow::new(&runner, &config, &registry).connect("Parrot-A1")?;
//! println!("connected: {}", joined);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod error;
pub mod inventory;
pub mod mode;
pub mod registry;
pub mod rfkill;
pub mod runner;
pub mod scan;

pub use config::ToolConfig;
pub use connect::ConnectWorkflow;
pub use error::{Result, WifiError};
pub use inventory::{list_interfaces, newly_monitored};
pub use mode::{InterfaceMode, ModeManager, RenameAnnouncement, ToggleOutcome};
pub use registry::{Target, TargetRegistry};
pub use rfkill::RfkillEntry;
pub use runner::{Cmd, CommandRunner, ProcessOutcome, ShellRunner, TimeoutPolicy};
pub use scan::{CaptureRecords, ScanPipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
