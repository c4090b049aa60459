//! Error types for dronejack

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type alias for wireless operations
pub type Result<T> = std::result::Result<T, WifiError>;

/// Main error type for wireless operations
#[derive(Error, Debug)]
pub enum WifiError {
    /// Bad caller-supplied value, rejected before any side effect
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation attempted on an interface or target in the wrong state
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// External tool could not be spawned (missing binary, escalation refused)
    #[error("Failed to launch command: {0}")]
    LaunchFailed(String),

    /// External tool exceeded its deadline and was killed
    #[error("Command timed out: {0}")]
    TimedOut(String),

    /// External tool exited with an unacceptable status
    #[error("Command '{command}' exited with status {code}: {stderr}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Monitor mode transition could not be confirmed. Carries the final
    /// post-failure inventory so the caller observes ground truth rather
    /// than stale state.
    #[error("Monitor mode toggle failed: {reason}")]
    ModeToggle {
        reason: String,
        interfaces: BTreeMap<String, bool>,
    },

    /// Connection attempted without stored key material
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Registry lookup for an essid that was never discovered
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Interface enumeration tool unavailable; fatal to the calling operation
    #[error("Interface inventory unavailable: {0}")]
    Inventory(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WifiError {
    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create an inventory error
    pub fn inventory(msg: impl Into<String>) -> Self {
        Self::Inventory(msg.into())
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    /// Check if this error was raised before any external process was spawned
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::Precondition(_)
                | Self::MissingCredential(_)
                | Self::UnknownTarget(_)
        )
    }
}
