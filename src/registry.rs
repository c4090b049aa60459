//! In-memory registry of discovered access points.
//!
//! Shared mutable state with single-writer discipline: the registry owns its
//! mutex and is injected by reference into the scan and connect workflows
//! rather than reached through a global. Nothing here survives process exit.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WifiError};

/// A discovered access point, keyed by essid. Credential is operator-supplied,
/// never inferred from scan output or connection results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub essid: String,
    pub bssid: String,
    pub channel: i32,
    pub power: i32,
    pub encryption: String,
    pub cipher: String,
    pub auth: String,
    pub password: Option<String>,
}

impl Target {
    pub fn new(essid: impl Into<String>) -> Self {
        Self {
            essid: essid.into(),
            ..Default::default()
        }
    }

    /// Last-known-good merge: a fresh sighting overwrites a field only when it
    /// carries information. Zero channel/power and empty strings mean the
    /// capture tool did not observe that field this time.
    fn merge_from(&mut self, other: &Target) {
        merge_str(&mut self.bssid, &other.bssid);
        merge_str(&mut self.encryption, &other.encryption);
        merge_str(&mut self.cipher, &other.cipher);
        merge_str(&mut self.auth, &other.auth);
        if other.channel != 0 {
            self.channel = other.channel;
        }
        if other.power != 0 {
            self.power = other.power;
        }
        if let Some(password) = &other.password {
            if !password.is_empty() {
                self.password = Some(password.clone());
            }
        }
    }
}

fn merge_str(current: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        *current = incoming.to_string();
    }
}

/// Registry of targets in insertion order. No deletion; cleared only by drop.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Mutex<Vec<Target>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a record by essid; first sighting appends, later sightings merge
    /// field-wise without ever erasing known values.
    pub fn upsert(&self, record: Target) -> Result<()> {
        if record.essid.trim().is_empty() {
            return Err(WifiError::invalid_argument("target essid must not be empty"));
        }
        let mut targets = self.lock();
        match targets.iter_mut().find(|t| t.essid == record.essid) {
            Some(existing) => existing.merge_from(&record),
            None => targets.push(record),
        }
        Ok(())
    }

    /// Store a credential for a known target. Never creates an entry.
    pub fn set_credential(&self, essid: &str, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(WifiError::invalid_argument("password must not be empty"));
        }
        let mut targets = self.lock();
        match targets.iter_mut().find(|t| t.essid == essid) {
            Some(target) => {
                target.password = Some(password.to_string());
                tracing::info!("Credential stored for {}", essid);
                Ok(())
            }
            None => Err(WifiError::UnknownTarget(essid.to_string())),
        }
    }

    pub fn get(&self, essid: &str) -> Option<Target> {
        self.lock().iter().find(|t| t.essid == essid).cloned()
    }

    /// All targets in discovery order.
    pub fn list(&self) -> Vec<Target> {
        self.lock().clone()
    }

    /// Essids of all known targets, in discovery order.
    pub fn known(&self) -> Vec<String> {
        self.lock().iter().map(|t| t.essid.clone()).collect()
    }

    /// Essids that have a stored credential; the candidate set for `connect`.
    pub fn credentialed(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|t| t.password.as_deref().is_some_and(|p| !p.is_empty()))
            .map(|t| t.essid.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Target>> {
        self.targets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
