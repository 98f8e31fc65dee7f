//! Exec event data model
//!
//! One ExecEvent is produced per process-creation attempt by the external
//! hook and is read-only to this crate. The JSON shape doubles as the
//! daemon's stdin feed format.

use serde::{Deserialize, Serialize};

/// Process credentials at the time of the exec attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Real UID
    pub uid: u32,
    /// Effective UID
    pub euid: u32,
    /// Saved effective UID
    pub suid: u32,
    /// Real GID
    pub gid: u32,
    /// Effective GID
    pub egid: u32,
    /// Saved effective GID
    pub sgid: u32,
}

/// A single observed process-creation attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecEvent {
    pub pid: u32,
    pub ppid: u32,
    #[serde(flatten)]
    pub creds: Credentials,
    /// Path of the executable being run
    pub path: String,
    /// Argument strings. A hook that supplies no list yields an empty one.
    #[serde(default)]
    pub argv: Vec<String>,
    /// Environment strings, same absent-list guarantee as argv.
    #[serde(default)]
    pub envp: Vec<String>,
}

impl ExecEvent {
    /// Build an event from hook-supplied data. Hooks that have no argument
    /// or environment list to hand over pass `None`; the boundary maps it
    /// to an empty list so nothing downstream has to re-check.
    pub fn from_hook(
        pid: u32,
        ppid: u32,
        creds: Credentials,
        path: impl Into<String>,
        argv: Option<Vec<String>>,
        envp: Option<Vec<String>>,
    ) -> Self {
        Self {
            pid,
            ppid,
            creds,
            path: path.into(),
            argv: argv.unwrap_or_default(),
            envp: envp.unwrap_or_default(),
        }
    }
}
