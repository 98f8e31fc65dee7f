//! Audit decision logic
//!
//! Pure function from (event, policy snapshot) to log/no-log plus the set
//! of optional fields to record. Both the match and the field selection
//! come from the same snapshot, so a concurrent reconfiguration can never
//! split one event's decision across two policies.

use crate::event::ExecEvent;
use crate::policy::{Policy, PolicyFlags};

/// Optional record fields chosen by the policy snapshot.
/// pid, ppid, uid and argv are always recorded and have no switch here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSelection {
    pub euid: bool,
    pub suid: bool,
    pub egid: bool,
    pub sgid: bool,
    pub envp: bool,
}

impl FieldSelection {
    /// Derive the selection from a snapshot's flags.
    pub fn from_flags(flags: &PolicyFlags) -> Self {
        Self {
            euid: flags.log_euid,
            suid: flags.log_suid,
            egid: flags.log_egid,
            sgid: flags.log_sgid,
            envp: flags.log_env,
        }
    }
}

/// Outcome of evaluating one exec event against a policy snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDecision {
    /// Event does not match; nothing is recorded
    Skip,
    /// Event matches; record with the selected fields
    Log(FieldSelection),
}

impl LogDecision {
    pub fn is_log(&self) -> bool {
        matches!(self, LogDecision::Log(_))
    }
}

/// Decide whether an exec event is audited.
///
/// Precedence: a disabled policy or an empty UID list skips everything;
/// the real UID is tested first; the effective UID is consulted only as a
/// fallback, and only when `test_effective` is set.
pub fn decide(event: &ExecEvent, snapshot: &Policy) -> LogDecision {
    if snapshot.is_inert() {
        return LogDecision::Skip;
    }

    let matched = if snapshot.lists_uid(u64::from(event.creds.uid)) {
        true
    } else {
        snapshot.flags.test_effective && snapshot.lists_uid(u64::from(event.creds.euid))
    };

    if matched {
        LogDecision::Log(FieldSelection::from_flags(&snapshot.flags))
    } else {
        LogDecision::Skip
    }
}
