//! Policy data model
//!
//! Defines the audit policy:
//! - PolicyFlags: named boolean options controlling whether and what to log
//! - Policy: flags plus the ordered UID allow-list
//! - LogOption: the user-facing option names accepted by the admin client
//!
//! Flags are plain booleans everywhere inside the crate; the wire bitmask
//! representation exists only at the control-channel boundary (see wire.rs).

use serde::{Deserialize, Serialize};

/// Maximum number of UIDs the audit list can hold
pub const MAX_UIDS: usize = 128;

// Wire bitmask values, one bit per option
pub(crate) const BIT_DISABLE: u32 = 0x0000_0001;
pub(crate) const BIT_LOG_ENV: u32 = 0x0000_0002;
pub(crate) const BIT_LOG_EUID: u32 = 0x0000_0004;
pub(crate) const BIT_LOG_SUID: u32 = 0x0000_0008;
pub(crate) const BIT_LOG_EGID: u32 = 0x0000_0010;
pub(crate) const BIT_LOG_SGID: u32 = 0x0000_0020;
pub(crate) const BIT_TEST_EFFECTIVE: u32 = 0x0000_0040;
#[cfg(feature = "hide-logfile")]
pub(crate) const BIT_HIDE_LOGFILE: u32 = 0x0000_0080;

/// Named boolean options of the audit policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFlags {
    /// Auditing is switched off entirely
    pub disable: bool,
    /// Include environment strings in records
    pub log_env: bool,
    /// Include the effective UID in records
    pub log_euid: bool,
    /// Include the saved effective UID in records
    pub log_suid: bool,
    /// Include the effective GID in records
    pub log_egid: bool,
    /// Include the saved effective GID in records
    pub log_sgid: bool,
    /// Also match events whose effective UID is in the list
    pub test_effective: bool,
    /// Hide the logfile from directory listings
    #[cfg(feature = "hide-logfile")]
    pub hide_logfile: bool,
}

impl PolicyFlags {
    /// Serialize the flags to the wire bitmask.
    pub fn to_bits(self) -> u32 {
        let mut bits = 0;
        if self.disable {
            bits |= BIT_DISABLE;
        }
        if self.log_env {
            bits |= BIT_LOG_ENV;
        }
        if self.log_euid {
            bits |= BIT_LOG_EUID;
        }
        if self.log_suid {
            bits |= BIT_LOG_SUID;
        }
        if self.log_egid {
            bits |= BIT_LOG_EGID;
        }
        if self.log_sgid {
            bits |= BIT_LOG_SGID;
        }
        if self.test_effective {
            bits |= BIT_TEST_EFFECTIVE;
        }
        #[cfg(feature = "hide-logfile")]
        if self.hide_logfile {
            bits |= BIT_HIDE_LOGFILE;
        }
        bits
    }

    /// Deserialize the flags from the wire bitmask. Undefined bits are
    /// ignored; they have no named option and are never tested.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            disable: bits & BIT_DISABLE != 0,
            log_env: bits & BIT_LOG_ENV != 0,
            log_euid: bits & BIT_LOG_EUID != 0,
            log_suid: bits & BIT_LOG_SUID != 0,
            log_egid: bits & BIT_LOG_EGID != 0,
            log_sgid: bits & BIT_LOG_SGID != 0,
            test_effective: bits & BIT_TEST_EFFECTIVE != 0,
            #[cfg(feature = "hide-logfile")]
            hide_logfile: bits & BIT_HIDE_LOGFILE != 0,
        }
    }

    /// Read a flag by its admin-client option name.
    pub fn get(&self, option: LogOption) -> bool {
        match option {
            LogOption::Env => self.log_env,
            LogOption::Euid => self.log_euid,
            LogOption::Suid => self.log_suid,
            LogOption::Egid => self.log_egid,
            LogOption::Sgid => self.log_sgid,
            LogOption::TestEffective => self.test_effective,
            #[cfg(feature = "hide-logfile")]
            LogOption::HideLogfile => self.hide_logfile,
        }
    }

    /// Set or clear a flag by its admin-client option name.
    pub fn set(&mut self, option: LogOption, on: bool) {
        match option {
            LogOption::Env => self.log_env = on,
            LogOption::Euid => self.log_euid = on,
            LogOption::Suid => self.log_suid = on,
            LogOption::Egid => self.log_egid = on,
            LogOption::Sgid => self.log_sgid = on,
            LogOption::TestEffective => self.test_effective = on,
            #[cfg(feature = "hide-logfile")]
            LogOption::HideLogfile => self.hide_logfile = on,
        }
    }
}

/// Option names the admin client can enable or disable.
///
/// DISABLE is deliberately absent: the on/off state is toggled through the
/// dedicated `on`/`off` keywords, not the option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOption {
    Env,
    Euid,
    Suid,
    Egid,
    Sgid,
    TestEffective,
    #[cfg(feature = "hide-logfile")]
    HideLogfile,
}

impl LogOption {
    /// All options, in status-printout order.
    pub const ALL: &'static [LogOption] = &[
        LogOption::Env,
        LogOption::Euid,
        LogOption::Suid,
        LogOption::Egid,
        LogOption::Sgid,
        LogOption::TestEffective,
        #[cfg(feature = "hide-logfile")]
        LogOption::HideLogfile,
    ];

    /// The option name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            LogOption::Env => "env",
            LogOption::Euid => "euid",
            LogOption::Suid => "suid",
            LogOption::Egid => "egid",
            LogOption::Sgid => "sgid",
            LogOption::TestEffective => "tste",
            #[cfg(feature = "hide-logfile")]
            LogOption::HideLogfile => "hide",
        }
    }

    /// Look up an option by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        LogOption::ALL
            .iter()
            .copied()
            .find(|opt| opt.name().eq_ignore_ascii_case(name))
    }
}

/// The audit policy: flags plus the ordered UID allow-list.
///
/// The list is ordered and bounded by [`MAX_UIDS`]; the bound is enforced at
/// the control-channel boundary. Duplicate entries are tolerated; rejecting
/// them would break the GET-then-SET round trip for a store that already
/// holds duplicates, and membership tests are unaffected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub flags: PolicyFlags,
    pub uids: Vec<u64>,
}

impl Policy {
    /// The zero-valued initial policy: no flags set, empty UID list.
    /// An empty list matches nothing, so this policy is inert.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the policy can never produce a record.
    pub fn is_inert(&self) -> bool {
        self.flags.disable || self.uids.is_empty()
    }

    /// True if `uid` appears in the allow-list.
    pub fn lists_uid(&self, uid: u64) -> bool {
        self.uids.contains(&uid)
    }
}
