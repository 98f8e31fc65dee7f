//! CLI argument parsing and validation module
//!
//! Handles the admin tool's command line using clap, including:
//! - the on/off keyword toggling auditing as a whole
//! - enabling/disabling named log options (-e/-d)
//! - replacing the audited user list (-u), accepting numeric UIDs in
//!   binary/octal/decimal/hex notation or usernames
//! - control socket selection
//!
//! All validation and name resolution happens here, before any control
//! call is attempted, so a bad command line never half-applies a policy.

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use execaudit::policy::{LogOption, MAX_UIDS};

/// Default control socket of the audit daemon
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/execaudit.sock";

/// Parsed admin command line
#[derive(Debug)]
pub struct CliConfig {
    pub socket_path: PathBuf,
    /// `Some(true)` for the `on` keyword, `Some(false)` for `off`
    pub toggle: Option<bool>,
    pub disable: Vec<LogOption>,
    pub enable: Vec<LogOption>,
    /// Replacement UID list, if -u was given
    pub uids: Option<Vec<u64>>,
}

impl CliConfig {
    /// True if no change was requested; the tool just prints the policy.
    pub fn is_query(&self) -> bool {
        self.toggle.is_none() && self.disable.is_empty() && self.enable.is_empty() && self.uids.is_none()
    }
}

/// Parse command line arguments and resolve all names and literals.
pub fn parse_args() -> Result<CliConfig> {
    let matches = match build_command().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                let _ = err.print();
                std::process::exit(0);
            }
            _ => return Err(err.into()),
        },
    };

    let toggle = matches
        .get_one::<String>("state")
        .map(|state| state.eq_ignore_ascii_case("on"));

    let mut disable = Vec::new();
    if let Some(lists) = matches.get_many::<String>("disable") {
        for list in lists {
            disable.extend(parse_option_list(list)?);
        }
    }
    let mut enable = Vec::new();
    if let Some(lists) = matches.get_many::<String>("enable") {
        for list in lists {
            enable.extend(parse_option_list(list)?);
        }
    }

    let uids = matches
        .get_one::<String>("users")
        .map(|list| parse_user_list(list))
        .transpose()?;

    // default_value guarantees presence
    let socket_path = matches
        .get_one::<String>("socket")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH));

    Ok(CliConfig {
        socket_path,
        toggle,
        disable,
        enable,
        uids,
    })
}

fn build_command() -> Command {
    Command::new("execaudit")
        .version(env!("EXECAUDIT_VERSION"))
        .about("Configure selective auditing of exec events")
        .long_about(
            "Reads the current audit policy from a running execauditd, applies the \
             requested changes and writes it back. With no arguments, prints the \
             current policy.",
        )
        .arg(
            Arg::new("state")
                .value_name("on|off")
                .value_parser(["on", "off"])
                .help("Turn auditing on or off"),
        )
        .arg(
            Arg::new("disable")
                .short('d')
                .long("disable")
                .value_name("OPT[,OPT...]")
                .action(ArgAction::Append)
                .help("Disable log option(s)"),
        )
        .arg(
            Arg::new("enable")
                .short('e')
                .long("enable")
                .value_name("OPT[,OPT...]")
                .action(ArgAction::Append)
                .help("Enable log option(s)"),
        )
        .arg(
            Arg::new("users")
                .short('u')
                .long("users")
                .value_name("USER[,USER...]")
                .help("Set list of users to log (UIDs or usernames)"),
        )
        .arg(
            Arg::new("socket")
                .short('s')
                .long("socket")
                .value_name("PATH")
                .default_value(DEFAULT_SOCKET_PATH)
                .help("Control socket of the audit daemon"),
        )
        .after_help(log_options_help())
}

fn log_options_help() -> String {
    let mut help = String::from(
        "Log options:\n  \
         env     Log environment strings\n  \
         euid    Log effective UID\n  \
         suid    Log saved effective UID\n  \
         egid    Log effective GID\n  \
         sgid    Log saved effective GID\n  \
         tste    Log calls where the effective UID is in the list of users",
    );
    if cfg!(feature = "hide-logfile") {
        help.push_str("\n  hide    Hide the logfile from directory listings");
    }
    help
}

/// Split a comma-separated list; a single trailing comma ends the list.
fn split_list(raw: &str) -> std::str::Split<'_, char> {
    raw.strip_suffix(',').unwrap_or(raw).split(',')
}

fn parse_option_list(raw: &str) -> Result<Vec<LogOption>> {
    let mut options = Vec::new();
    for part in split_list(raw) {
        let name = part.trim();
        let option = LogOption::from_name(name)
            .ok_or_else(|| anyhow!("unrecognized log option '{}'", name))?;
        options.push(option);
    }
    Ok(options)
}

fn parse_user_list(raw: &str) -> Result<Vec<u64>> {
    let mut uids = Vec::new();
    for part in split_list(raw) {
        let entry = part.trim();
        if uids.len() >= MAX_UIDS {
            return Err(anyhow!("too many users for list capacity ({})", MAX_UIDS));
        }
        let uid = match parse_numeric(entry) {
            Some(uid) => uid,
            None => users::get_user_by_name(entry)
                .map(|user| u64::from(user.uid()))
                .ok_or_else(|| anyhow!("cannot resolve '{}' as UID or user name", entry))?,
        };
        uids.push(uid);
    }
    Ok(uids)
}

/// Parse a numeric literal: `0b`/`0B` binary, `0x`/`0X` hexadecimal,
/// leading-zero octal, decimal otherwise. Returns None for anything that
/// is not entirely a number in its base.
pub fn parse_numeric(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, radix) = if let Some(rest) = raw.strip_prefix("0b").or_else(|| raw.strip_prefix("0B")) {
        (rest, 2)
    } else if let Some(rest) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        (rest, 16)
    } else if raw.len() > 1 && raw.starts_with('0') {
        (&raw[1..], 8)
    } else {
        (raw, 10)
    };
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}
