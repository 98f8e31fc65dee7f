#![forbid(unsafe_code)]

//! execaudit - administrative client for the exec audit daemon
//!
//! Reads the current policy over the control socket, applies the edits
//! requested on the command line and writes the whole policy back. All
//! local parsing and name resolution fails before any control call.

mod cli;

use anyhow::{Context, Result};
use execaudit::client::ControlClient;
use execaudit::policy::{LogOption, Policy};

fn main() {
    if let Err(err) = run() {
        eprintln!("** Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = cli::parse_args()?;
    let client = ControlClient::new(&config.socket_path);

    let mut policy = client.get().with_context(|| {
        format!(
            "failed to read policy from {}",
            config.socket_path.display()
        )
    })?;

    if config.is_query() {
        print_policy(&policy);
        return Ok(());
    }

    if let Some(on) = config.toggle {
        policy.flags.disable = !on;
    }
    for option in &config.disable {
        policy.flags.set(*option, false);
    }
    for option in &config.enable {
        policy.flags.set(*option, true);
    }
    if let Some(uids) = config.uids {
        policy.uids = uids;
    }

    client.set(&policy).with_context(|| {
        format!(
            "failed to apply policy via {}",
            config.socket_path.display()
        )
    })
}

/// Print the current policy: one yes/no line per option, then the
/// audited users with resolved names.
fn print_policy(policy: &Policy) {
    println!("   on: {}", yes_no(!policy.flags.disable));
    for option in LogOption::ALL {
        println!("{:>5}: {}", option.name(), yes_no(policy.flags.get(*option)));
    }

    if policy.uids.is_empty() {
        println!(" ** No users set to log!");
        return;
    }

    let mut line = String::from("users:");
    for uid in &policy.uids {
        line.push(' ');
        line.push_str(&uid.to_string());
        if let Ok(narrow) = u32::try_from(*uid) {
            if let Some(user) = users::get_user_by_uid(narrow) {
                line.push('(');
                line.push_str(&user.name().to_string_lossy());
                line.push(')');
            }
        }
    }
    println!("{}", line);
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
