#![forbid(unsafe_code)]

//! execauditd - exec audit daemon
//!
//! Hosts the policy store for the lifetime of the process:
//! - serves the privileged GET/SET control socket
//! - consumes exec events from the external process-creation hook as
//!   newline-delimited JSON on stdin
//! - emits matched audit records to stdout, one line per event
//!
//! The daemon shuts down when the event feed closes or on SIGINT/SIGTERM.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};

use execaudit::audit::{Auditor, StdoutSink};
use execaudit::event::ExecEvent;
use execaudit::server::ControlServer;
use execaudit::store::PolicyStore;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("execauditd")
        .version(env!("EXECAUDIT_VERSION"))
        .about("Exec audit daemon: applies the configured policy to exec events")
        .arg(
            Arg::new("socket")
                .short('s')
                .long("socket")
                .value_name("PATH")
                .default_value("/var/run/execaudit.sock")
                .help("Path of the privileged control socket"),
        )
        .arg(
            Arg::new("admin-uid")
                .long("admin-uid")
                .value_name("UID")
                .value_parser(clap::value_parser!(u32))
                .default_value("0")
                .help("Peer UID granted administrative authority"),
        )
        .get_matches();

    // default_value guarantees presence for both arguments
    let socket_path = matches
        .get_one::<String>("socket")
        .map(PathBuf::from)
        .context("missing socket path")?;
    let admin_uid = *matches
        .get_one::<u32>("admin-uid")
        .context("missing admin uid")?;

    let store = Arc::new(PolicyStore::new());
    let server = ControlServer::new(&socket_path, Arc::clone(&store)).with_admin_uid(admin_uid);

    // Bind before touching the event feed so an admin client can connect
    // as soon as the daemon reports startup
    let listener = server.bind()?;
    let mut server_task = tokio::spawn(server.serve_on(listener));
    info!("control socket ready on {}", socket_path.display());

    let auditor = Auditor::new(store, StdoutSink);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sigterm = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("failed to read event feed")? {
                    Some(line) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<ExecEvent>(&line) {
                            Ok(event) => {
                                auditor.observe(&event);
                            }
                            Err(err) => warn!("dropping malformed event: {}", err),
                        }
                    }
                    None => {
                        info!("event feed closed, shutting down");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            _ = sigterm.recv() => {
                info!("termination requested, shutting down");
                break;
            }
            result = &mut server_task => {
                result.context("control server task panicked")??;
                break;
            }
        }
    }

    server_task.abort();
    Ok(())
}
