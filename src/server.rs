//! Control-socket server
//!
//! Serves the privileged GET/SET protocol on a Unix domain socket:
//! - one request frame per connection, fixed framing, no partial exchanges
//! - caller authority derived from the socket peer credential
//! - stale socket cleanup on bind, socket file removal on drop
//!
//! Request frame: selector byte, declared payload length (u32 LE), then
//! the payload itself for SET. Response frame: status byte, then the
//! policy payload for a successful GET.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

use crate::control::{Caller, ControlChannel, ControlCommand, ControlError};
use crate::store::PolicyStore;
use crate::wire;

/// Response status bytes
pub(crate) const STATUS_OK: u8 = 0;
pub(crate) const STATUS_PERMISSION_DENIED: u8 = 1;
pub(crate) const STATUS_INVALID_ARGUMENT: u8 = 2;

/// Length of the request header: selector + declared length
pub(crate) const HEADER_LEN: usize = 5;

/// Unix-socket front end for the control channel
pub struct ControlServer {
    socket_path: PathBuf,
    channel: ControlChannel,
    admin_uid: u32,
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        // Clean up socket file when the server goes away
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

impl ControlServer {
    /// Create a server for `store`, administered by uid 0.
    pub fn new(socket_path: impl Into<PathBuf>, store: Arc<PolicyStore>) -> Self {
        Self {
            socket_path: socket_path.into(),
            channel: ControlChannel::new(store),
            admin_uid: 0,
        }
    }

    /// Override which peer UID counts as administrative. Hosts that do not
    /// run as root (and the test suite) grant authority to themselves.
    pub fn with_admin_uid(mut self, admin_uid: u32) -> Self {
        self.admin_uid = admin_uid;
        self
    }

    /// Bind the listening socket, replacing a stale socket file if one is
    /// left over from an earlier run.
    pub fn bind(&self) -> Result<UnixListener> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).with_context(|| {
                format!(
                    "failed to remove existing socket: {}",
                    self.socket_path.display()
                )
            })?;
        }
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create socket directory: {}", parent.display())
            })?;
        }

        UnixListener::bind(&self.socket_path)
            .with_context(|| format!("failed to bind to socket: {}", self.socket_path.display()))
    }

    /// Bind and serve until the task is cancelled.
    pub async fn serve(self) -> Result<()> {
        let listener = self.bind()?;
        self.serve_on(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve_on(self, listener: UnixListener) -> Result<()> {
        debug!("control server listening on {}", self.socket_path.display());
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let channel = self.channel.clone();
                    let admin_uid = self.admin_uid;
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(channel, admin_uid, stream).await {
                            warn!("control connection failed: {:#}", err);
                        }
                    });
                }
                Err(err) => {
                    warn!("control accept failed: {}", err);
                    return Err(err.into());
                }
            }
        }
    }
}

/// Handle one request/response exchange on a fresh connection.
async fn handle_connection(
    channel: ControlChannel,
    admin_uid: u32,
    mut stream: UnixStream,
) -> Result<()> {
    let cred = stream
        .peer_cred()
        .context("failed to read peer credentials")?;
    let caller = Caller::from_uid_with_admin(cred.uid(), admin_uid);

    let mut header = [0u8; HEADER_LEN];
    stream
        .read_exact(&mut header)
        .await
        .context("failed to read request header")?;
    let selector = header[0];
    let declared_len = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;

    let outcome = dispatch(&channel, &caller, selector, declared_len, &mut stream).await;

    match outcome {
        Ok(payload) => {
            stream.write_all(&[STATUS_OK]).await?;
            if let Some(payload) = payload {
                stream.write_all(&payload).await?;
            }
        }
        Err(ControlError::PermissionDenied) => {
            debug!("control request from uid {} denied", cred.uid());
            stream.write_all(&[STATUS_PERMISSION_DENIED]).await?;
        }
        Err(ControlError::InvalidArgument(reason)) => {
            debug!("control request rejected: {}", reason);
            stream.write_all(&[STATUS_INVALID_ARGUMENT]).await?;
        }
        Err(err) => return Err(err.into()),
    }

    stream.flush().await?;
    Ok(())
}

/// Validate and execute one request. The authority check comes first,
/// before the selector is interpreted or any payload byte is read.
async fn dispatch(
    channel: &ControlChannel,
    caller: &Caller,
    selector: u8,
    declared_len: usize,
    stream: &mut UnixStream,
) -> Result<Option<Vec<u8>>, ControlError> {
    if !caller.is_privileged() {
        return Err(ControlError::PermissionDenied);
    }

    match ControlCommand::from_selector(selector)? {
        ControlCommand::Get => channel.get_with_len(caller, declared_len).map(Some),
        ControlCommand::Set => {
            if declared_len != wire::WIRE_LEN {
                return Err(ControlError::InvalidArgument("payload length mismatch"));
            }
            let mut payload = vec![0u8; wire::WIRE_LEN];
            stream.read_exact(&mut payload).await?;
            channel.set(caller, &payload).map(|_| None)
        }
    }
}
