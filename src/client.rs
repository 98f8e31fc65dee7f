//! Control-socket client
//!
//! Synchronous counterpart to the server, used by the admin tool. One
//! connection per request: connect, send the frame, read the status,
//! done.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use crate::control::{ControlCommand, ControlError};
use crate::policy::Policy;
use crate::server::{HEADER_LEN, STATUS_INVALID_ARGUMENT, STATUS_OK, STATUS_PERMISSION_DENIED};
use crate::wire;

/// Client for the privileged GET/SET protocol
#[derive(Debug, Clone)]
pub struct ControlClient {
    socket_path: PathBuf,
}

impl ControlClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Fetch the current policy.
    pub fn get(&self) -> Result<Policy, ControlError> {
        let mut stream = UnixStream::connect(&self.socket_path)?;
        write_header(&mut stream, ControlCommand::Get, wire::WIRE_LEN)?;

        read_status(&mut stream)?;
        let mut payload = vec![0u8; wire::WIRE_LEN];
        stream.read_exact(&mut payload)?;
        wire::decode(&payload)
    }

    /// Replace the policy wholesale.
    pub fn set(&self, policy: &Policy) -> Result<(), ControlError> {
        self.set_raw(&wire::encode_vec(policy)?)
    }

    /// Send a SET with an arbitrary payload, declaring its actual length.
    /// Exposed so the payload contract itself can be exercised end to end.
    pub fn set_raw(&self, payload: &[u8]) -> Result<(), ControlError> {
        let mut stream = UnixStream::connect(&self.socket_path)?;
        write_header(&mut stream, ControlCommand::Set, payload.len())?;
        stream.write_all(payload)?;

        read_status(&mut stream)
    }
}

fn write_header(
    stream: &mut UnixStream,
    command: ControlCommand,
    declared_len: usize,
) -> Result<(), ControlError> {
    let mut header = [0u8; HEADER_LEN];
    header[0] = command.selector();
    header[1..].copy_from_slice(&(declared_len as u32).to_le_bytes());
    stream.write_all(&header)?;
    Ok(())
}

fn read_status(stream: &mut UnixStream) -> Result<(), ControlError> {
    let mut status = [0u8; 1];
    stream.read_exact(&mut status)?;
    match status[0] {
        STATUS_OK => Ok(()),
        STATUS_PERMISSION_DENIED => Err(ControlError::PermissionDenied),
        STATUS_INVALID_ARGUMENT => Err(ControlError::InvalidArgument(
            "rejected by control server",
        )),
        _ => Err(ControlError::Protocol("unknown status byte")),
    }
}
