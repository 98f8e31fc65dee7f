//! Control channel: privileged GET/SET over the policy store
//!
//! The channel validates caller authority and payload shape before it
//! touches any buffer or state. Errors split into exactly two kinds the
//! caller can act on: PermissionDenied and InvalidArgument; transport
//! failures are carried separately and never mutate the store either.

use std::sync::Arc;

use thiserror::Error;

use crate::store::PolicyStore;
use crate::wire;

/// Errors reported on the control plane
#[derive(Debug, Error)]
pub enum ControlError {
    /// Caller lacks administrative authority
    #[error("permission denied: administrative authority required")]
    PermissionDenied,
    /// Payload length mismatch, capacity violation, or unknown command
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Transport failure between client and server
    #[error("control transport error: {0}")]
    Io(#[from] std::io::Error),
    /// The remote side sent a frame this client does not understand
    #[error("control protocol error: {0}")]
    Protocol(&'static str),
}

/// Identity of a control-channel caller.
///
/// Hosts embedding the library decide which identity is administrative;
/// the control server derives it from the socket peer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    uid: u32,
    admin_uid: u32,
}

impl Caller {
    /// A caller identified by `uid`, with uid 0 as the administrative
    /// identity.
    pub fn from_uid(uid: u32) -> Self {
        Self { uid, admin_uid: 0 }
    }

    /// A caller checked against a non-default administrative UID.
    pub fn from_uid_with_admin(uid: u32, admin_uid: u32) -> Self {
        Self { uid, admin_uid }
    }

    /// True if this caller holds administrative authority.
    pub fn is_privileged(&self) -> bool {
        self.uid == self.admin_uid
    }
}

/// Command selectors of the control protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Get,
    Set,
}

impl ControlCommand {
    /// Wire selector byte for this command.
    pub fn selector(self) -> u8 {
        match self {
            ControlCommand::Get => 0x01,
            ControlCommand::Set => 0x02,
        }
    }

    /// Parse a wire selector byte; anything unrecognized is rejected.
    pub fn from_selector(byte: u8) -> Result<Self, ControlError> {
        match byte {
            0x01 => Ok(ControlCommand::Get),
            0x02 => Ok(ControlCommand::Set),
            _ => Err(ControlError::InvalidArgument(
                "unrecognized command selector",
            )),
        }
    }
}

/// GET/SET dispatcher bound to one policy store
#[derive(Debug, Clone)]
pub struct ControlChannel {
    store: Arc<PolicyStore>,
}

impl ControlChannel {
    pub fn new(store: Arc<PolicyStore>) -> Self {
        Self { store }
    }

    /// GET: serialize the current policy snapshot into `buf`, which must
    /// be exactly [`wire::WIRE_LEN`] bytes. The privilege check precedes
    /// any buffer access; on any error nothing is copied.
    pub fn get(&self, caller: &Caller, buf: &mut [u8]) -> Result<(), ControlError> {
        if !caller.is_privileged() {
            return Err(ControlError::PermissionDenied);
        }
        if buf.len() != wire::WIRE_LEN {
            return Err(ControlError::InvalidArgument("payload length mismatch"));
        }
        let snapshot = self.store.snapshot();
        wire::encode(&snapshot, buf)
    }

    /// SET: deserialize a candidate policy from `buf` and atomically
    /// replace the store. On any error the store is unchanged.
    pub fn set(&self, caller: &Caller, buf: &[u8]) -> Result<(), ControlError> {
        if !caller.is_privileged() {
            return Err(ControlError::PermissionDenied);
        }
        let candidate = wire::decode(buf)?;
        self.store.replace(candidate, caller.is_privileged())
    }

    /// Transport-side GET: the caller declares its buffer length instead
    /// of handing over a buffer. Keeps the privilege-before-buffer
    /// ordering even when the declared length is absurd.
    pub fn get_with_len(&self, caller: &Caller, declared_len: usize) -> Result<Vec<u8>, ControlError> {
        if !caller.is_privileged() {
            return Err(ControlError::PermissionDenied);
        }
        if declared_len != wire::WIRE_LEN {
            return Err(ControlError::InvalidArgument("payload length mismatch"));
        }
        let mut buf = vec![0u8; wire::WIRE_LEN];
        self.get(caller, &mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Policy, MAX_UIDS};

    fn channel() -> (ControlChannel, Arc<PolicyStore>) {
        let store = Arc::new(PolicyStore::new());
        (ControlChannel::new(Arc::clone(&store)), store)
    }

    fn root() -> Caller {
        Caller::from_uid(0)
    }

    fn nobody() -> Caller {
        Caller::from_uid(65534)
    }

    #[test]
    fn selector_round_trip() {
        assert_eq!(
            ControlCommand::from_selector(ControlCommand::Get.selector()).unwrap(),
            ControlCommand::Get
        );
        assert_eq!(
            ControlCommand::from_selector(ControlCommand::Set.selector()).unwrap(),
            ControlCommand::Set
        );
        assert!(matches!(
            ControlCommand::from_selector(0x7f),
            Err(ControlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn get_then_set_round_trips_the_store() {
        let (channel, store) = channel();
        let mut policy = Policy::new();
        policy.flags.log_env = true;
        policy.uids = vec![1000, 1000, 0];
        store.replace(policy, true).unwrap();

        let before = (*store.snapshot()).clone();
        let mut buf = vec![0u8; wire::WIRE_LEN];
        channel.get(&root(), &mut buf).unwrap();
        channel.set(&root(), &buf).unwrap();
        assert_eq!(*store.snapshot(), before);
    }

    #[test]
    fn unprivileged_callers_are_rejected_before_buffers() {
        let (channel, store) = channel();
        // Wrong-length buffers on purpose: the privilege failure must win.
        let mut tiny = [0u8; 1];
        assert!(matches!(
            channel.get(&nobody(), &mut tiny),
            Err(ControlError::PermissionDenied)
        ));
        assert!(matches!(
            channel.set(&nobody(), &tiny),
            Err(ControlError::PermissionDenied)
        ));
        assert!(store.snapshot().uids.is_empty());
    }

    #[test]
    fn wrong_length_set_leaves_store_unchanged() {
        let (channel, store) = channel();
        let err = channel.set(&root(), &[0u8; 16]).unwrap_err();
        assert!(matches!(err, ControlError::InvalidArgument(_)));
        assert!(store.snapshot().uids.is_empty());
    }

    #[test]
    fn oversized_count_set_leaves_store_unchanged() {
        let (channel, store) = channel();
        let mut buf = wire::encode_vec(&Policy::new()).unwrap();
        let off = wire::WIRE_LEN - 8;
        buf[off..].copy_from_slice(&(MAX_UIDS as u64 + 1).to_le_bytes());
        assert!(matches!(
            channel.set(&root(), &buf),
            Err(ControlError::InvalidArgument(_))
        ));
        assert!(store.snapshot().uids.is_empty());
    }

    #[test]
    fn get_with_wrong_declared_len_is_invalid() {
        let (channel, _) = channel();
        assert!(matches!(
            channel.get_with_len(&root(), wire::WIRE_LEN + 4),
            Err(ControlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn custom_admin_uid() {
        let caller = Caller::from_uid_with_admin(1000, 1000);
        assert!(caller.is_privileged());
        assert!(!Caller::from_uid(1000).is_privileged());
    }
}
