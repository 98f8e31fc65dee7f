//! Shared policy store
//!
//! The single shared mutable resource in the system: many concurrent
//! readers (one per exec event) against occasional exclusive writers
//! (administrative SET). Replacement is whole-structure copy-and-swap of
//! an immutable snapshot reference, so no reader can ever observe fields
//! from two different writes.

use std::sync::{Arc, RwLock};

use crate::control::ControlError;
use crate::policy::{Policy, MAX_UIDS};

/// Owns the current policy for the lifetime of the process.
///
/// Readers take an `Arc` snapshot under a briefly held read lock; writers
/// swap in a pre-built `Arc` under a briefly held write lock. Neither
/// critical section allocates or does I/O.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<Policy>>,
}

impl PolicyStore {
    /// Create a store holding the zero-valued (inert) policy.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Policy::new())),
        }
    }

    /// A consistent point-in-time copy of the current policy.
    pub fn snapshot(&self) -> Arc<Policy> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            // A poisoned lock only means some other thread panicked while
            // holding it; the Arc inside is still a complete policy.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Atomically replace the entire policy.
    ///
    /// Fails with PermissionDenied for unprivileged callers and with
    /// InvalidArgument if the candidate exceeds the UID capacity; the
    /// stored policy is unchanged in both cases.
    pub fn replace(&self, candidate: Policy, caller_privileged: bool) -> Result<(), ControlError> {
        if !caller_privileged {
            return Err(ControlError::PermissionDenied);
        }
        if candidate.uids.len() > MAX_UIDS {
            return Err(ControlError::InvalidArgument("uid list exceeds capacity"));
        }

        let next = Arc::new(candidate);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        Ok(())
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}
