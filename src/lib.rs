//! execaudit - selective exec-event auditing library
//!
//! Audits process-creation events by user identity under a policy that an
//! administrative client can replace at runtime over a privileged control
//! socket. The crate never allows or denies an exec; it only observes and
//! optionally records it.

pub mod audit;
pub mod client;
pub mod control;
pub mod decision;
pub mod event;
pub mod format;
pub mod policy;
pub mod server;
pub mod store;
pub mod wire;
