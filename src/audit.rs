//! Audit pipeline: the exec-hook entry point
//!
//! Wires the pieces together for the hot path: take a policy snapshot,
//! decide, format, emit. The snapshot is copied out before any formatting
//! or sink work, so a slow or blocking sink can never stall policy
//! readers or administrative reconfiguration.

use crate::decision::{decide, LogDecision};
use crate::event::ExecEvent;
use crate::format::format_record;
use crate::store::PolicyStore;
use std::sync::{Arc, Mutex};

/// Destination for formatted audit records. The destination itself is
/// opaque to this crate; implementations decide where lines end up.
pub trait EventSink: Send + Sync {
    fn emit(&self, record: &str);
}

/// Sink writing one record per line to stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, record: &str) {
        println!("{}", record);
    }
}

/// Sink collecting records in memory, for hosts and tests that want to
/// inspect output
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, record: &str) {
        match self.records.lock() {
            Ok(mut guard) => guard.push(record.to_string()),
            Err(poisoned) => poisoned.into_inner().push(record.to_string()),
        }
    }
}

/// Observes exec events against the shared policy and emits matched
/// records to its sink.
pub struct Auditor<S: EventSink> {
    store: Arc<PolicyStore>,
    sink: S,
}

impl<S: EventSink> Auditor<S> {
    pub fn new(store: Arc<PolicyStore>, sink: S) -> Self {
        Self { store, sink }
    }

    /// Process one exec event. Returns true if a record was emitted.
    /// There is no error channel: a non-matching event is simply skipped.
    pub fn observe(&self, event: &ExecEvent) -> bool {
        let snapshot = self.store.snapshot();
        match decide(event, &snapshot) {
            LogDecision::Skip => false,
            LogDecision::Log(fields) => {
                let record = format_record(event, &fields);
                self.sink.emit(&record);
                true
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Credentials;
    use crate::policy::Policy;

    fn event(uid: u32) -> ExecEvent {
        ExecEvent::from_hook(
            9,
            1,
            Credentials {
                uid,
                euid: uid,
                suid: uid,
                gid: 100,
                egid: 100,
                sgid: 100,
            },
            "/bin/ls",
            Some(vec!["/bin/ls".into(), "-l".into()]),
            None,
        )
    }

    #[test]
    fn inert_store_emits_nothing() {
        let auditor = Auditor::new(Arc::new(PolicyStore::new()), MemorySink::new());
        assert!(!auditor.observe(&event(1000)));
        assert!(auditor.sink().records().is_empty());
    }

    #[test]
    fn matched_event_reaches_the_sink() {
        let store = Arc::new(PolicyStore::new());
        let mut policy = Policy::new();
        policy.flags.log_euid = true;
        policy.uids = vec![1000];
        store.replace(policy, true).unwrap();

        let auditor = Auditor::new(Arc::clone(&store), MemorySink::new());
        assert!(auditor.observe(&event(1000)));
        assert!(!auditor.observe(&event(1001)));

        let records = auditor.sink().records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            "pid=9 ppid=1 uid=1000 euid=1000 argv={\"/bin/ls\", \"-l\"}"
        );
    }
}
