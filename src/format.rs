//! Audit record formatting
//!
//! Renders a matched event and its field selection into one deterministic
//! text line. This is the canonical formatter used by every output path,
//! so records look the same no matter which sink they reach.
//!
//! Field order is fixed: pid ppid uid [euid] [suid] [egid] [sgid]
//! argv={...} [envp={...}]. Elements of argv/envp are double-quoted and
//! comma-separated; embedded quotes and control characters are preserved
//! as-is, so a sink that must resist log forgery has to sanitize records
//! itself.

use std::fmt::Write;

use crate::decision::FieldSelection;
use crate::event::ExecEvent;

/// Render a matched event into a single audit record line.
pub fn format_record(event: &ExecEvent, fields: &FieldSelection) -> String {
    let mut out = String::with_capacity(64);

    // write! to a String cannot fail
    let _ = write!(
        out,
        "pid={} ppid={} uid={}",
        event.pid, event.ppid, event.creds.uid
    );
    if fields.euid {
        let _ = write!(out, " euid={}", event.creds.euid);
    }
    if fields.suid {
        let _ = write!(out, " suid={}", event.creds.suid);
    }
    if fields.egid {
        let _ = write!(out, " egid={}", event.creds.egid);
    }
    if fields.sgid {
        let _ = write!(out, " sgid={}", event.creds.sgid);
    }

    out.push_str(" argv=");
    push_list(&mut out, &event.argv);
    if fields.envp {
        out.push_str(" envp=");
        push_list(&mut out, &event.envp);
    }

    out
}

fn push_list(out: &mut String, items: &[String]) {
    out.push('{');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "\"{}\"", item);
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Credentials;

    fn ls_event() -> ExecEvent {
        ExecEvent::from_hook(
            4242,
            77,
            Credentials {
                uid: 1000,
                euid: 1000,
                suid: 1000,
                gid: 100,
                egid: 100,
                sgid: 100,
            },
            "/bin/ls",
            Some(vec!["/bin/ls".into(), "-l".into()]),
            Some(vec!["HOME=/home/u".into()]),
        )
    }

    #[test]
    fn baseline_fields_only() {
        let record = format_record(&ls_event(), &FieldSelection::default());
        assert_eq!(record, "pid=4242 ppid=77 uid=1000 argv={\"/bin/ls\", \"-l\"}");
    }

    #[test]
    fn euid_and_suid_in_fixed_order() {
        let fields = FieldSelection {
            euid: true,
            suid: true,
            ..FieldSelection::default()
        };
        let record = format_record(&ls_event(), &fields);
        assert_eq!(
            record,
            "pid=4242 ppid=77 uid=1000 euid=1000 suid=1000 argv={\"/bin/ls\", \"-l\"}"
        );
        assert!(!record.contains("egid="));
        assert!(!record.contains("sgid="));
    }

    #[test]
    fn envp_rendered_only_when_selected() {
        let mut fields = FieldSelection::default();
        let without = format_record(&ls_event(), &fields);
        assert!(!without.contains("envp="));

        fields.envp = true;
        let with = format_record(&ls_event(), &fields);
        assert!(with.ends_with(" envp={\"HOME=/home/u\"}"));
    }

    #[test]
    fn empty_argv_renders_empty_braces() {
        let event = ExecEvent::from_hook(1, 0, Credentials::default(), "/bin/true", None, None);
        let record = format_record(&event, &FieldSelection::default());
        assert!(record.ends_with(" argv={}"));
    }

    #[test]
    fn embedded_quotes_are_not_escaped() {
        let event = ExecEvent::from_hook(
            1,
            0,
            Credentials::default(),
            "/bin/echo",
            Some(vec!["/bin/echo".into(), "a\"b".into()]),
            None,
        );
        let record = format_record(&event, &FieldSelection::default());
        assert!(record.contains("\"a\"b\""));
    }
}
