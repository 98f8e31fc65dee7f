//! End-to-end daemon test
//!
//! Spawns execauditd with a temporary control socket, reconfigures it
//! through the admin CLI, feeds exec events over stdin and checks the
//! records emitted on stdout.

use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;

fn spawn_daemon(socket: &Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_execauditd"))
        .arg("--socket")
        .arg(socket)
        .arg("--admin-uid")
        .arg(users::get_current_uid().to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn execauditd")
}

fn wait_for_socket(path: &Path) {
    for _ in 0..200 {
        if path.exists() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("daemon never created {}", path.display());
}

fn admin(socket: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_execaudit"))
        .args(args)
        .arg("-s")
        .arg(socket)
        .output()
        .expect("failed to run execaudit")
}

fn event_json(pid: u32, uid: u32, euid: u32) -> String {
    format!(
        r#"{{"pid":{pid},"ppid":77,"uid":{uid},"euid":{euid},"suid":{euid},"gid":100,"egid":100,"sgid":100,"path":"/bin/ls","argv":["/bin/ls","-l"]}}"#
    )
}

#[test]
fn configured_daemon_audits_matching_events() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("control.sock");
    let mut daemon = spawn_daemon(&socket);
    wait_for_socket(&socket);

    // Enable auditing of uid 1000 with the effective UID recorded
    let output = admin(&socket, &["on", "-e", "euid", "-u", "1000"]);
    assert!(output.status.success(), "admin set failed: {:?}", output);

    // The daemon should now report the configured policy
    let output = admin(&socket, &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("   on: yes"), "status was: {stdout}");
    assert!(stdout.contains(" euid: yes"), "status was: {stdout}");
    assert!(stdout.contains("users: 1000"), "status was: {stdout}");

    // One matching and one non-matching event
    {
        let stdin = daemon.stdin.as_mut().expect("daemon stdin");
        writeln!(stdin, "{}", event_json(4242, 1000, 1000)).unwrap();
        writeln!(stdin, "{}", event_json(4243, 5, 5)).unwrap();
    }
    drop(daemon.stdin.take());

    let output = daemon.wait_with_output().expect("daemon did not exit");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let records: Vec<&str> = stdout.lines().collect();
    assert_eq!(records.len(), 1, "unexpected records: {stdout}");
    assert_eq!(
        records[0],
        "pid=4242 ppid=77 uid=1000 euid=1000 argv={\"/bin/ls\", \"-l\"}"
    );
}

#[test]
fn daemon_starts_inert_and_exits_on_feed_close() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("control.sock");
    let mut daemon = spawn_daemon(&socket);
    wait_for_socket(&socket);

    // No policy configured: even a root exec event produces nothing
    {
        let stdin = daemon.stdin.as_mut().expect("daemon stdin");
        writeln!(stdin, "{}", event_json(1, 0, 0)).unwrap();
    }
    drop(daemon.stdin.take());

    let output = daemon.wait_with_output().expect("daemon did not exit");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}
