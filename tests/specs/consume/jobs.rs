//! Consume specs
//!
//! Publish a directory, run `consume --once`, check the completion record
//! and that the message left the queue whatever the outcome.

use crate::prelude::*;

#[test]
fn hello_fixture_runs_and_is_acknowledged() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);
    temp.publish("job", &[]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stdout_eq("")
        .stderr_has("job completed")
        .stderr_has("Hello Fixture")
        .stderr_has("status=succeeded");

    assert_eq!(temp.queued(), 0);
}

#[test]
fn env_binding_reaches_the_entrypoint() {
    let temp = Project::empty();
    temp.script(
        "job/entrypoint.sh",
        "#!/bin/sh\necho \"TEST_VAR is [$TEST_VAR]\" >&2\n",
    );
    temp.publish("job", &["TEST_VAR=is set"]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_has("TEST_VAR is [is set]");
}

#[test]
fn payload_files_travel_with_the_entrypoint() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", "#!/bin/sh\ncat data/note.txt >&2\n");
    temp.file("job/data/note.txt", "carried along");
    temp.publish("job", &[]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_has("carried along");
}

#[test]
fn failing_entrypoint_is_reported_and_acknowledged() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", "#!/bin/sh\necho broken >&2\nexit 7\n");
    temp.publish("job", &[]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_has("status=failed")
        .stderr_has("exit_code=7");

    assert_eq!(temp.queued(), 0);
}

#[test]
fn missing_entrypoint_is_acknowledged() {
    let temp = Project::empty();
    temp.file("job/README", "nothing to run");
    temp.publish("job", &[]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_has("status=missing_entrypoint");

    assert_eq!(temp.queued(), 0);
}

#[test]
fn non_executable_entrypoint_is_acknowledged() {
    let temp = Project::empty();
    temp.file_with_mode("job/entrypoint.sh", HELLO_FIXTURE, 0o644);
    temp.publish("job", &[]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_has("status=not_executable")
        .stderr_lacks("Hello Fixture\n");

    assert_eq!(temp.queued(), 0);
}

#[test]
fn once_on_empty_queue_exits_cleanly() {
    let temp = Project::empty();

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_lacks("job completed");
}

#[test]
fn messages_are_consumed_oldest_first() {
    let temp = Project::empty();
    temp.script("first/entrypoint.sh", "#!/bin/sh\necho first-job >&2\n");
    temp.script("second/entrypoint.sh", "#!/bin/sh\necho second-job >&2\n");
    temp.publish("first", &[]);
    std::thread::sleep(std::time::Duration::from_millis(20));
    temp.publish("second", &[]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_has("first-job")
        .stderr_lacks("second-job");
    assert_eq!(temp.queued(), 1);
}
