//! CLI error specs
//!
//! Configuration and argument problems exit non-zero with a message.

use crate::prelude::*;

#[test]
fn malformed_env_binding_is_rejected() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);

    temp.gantry()
        .args(&["publish", "--dir", "job", "-e", "NOEQUALS"])
        .fails()
        .stderr_has("malformed env: key values must be separated with '=': \"NOEQUALS\"");
    assert_eq!(temp.queued(), 0);
}

#[test]
fn missing_queue_dir_is_rejected() {
    let temp = Project::empty();

    cli()
        .args(&["consume", "--once", "--config"])
        .args(&[temp.config_path().to_str().unwrap()])
        .fails()
        .stderr_has("queue directory not set");
}

#[test]
fn publish_of_missing_directory_fails() {
    let temp = Project::empty();

    temp.gantry()
        .args(&["publish", "--dir", "does-not-exist"])
        .fails()
        .stderr_has("can not package");
    assert_eq!(temp.queued(), 0);
}

#[test]
fn zero_poll_interval_is_rejected() {
    let temp = Project::empty();

    temp.gantry()
        .args(&["consume", "--once", "--poll-interval", "0s"])
        .fails()
        .stderr_has("poll_interval must be greater than zero");
}

#[test]
fn invalid_config_file_is_rejected() {
    let temp = Project::empty();
    temp.file("gantry.toml", "poll_interval = \"whenever\"\n");

    temp.gantry()
        .args(&["consume", "--once"])
        .fails()
        .stderr_has("invalid config");
}
