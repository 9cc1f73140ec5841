//! Completion record format specs

use crate::prelude::*;

#[test]
fn json_output_emits_structured_record() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);
    let id = temp.publish("job", &["TEST_VAR=x"]);

    temp.gantry()
        .args(&["-o", "json", "consume", "--once"])
        .passes()
        .stderr_has("\"message\":\"job completed\"")
        .stderr_has(&format!("\"message_id\":\"{id}\""))
        .stderr_has("\"status\":\"succeeded\"")
        .stderr_has("\"success\":true")
        .stderr_has("\"env\":\"TEST_VAR=x\"");
}

#[test]
fn log_file_receives_the_record() {
    let temp = Project::empty();
    temp.file(
        "gantry.toml",
        &format!("{QUICK_CONFIG}log_file = \"logs/gantry.log\"\n"),
    );
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);
    temp.publish("job", &[]);

    temp.gantry()
        .args(&["consume", "--once"])
        .passes()
        .stderr_lacks("job completed");

    let log = std::fs::read_to_string(temp.path().join("logs/gantry.log")).unwrap();
    assert!(log.contains("job completed"), "{log}");
    assert!(log.contains("Hello Fixture"), "{log}");
}

#[test]
fn debug_flag_enables_debug_records() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);
    temp.publish("job", &[]);

    temp.gantry()
        .args(&["--debug", "consume", "--once"])
        .passes()
        .stderr_has("payload decoded");
}
