//! Publish specs

use crate::prelude::*;

#[test]
fn publish_prints_message_id() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);

    let id = temp.publish("job", &[]);

    assert!(!id.is_empty());
    assert_eq!(temp.queued(), 1);
    assert!(temp
        .queue_dir()
        .join("messages")
        .join(format!("{id}.payload"))
        .is_file());
}

#[test]
fn publish_records_env_bindings() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);

    let id = temp.publish("job", &["TEST_VAR=is set", "EQ=a=b"]);

    let record = std::fs::read_to_string(
        temp.queue_dir()
            .join("messages")
            .join(format!("{id}.json")),
    )
    .unwrap();
    assert!(record.contains("\"TEST_VAR\": \"is set\""), "{record}");
    assert!(record.contains("\"EQ\": \"a=b\""), "{record}");
}

#[test]
fn each_publish_is_a_separate_message() {
    let temp = Project::empty();
    temp.script("job/entrypoint.sh", HELLO_FIXTURE);

    let a = temp.publish("job", &[]);
    let b = temp.publish("job", &[]);

    assert_ne!(a, b);
    assert_eq!(temp.queued(), 2);
}
