//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("publish")
        .stdout_has("consume");
}

#[test]
fn publish_help_shows_dir_and_env() {
    cli()
        .args(&["publish", "--help"])
        .passes()
        .stdout_has("--dir")
        .stdout_has("KEY=VALUE");
}

#[test]
fn consume_help_shows_once() {
    cli()
        .args(&["consume", "--help"])
        .passes()
        .stdout_has("--once")
        .stdout_has("--visibility-timeout");
}

#[test]
fn no_subcommand_fails() {
    cli().fails().stderr_has("Usage");
}
