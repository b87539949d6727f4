// CLI surface smoke tests: the binary advertises the full workflow without
// touching any config or data file.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_workflow_commands() {
    let mut cmd = Command::cargo_bin("waybill").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shipment"))
        .stdout(predicate::str::contains("manifest"))
        .stdout(predicate::str::contains("branch"))
        .stdout(predicate::str::contains("staff"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_shipment_help_shows_lifecycle_commands() {
    let mut cmd = Command::cargo_bin("waybill").unwrap();

    cmd.args(["shipment", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("assign"))
        .stdout(predicate::str::contains("deliver"))
        .stdout(predicate::str::contains("fail"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_manifest_help_shows_dispatch_and_receive() {
    let mut cmd = Command::cargo_bin("waybill").unwrap();

    cmd.args(["manifest", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("available"))
        .stdout(predicate::str::contains("dispatch"))
        .stdout(predicate::str::contains("receive"));
}
