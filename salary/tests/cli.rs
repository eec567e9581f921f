//! End-to-end tests of the salary CLI.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn calculates_hourly_only() {
    Command::cargo_bin("patver_salary")
        .unwrap()
        .args(["Alice", "B", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("Total salary: 1000"));
}

#[test]
fn calculates_with_pieces() {
    Command::cargo_bin("patver_salary")
        .unwrap()
        .args(["Bob", "A", "30", "--pieces", "50,3;30,5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Piecework wage: 300"))
        .stdout(predicate::str::contains("Total salary: 900"));
}

#[test]
fn rejects_unknown_level() {
    Command::cargo_bin("patver_salary")
        .unwrap()
        .args(["Eve", "X", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown pay level"));
}

#[test]
fn rejects_negative_hours() {
    Command::cargo_bin("patver_salary")
        .unwrap()
        .args(["Eve", "A", "--", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be negative"));
}

#[test]
fn rejects_malformed_pieces() {
    Command::cargo_bin("patver_salary")
        .unwrap()
        .args(["Eve", "A", "10", "--pieces", "50;3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity,price"));
}
