//! Tests for the check command

use std::fs;

use tempfile::tempdir;

use telegram_sender::commands::check;
use telegram_sender::error::Error;
use telegram_sender::sender::{MemoryReporter, NullReporter};

#[test]
fn test_check_reports_counts() {
    let dir = tempdir().expect("tempdir");
    let groups = dir.path().join("groups.txt");
    let messages = dir.path().join("messages.txt");
    fs::write(&groups, "@a_group\r\n\r\nhttp://t.me/b_group?start=1\r\n").unwrap();
    fs::write(&messages, "one\r\n\r\ntwo\r\n\r\n\r\nthree").unwrap();

    let reporter = MemoryReporter::new();
    let report = check::run(&groups, &messages, &reporter).expect("inputs are valid");

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[1].1, "b_group");
    assert_eq!(report.messages, vec!["one", "two", "three"]);
    assert_eq!(reporter.count("GroupsLoaded"), 1);
    assert_eq!(reporter.count("MessagesLoaded"), 1);
}

#[test]
fn test_check_fails_on_empty_groups() {
    let dir = tempdir().expect("tempdir");
    let groups = dir.path().join("groups.txt");
    let messages = dir.path().join("messages.txt");
    fs::write(&groups, "").unwrap();
    fs::write(&messages, "hello").unwrap();

    let err = check::run(&groups, &messages, &NullReporter).unwrap_err();
    assert!(matches!(err, Error::EmptyInput(_)));
}
