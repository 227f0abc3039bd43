// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn token() -> CancellationToken {
    CancellationToken::new()
}

#[tokio::test]
async fn records_calls_in_order() {
    let mock = MockRunner::new();
    mock.set_output("zpool", "");
    mock.set_output("zfs", "");

    mock.run(&token(), "zpool", &["list"]).await.unwrap();
    mock.run(&token(), "zfs", &["list", "-t", "snapshot"]).await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, "zpool");
    assert_eq!(calls[1].args, vec!["list", "-t", "snapshot"]);
    assert_eq!(mock.calls_for("zfs").len(), 1);
}

#[tokio::test]
async fn queued_responses_are_consumed_before_sticky() {
    let mock = MockRunner::new();
    mock.set_output("lsblk", "sticky");
    mock.push_output("lsblk", "first");

    let out = mock.output(&token(), "lsblk", &[]).await.unwrap();
    assert_eq!(out, b"first");
    let out = mock.output(&token(), "lsblk", &[]).await.unwrap();
    assert_eq!(out, b"sticky");
    let out = mock.output(&token(), "lsblk", &[]).await.unwrap();
    assert_eq!(out, b"sticky");
}

#[tokio::test]
async fn configured_exit_replays_code_and_stdout() {
    let mock = MockRunner::new();
    mock.set_exit("smartctl", 8, "{\"passed\":false}", "disk failing");

    let err = mock.output(&token(), "smartctl", &["-a"]).await.unwrap_err();
    assert_eq!(err.exit_code(), Some(8));
    assert_eq!(err.exit_stdout(), Some(b"{\"passed\":false}".as_slice()));
}

#[tokio::test]
async fn spawn_failure_and_unconfigured_program() {
    let mock = MockRunner::new();
    mock.set_spawn_failure("zpool");

    assert!(matches!(
        mock.run(&token(), "zpool", &[]).await.unwrap_err(),
        ExecError::Spawn { .. }
    ));
    // never configured at all
    assert!(matches!(
        mock.run(&token(), "mystery", &[]).await.unwrap_err(),
        ExecError::Spawn { .. }
    ));
}

#[tokio::test]
async fn cancelled_scope_short_circuits() {
    let mock = MockRunner::new();
    mock.set_output("zfs", "");
    let cancel = token();
    cancel.cancel();

    let err = mock.run(&cancel, "zfs", &[]).await.unwrap_err();
    assert!(err.is_cancelled());
    // the attempt is still recorded
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn reset_clears_everything() {
    let mock = MockRunner::new();
    mock.set_output("zpool", "x");
    mock.run(&token(), "zpool", &[]).await.unwrap();

    mock.reset();
    assert!(mock.calls().is_empty());
    assert!(mock.run(&token(), "zpool", &[]).await.is_err());
}
