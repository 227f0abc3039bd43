// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn token() -> CancellationToken {
    CancellationToken::new()
}

#[tokio::test]
async fn output_captures_stdout() {
    let runner = SystemRunner::new();
    let out = runner.output(&token(), "echo", &["hello"]).await.unwrap();
    assert_eq!(String::from_utf8_lossy(&out), "hello\n");
}

#[tokio::test]
async fn combined_output_includes_stderr() {
    let runner = SystemRunner::new();
    let out = runner
        .combined_output(&token(), "sh", &["-c", "echo out; echo err >&2"])
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("out"));
    assert!(text.contains("err"));
}

#[tokio::test]
async fn nonzero_exit_carries_code_and_output() {
    let runner = SystemRunner::new();
    let err = runner
        .output(&token(), "sh", &["-c", "echo report; echo oops >&2; exit 3"])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), Some(3));
    assert_eq!(err.exit_stdout(), Some(b"report\n".as_slice()));
    assert!(err.to_string().contains("oops"));
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let runner = SystemRunner::new();
    let err = runner.run(&token(), "keel-no-such-tool", &[]).await.unwrap_err();
    assert!(matches!(err, ExecError::Spawn { .. }));
    assert_eq!(err.exit_code(), None);
}

#[tokio::test]
async fn cancellation_terminates_the_child() {
    let runner = SystemRunner::new();
    let cancel = token();

    let child = cancel.child_token();
    let handle = tokio::spawn({
        let runner = runner.clone();
        async move { runner.run(&child, "sleep", &["30"]).await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let err = handle.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn snippet_truncates_on_char_boundary() {
    let text = "héllo wörld".as_bytes();
    let snippet = truncate_snippet(text, 2);
    assert!(snippet.len() <= 2);
    assert!("héllo wörld".starts_with(&snippet));
}
