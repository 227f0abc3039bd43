// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn exit_error(code: i32) -> ExecError {
    ExecError::Exit {
        program: "smartctl".into(),
        code,
        stdout: b"{}".to_vec(),
        stderr: "".into(),
    }
}

#[test]
fn exit_code_exposed_for_nonzero_exit() {
    assert_eq!(exit_error(4).exit_code(), Some(4));
}

#[test]
fn exit_code_absent_for_other_failures() {
    let err = ExecError::Cancelled { program: "zpool".into() };
    assert_eq!(err.exit_code(), None);
    assert!(err.is_cancelled());

    let err = ExecError::Signalled { program: "zpool".into() };
    assert_eq!(err.exit_code(), None);
    assert!(!err.is_cancelled());
}

#[test]
fn exit_stdout_preserved() {
    assert_eq!(exit_error(64).exit_stdout(), Some(b"{}".as_slice()));
}

#[test]
fn display_includes_program_and_code() {
    let message = exit_error(2).to_string();
    assert!(message.contains("smartctl"));
    assert!(message.contains('2'));
}
