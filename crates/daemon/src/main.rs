// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `keeld` — the keel appliance control-plane daemon.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match keel_daemon::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("keeld: {err}");
            ExitCode::FAILURE
        }
    }
}
