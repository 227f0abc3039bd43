// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: KEEL_STATE_DIR > XDG_STATE_HOME/keel > ~/.local/state/keel
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    resolve_state_dir(
        std::env::var("KEEL_STATE_DIR").ok(),
        std::env::var("XDG_STATE_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn resolve_state_dir(
    explicit: Option<String>,
    xdg_state_home: Option<String>,
    home: Option<String>,
) -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = explicit.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = xdg_state_home.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(xdg).join("keel"));
    }
    let home = home.filter(|d| !d.is_empty()).ok_or(LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/keel"))
}

/// Log filter (`KEEL_LOG`), tracing `EnvFilter` syntax.
pub fn log_filter() -> String {
    std::env::var("KEEL_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
