// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::OpId;

#[test]
fn idbuf_roundtrips_str() {
    let id = IdBuf::new("op-abc123");
    assert_eq!(id.as_str(), "op-abc123");
}

#[test]
fn generated_op_ids_are_unique_and_prefixed() {
    let a = OpId::new();
    let b = OpId::new();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with(OpId::PREFIX));
    assert_eq!(a.as_str().len(), OpId::PREFIX.len() + 19);
}

#[test]
fn op_id_suffix_strips_prefix() {
    let id = OpId::from_string("op-xyz");
    assert_eq!(id.suffix(), "xyz");
    assert_eq!(id.short(2), "xy");
}

#[test]
fn op_id_compares_with_str() {
    let id = OpId::from_string("op-xyz");
    assert_eq!(id, "op-xyz");
}

#[test]
fn op_id_serde_is_transparent() {
    let id = OpId::from_string("op-xyz");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"op-xyz\"");
    let back: OpId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
