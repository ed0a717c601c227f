// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lw_core::test_support::fresh_session;
use lw_core::value::{Item, Value};

#[test]
fn small_document_round_trips_uncompressed() {
    let dir = tempfile::tempdir().unwrap();
    let path = session_path(dir.path(), "s1");
    let session = fresh_session("s1", "b1", Item::new().with("turn_count", 0i64));

    write_document(&path, &session).unwrap();
    assert_eq!(fs::read(&path).unwrap()[0], FLAG_PLAIN);

    let loaded = read_document(&path).unwrap().unwrap();
    assert_eq!(loaded.id, session.id);
}

#[test]
fn large_document_is_compressed_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = session_path(dir.path(), "s1");
    let mut state = Item::new();
    for i in 0..2000 {
        state = state.with(format!("field_{i}"), Value::Str("x".repeat(50)));
    }
    let session = fresh_session("s1", "b1", state);

    write_document(&path, &session).unwrap();
    assert_eq!(fs::read(&path).unwrap()[0], FLAG_ZSTD);

    let loaded = read_document(&path).unwrap().unwrap();
    assert_eq!(loaded.lss.get("field_1"), session.lss.get("field_1"));
}

#[test]
fn missing_document_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = session_path(dir.path(), "nope");
    assert!(read_document(&path).unwrap().is_none());
}
