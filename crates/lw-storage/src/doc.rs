// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk encoding of one session's canonical document: a single JSON
//! blob, zstd-compressed once it crosses [`COMPRESSION_THRESHOLD_BYTES`],
//! written via temp-file + fsync + rename so a crash mid-write never
//! corrupts the previous durable copy.

use crate::error::StoreError;
use lw_core::Session;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

pub const CURRENT_DOC_VERSION: u32 = 1;

const COMPRESSION_THRESHOLD_BYTES: usize = 16 * 1024;
const ZSTD_LEVEL: i32 = 3;

const FLAG_PLAIN: u8 = 0;
const FLAG_ZSTD: u8 = 1;

pub(crate) fn session_path(root: &Path, session_id: &str) -> std::path::PathBuf {
    root.join(session_id).join("session.json")
}

/// Serializes `session` to JSON, compresses it if large, and atomically
/// replaces the file at `path` (write `.tmp`, fsync, rename, fsync parent
/// dir).
pub(crate) fn write_document(path: &Path, session: &Session) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec(session)?;
    let (flag, payload) = if json.len() > COMPRESSION_THRESHOLD_BYTES {
        let compressed =
            zstd::encode_all(json.as_slice(), ZSTD_LEVEL).map_err(|e| StoreError::Compress(e.to_string()))?;
        (FLAG_ZSTD, compressed)
    } else {
        (FLAG_PLAIN, json)
    };

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(&[flag])?;
        file.write_all(&payload)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Loads and decodes the document at `path`, or `Ok(None)` if it doesn't
/// exist.
pub(crate) fn read_document(path: &Path) -> Result<Option<Session>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let mut raw = Vec::new();
    File::open(path)?.read_to_end(&mut raw)?;
    let Some((&flag, payload)) = raw.split_first() else {
        return Ok(None);
    };

    let json = match flag {
        FLAG_ZSTD => zstd::decode_all(payload).map_err(|e| StoreError::Compress(e.to_string()))?,
        _ => payload.to_vec(),
    };

    let session = serde_json::from_slice(&json)?;
    Ok(Some(session))
}

#[cfg(test)]
#[path = "doc_tests.rs"]
mod tests;
