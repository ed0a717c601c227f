// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `id@version` flow index: loads documents from one or more
//! directories and resolves either a full `id@version` reference or a
//! bare `id` (which resolves to the highest loaded version).

use crate::doc::IrDocument;
use crate::parser::{parse_document, Format, ParseError};
use crate::validate::{validate_document, ValidationError};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("unresolved flow reference: {0}")]
    NotFound(String),
}

/// An in-memory index of loaded flow documents, keyed by `id@version`.
#[derive(Debug, Default)]
pub struct FlowIndex {
    by_ref: IndexMap<String, IrDocument>,
    versions_by_id: HashMap<String, Vec<u32>>,
}

impl FlowIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `dirs` recursively, parsing every `.flow.hcl`/`.flow.json`
    /// file found (format sniffed from extension) and replacing the
    /// entire index with the freshly loaded set. Returns the `id@version`
    /// refs loaded, in directory-walk order.
    pub fn reload(&mut self, dirs: &[PathBuf]) -> Result<Vec<String>, IndexError> {
        let mut by_ref = IndexMap::new();
        let mut versions_by_id: HashMap<String, Vec<u32>> = HashMap::new();
        let mut loaded = Vec::new();

        for dir in dirs {
            walk_flow_files(dir, &mut |path| {
                let format = Format::from_extension(path).ok_or_else(|| IndexError::Parse {
                    path: path.to_path_buf(),
                    source: ParseError::UnknownExtension(path.display().to_string()),
                })?;
                let content = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let doc = parse_document(&content, format).map_err(|source| IndexError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                validate_document(&doc).map_err(|source| IndexError::Validation {
                    path: path.to_path_buf(),
                    source,
                })?;

                let ref_key = doc.ref_key();
                versions_by_id
                    .entry(doc.id.clone())
                    .or_default()
                    .push(doc.version);
                loaded.push(ref_key.clone());
                by_ref.insert(ref_key, doc);
                Ok(())
            })?;
        }

        for versions in versions_by_id.values_mut() {
            versions.sort_unstable();
        }

        self.by_ref = by_ref;
        self.versions_by_id = versions_by_id;
        Ok(loaded)
    }

    /// Inserts or replaces a single document directly, bypassing directory
    /// discovery. Used by `/api/flow/run` and `/api/flow/validate` to
    /// execute/check a document supplied inline in a request body.
    pub fn insert(&mut self, doc: IrDocument) {
        let ref_key = doc.ref_key();
        self.versions_by_id
            .entry(doc.id.clone())
            .or_default()
            .push(doc.version);
        if let Some(versions) = self.versions_by_id.get_mut(&doc.id) {
            versions.sort_unstable();
            versions.dedup();
        }
        self.by_ref.insert(ref_key, doc);
    }

    /// Resolves a flow reference: either `id@version` or a bare `id`,
    /// which resolves to the highest loaded version.
    pub fn resolve(&self, flow_ref: &str) -> Result<&IrDocument, IndexError> {
        if flow_ref.contains('@') {
            return self
                .by_ref
                .get(flow_ref)
                .ok_or_else(|| IndexError::NotFound(flow_ref.to_string()));
        }
        let version = self
            .versions_by_id
            .get(flow_ref)
            .and_then(|versions| versions.last())
            .ok_or_else(|| IndexError::NotFound(flow_ref.to_string()))?;
        let key = format!("{flow_ref}@{version}");
        self.by_ref
            .get(&key)
            .ok_or_else(|| IndexError::NotFound(flow_ref.to_string()))
    }

    pub fn refs(&self) -> impl Iterator<Item = &str> {
        self.by_ref.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }
}

fn walk_flow_files(
    dir: &Path,
    visit: &mut impl FnMut(&Path) -> Result<(), IndexError>,
) -> Result<(), IndexError> {
    let entries = std::fs::read_dir(dir).map_err(|source| IndexError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| IndexError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk_flow_files(&path, visit)?;
        } else if Format::from_extension(&path).is_some() {
            visit(&path)?;
        }
    }
    Ok(())
}
