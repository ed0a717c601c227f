// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing for the two on-disk encodings: tag-delimited (HCL) and
//! brace-delimited (JSON). Both decode into the same [`IrDocument`].

use crate::doc::IrDocument;
use std::path::Path;
use thiserror::Error;

/// The on-disk encoding a document was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Hcl,
    Json,
}

impl Format {
    /// Sniffs the format from a file extension: `.flow.hcl` vs `.flow.json`.
    pub fn from_extension(path: &Path) -> Option<Format> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".flow.hcl") {
            Some(Format::Hcl)
        } else if name.ends_with(".flow.json") {
            Some(Format::Json)
        } else {
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("HCL parse error: {0}")]
    Hcl(#[from] hcl::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized flow file extension: {0}")]
    UnknownExtension(String),
}

/// Parses document source text in the given format.
pub fn parse_document(content: &str, format: Format) -> Result<IrDocument, ParseError> {
    let doc = match format {
        Format::Hcl => hcl::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_json_document() {
        let content = r#"{
            "id": "main",
            "version": 1,
            "entry": "reply",
            "nodes": [
                {"id": "reply", "type": "LLMChat"}
            ]
        }"#;
        let doc = parse_document(content, Format::Json).unwrap();
        assert_eq!(doc.id, "main");
        assert_eq!(doc.entry, "reply");
        assert_eq!(doc.nodes.len(), 1);
    }

    #[test]
    fn parses_tag_delimited_hcl_document() {
        let content = r#"
            id = "main"
            version = 1
            entry = "reply"

            node {
                id = "reply"
                type = "LLMChat"
            }
        "#;
        let doc = parse_document(content, Format::Hcl).unwrap();
        assert_eq!(doc.id, "main");
        assert_eq!(doc.version, 1);
        assert_eq!(doc.nodes[0].id, "reply");
        assert_eq!(doc.nodes[0].type_name, "LLMChat");
    }

    #[test]
    fn sniffs_format_from_extension() {
        assert_eq!(
            Format::from_extension(Path::new("flows/main.flow.hcl")),
            Some(Format::Hcl)
        );
        assert_eq!(
            Format::from_extension(Path::new("flows/main.flow.json")),
            Some(Format::Json)
        );
        assert_eq!(Format::from_extension(Path::new("flows/main.txt")), None);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_document("{not json", Format::Json).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }
}
