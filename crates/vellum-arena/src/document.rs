//! JSON text and file I/O for arena nodes.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use vellum_core::{NodeError, NodeHandle, Value};

use crate::arena::NodeArena;

/// Widest indentation honoured by pretty printing.
pub const MAX_INDENT: i32 = 32;

impl NodeArena {
    /// Parse legacy-encoded JSON text into a new node stored in `out`.
    pub fn parse(&mut self, text: &[u8], out: &mut NodeHandle) -> Result<(), NodeError> {
        let utf8 = self.codepage().encode(text);
        let value: Value = serde_json::from_str(&utf8)?;
        self.store_output(out, value)
    }

    /// Parse a UTF-8 JSON file into a new node stored in `out`.
    ///
    /// Fails with [`NodeError::NoSuchFile`] unless `path` names an existing
    /// regular file.
    pub fn parse_file(&mut self, path: &Path, out: &mut NodeHandle) -> Result<(), NodeError> {
        let is_file = fs::metadata(path).is_ok_and(|meta| meta.is_file());
        if !is_file {
            return Err(NodeError::NoSuchFile {
                path: path.to_path_buf(),
            });
        }
        let bytes = fs::read(path)?;
        let value: Value = serde_json::from_slice(&bytes)?;
        self.store_output(out, value)
    }

    /// Serialize a node to legacy-encoded JSON text.
    ///
    /// A negative `indent` produces compact output; otherwise each nesting
    /// level is indented by `indent` spaces (capped at [`MAX_INDENT`]).
    pub fn stringify(&self, node: NodeHandle, indent: i32) -> Result<Vec<u8>, NodeError> {
        let text = to_json_text(self.value(node)?, indent)?;
        Ok(self.codepage().decode(&text))
    }

    /// Write a node to `path` as UTF-8 JSON text with a trailing newline.
    ///
    /// Missing parent directories are created. Fails with
    /// [`NodeError::NoSuchDirectory`] if a parent path exists but is not a
    /// directory.
    pub fn save_file(&self, path: &Path, node: NodeHandle, indent: i32) -> Result<(), NodeError> {
        let mut text = to_json_text(self.value(node)?, indent)?;
        text.push(b'\n');

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let not_a_dir = || NodeError::NoSuchDirectory {
                path: parent.to_path_buf(),
            };
            if parent.exists() && !parent.is_dir() {
                return Err(not_a_dir());
            }
            fs::create_dir_all(parent).map_err(|e| match e.kind() {
                ErrorKind::NotADirectory | ErrorKind::AlreadyExists => not_a_dir(),
                _ => NodeError::from(e),
            })?;
        }
        fs::write(path, text)?;
        Ok(())
    }
}

fn to_json_text(value: &Value, indent: i32) -> Result<Vec<u8>, NodeError> {
    if indent < 0 {
        return Ok(serde_json::to_vec(value)?);
    }
    let pad = vec![b' '; indent.min(MAX_INDENT) as usize];
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&pad));
    value.serialize(&mut ser)?;
    Ok(out)
}
