//! Payload loading with encoding fallback.
//!
//! Report payloads are JSON documents stored as UTF-16LE text (the data
//! model sometimes as UTF-8). [`load_json`] decodes a file with a primary
//! encoding, retries once with a fallback encoding on a decoding failure, and
//! parses the text as JSON.
//!
//! Only a missing file is reported to the caller. Every other problem
//! (undecodable bytes, malformed JSON, an unreadable file) is logged and
//! degrades to an empty JSON mapping, which the typed records read as "no
//! pages / no tables".
//!
//! # Examples
//!
//! ```no_run
//! use pbi_doc_container::{TextEncoding, load_json};
//!
//! let layout = load_json(
//!     "work/Report/Layout".as_ref(),
//!     TextEncoding::Utf16Le,
//!     TextEncoding::Utf8,
//! )
//! .unwrap();
//! assert!(layout.is_object());
//! ```

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::{ContainerError, Result};

/// Text encodings a payload may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Little-endian UTF-16 without a required byte-order mark.
    Utf16Le,
    Utf8,
}

/// Why a byte buffer could not be decoded as text.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// UTF-16 data must have an even number of bytes.
    #[error("truncated UTF-16 data: {0} bytes")]
    TruncatedUtf16(usize),

    #[error("invalid UTF-16: {0}")]
    InvalidUtf16(#[from] std::string::FromUtf16Error),

    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl TextEncoding {
    /// Decodes `bytes` into a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbi_doc_container::TextEncoding;
    ///
    /// let bytes: Vec<u8> = "{}".encode_utf16().flat_map(u16::to_le_bytes).collect();
    /// assert_eq!(TextEncoding::Utf16Le.decode(&bytes).unwrap(), "{}");
    /// assert!(TextEncoding::Utf16Le.decode(b"{}x").is_err());
    /// ```
    pub fn decode(self, bytes: &[u8]) -> std::result::Result<String, DecodeError> {
        match self {
            TextEncoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(DecodeError::TruncatedUtf16(bytes.len()));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                Ok(String::from_utf16(&units)?)
            }
            TextEncoding::Utf8 => Ok(String::from_utf8(bytes.to_vec())?),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf16Le => write!(f, "utf-16-le"),
            TextEncoding::Utf8 => write!(f, "utf-8"),
        }
    }
}

/// Reads and parses a JSON payload.
///
/// # Errors
///
/// Returns [`ContainerError::NotFound`] if `path` does not exist. All other
/// failures are logged and yield an empty mapping.
pub fn load_json(path: &Path, primary: TextEncoding, fallback: TextEncoding) -> Result<Value> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            error!(path = %path.display(), "payload file not found");
            return Err(ContainerError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) => {
            error!(path = %path.display(), %err, "failed to read payload");
            return Ok(empty_mapping());
        }
    };

    let text = match primary.decode(&bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                path = %path.display(),
                %err,
                "decoding as {primary} failed, retrying as {fallback}"
            );
            match fallback.decode(&bytes) {
                Ok(text) => text,
                Err(err) => {
                    error!(path = %path.display(), %err, "decoding as {fallback} failed");
                    return Ok(empty_mapping());
                }
            }
        }
    };

    match serde_json::from_str(strip_bom(&text)) {
        Ok(value) => {
            info!(path = %path.display(), "payload loaded");
            Ok(value)
        }
        Err(err) => {
            error!(path = %path.display(), %err, "payload is not valid JSON");
            Ok(empty_mapping())
        }
    }
}

/// Loads a payload stored as UTF-16LE, falling back to UTF-8.
pub fn load_payload(path: &Path) -> Result<Value> {
    load_json(path, TextEncoding::Utf16Le, TextEncoding::Utf8)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

fn empty_mapping() -> Value {
    Value::Object(Map::new())
}
