//! Decoding test sources with the configured character encoding.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};

/// Decodes source files with one encoding.
///
/// A byte order mark in the file overrides the configured encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDecoder {
    encoding: &'static Encoding,
}

impl SourceDecoder {
    /// Decoder for a WHATWG encoding label such as `UTF-8` or `ISO-8859-1`.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(|encoding| Self { encoding })
    }

    pub fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode raw bytes. Malformed sequences become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _, _) = self.encoding.decode(bytes);
        text.into_owned()
    }

    /// Read and decode a file.
    pub fn read(&self, path: &Path) -> Result<String> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(self.decode(&bytes))
    }
}

impl Default for SourceDecoder {
    fn default() -> Self {
        Self::utf8()
    }
}
