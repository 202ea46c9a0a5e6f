//! Crate-level failures (§7 `FormatNotSupported`/`InternalError`, and the
//! I/O and wire-format causes underneath them). Per-file diagnostics
//! (`ParseError`, `ValidationWarning`, ...) travel through the
//! `ErrorContainer` each operation is handed, not through this enum —
//! this `Error` is for failures that abort the whole pack/unpack.

#[derive(Debug)]
pub enum Error {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    Zip(zip::result::ZipError),
    Ir(pasrc_ir::Error),
    Assets(pasrc_assets::Error),
    /// Source-load version mismatch, or a PKG with no `Properties.json` or
    /// `Header.json` entry (I7).
    FormatNotSupported { found: String, expected: String },
    /// A required PKG entry (§4.6 kind table) is absent.
    MissingEntry(String),
    /// `-test`: the recomputed checksum after a round trip doesn't match
    /// the one stored in the original archive.
    ChecksumMismatch { expected: String, actual: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error at `{path}`: {source}"),
            Self::Json { path, source } => write!(f, "malformed JSON in `{path}`: {source}"),
            Self::Zip(e) => write!(f, "zip archive error: {e}"),
            Self::Ir(e) => write!(f, "{e}"),
            Self::Assets(e) => write!(f, "{e}"),
            Self::FormatNotSupported { found, expected } => {
                write!(f, "unsupported format version `{found}`, expected `{expected}`")
            }
            Self::MissingEntry(name) => write!(f, "missing required entry `{name}`"),
            Self::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch: expected `{expected}`, got `{actual}`")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Zip(e) => Some(e),
            Self::Ir(e) => Some(e),
            Self::Assets(e) => Some(e),
            Self::FormatNotSupported { .. } | Self::MissingEntry(_) | Self::ChecksumMismatch { .. } => None,
        }
    }
}
