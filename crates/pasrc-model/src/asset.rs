//! Binary asset entries (§3 `Document::assets`, §4.2 `AssetTable`).

/// One binary asset: the blob itself plus its on-disk file name, exact case
/// included. The map key it's stored under (`NormalizedPath`) is lowercased
/// for lookup; `display_name` is the only place the real casing survives
/// `AssetStabilizer`'s renames (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBlob {
    pub bytes: Vec<u8>,
    pub display_name: String,
}

impl AssetBlob {
    #[must_use]
    pub fn new(bytes: Vec<u8>, display_name: impl Into<String>) -> Self {
        Self {
            bytes,
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A passthrough file kept verbatim because this tool doesn't understand its
/// format (`Document::unknown_files`, §3). Same case-preserving-sidecar shape
/// as [`AssetBlob`]: the map key is a lowercased `NormalizedPath` for lookup,
/// `display_name` is the original path exactly as it appeared in the archive
/// or source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBlob {
    pub bytes: Vec<u8>,
    pub display_name: String,
}

impl UnknownBlob {
    #[must_use]
    pub fn new(bytes: Vec<u8>, display_name: impl Into<String>) -> Self {
        Self {
            bytes,
            display_name: display_name.into(),
        }
    }
}
