#[derive(Debug)]
pub enum Error {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    FormatNotSupported { found: String, expected: String },
    MissingManifestField(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{path}: {source}"),
            Self::Json { path, source } => write!(f, "{path}: {source}"),
            Self::FormatNotSupported { found, expected } => {
                write!(f, "source format `{found}` does not match this tool's format `{expected}`")
            }
            Self::MissingManifestField(field) => write!(f, "CanvasManifest.json is missing `{field}`"),
        }
    }
}

impl std::error::Error for Error {}
