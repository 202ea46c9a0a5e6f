//! Top-level CLI failures: usage errors plus whatever the three library
//! crates report. This is the one place that aggregates `pasrc_pkg::Error`
//! and `pasrc_layout::Error` — neither library crate needs to know about
//! the other.

#[derive(Debug)]
pub enum Error {
    /// Wrong number/shape of arguments (exit code 2).
    Usage,
    Io { path: String, source: std::io::Error },
    Pkg(pasrc_pkg::Error),
    Layout(pasrc_layout::Error),
    Dsl(pasrc_dsl::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage => write!(
                f,
                "usage: pasrc -unpack <pkg> [<outDir>] | -pack <pkg> <srcDir> | \
                 -make <pkg> <pkgsDir> <paFile> | -test <pkg> | -testall <dir>"
            ),
            Self::Io { path, source } => write!(f, "{path}: {source}"),
            Self::Pkg(e) => write!(f, "{e}"),
            Self::Layout(e) => write!(f, "{e}"),
            Self::Dsl(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Usage => None,
            Self::Io { source, .. } => Some(source),
            Self::Pkg(e) => Some(e),
            Self::Layout(e) => Some(e),
            Self::Dsl(e) => Some(e),
        }
    }
}

impl From<pasrc_pkg::Error> for Error {
    fn from(e: pasrc_pkg::Error) -> Self {
        Self::Pkg(e)
    }
}

impl From<pasrc_layout::Error> for Error {
    fn from(e: pasrc_layout::Error) -> Self {
        Self::Layout(e)
    }
}

impl From<pasrc_dsl::Error> for Error {
    fn from(e: pasrc_dsl::Error) -> Self {
        Self::Dsl(e)
    }
}
