//! Structured diagnostics collection (`ErrorContainer`, §7) and the
//! workspace's one-time logger bootstrap.
//!
//! `ErrorContainer` is append-only and monotonically observed: it is the
//! single mutable object threaded through a load or save pass, not a
//! `Result`-style short-circuit. Whether a fatal diagnostic aborts the call
//! is a decision each transform makes for itself (by also returning `Err`);
//! the container only remembers what happened.

use std::sync::Once;

/// One fatal or non-fatal diagnostic record (§7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Code,
    pub message: String,
    pub span: Option<SourceSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
}

/// Diagnostic kinds named in §7. `ParseError` is fatal only for the file it
/// names; processing of other files continues (see `ErrorContainer::push`
/// callers in `pasrc-layout`, which iterate per-file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    FormatNotSupported,
    BadParameter,
    InvalidPath,
    ParseError,
    DuplicateSymbol,
    UnsupportedChange,
    EditorStateError,
    ValidationWarning,
    GenericWarning,
    InternalError,
}

impl Code {
    #[must_use]
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::ValidationWarning | Self::GenericWarning)
    }
}

/// Precise location of a `ParseError`, carried by the external DSL
/// parser/pretty-printer boundary (`pasrc-dsl`) back into a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub file: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Diagnostic {
    #[must_use]
    pub fn fatal(code: Code, message: impl Into<String>) -> Self {
        debug_assert!(code.is_fatal());
        Self {
            severity: Severity::Fatal,
            code,
            message: message.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn warning(code: Code, message: impl Into<String>) -> Self {
        debug_assert!(!code.is_fatal());
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.span {
            Some(span) => write!(
                f,
                "{:?} [{:?}] {}:{}:{}: {}",
                self.severity, self.code, span.file, span.start_line, span.start_col, self.message
            ),
            None => write!(f, "{:?} [{:?}] {}", self.severity, self.code, self.message),
        }
    }
}

/// Append-only diagnostics sink passed through a whole load or save pass.
#[derive(Debug, Default)]
pub struct ErrorContainer {
    records: Vec<Diagnostic>,
}

impl ErrorContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.records.push(diag);
    }

    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.records.iter().any(|d| d.severity == Severity::Fatal)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Folds another container's records into this one. Used when a loader
    /// processes several files independently and needs to merge their
    /// per-file diagnostics without letting one file's fatal error swallow
    /// another's.
    pub fn extend(&mut self, other: ErrorContainer) {
        self.records.extend(other.records);
    }
}

static LOGGER_INIT: Once = Once::new();

#[derive(Debug)]
pub struct LogInitError(String);

impl std::fmt::Display for LogInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to initialize logger: {}", self.0)
    }
}

impl std::error::Error for LogInitError {}

/// Installs `env_logger` exactly once per process. Safe to call more than
/// once (subsequent calls are no-ops); library crates never call this
/// themselves, only the CLI, at startup, with its own version banner.
pub fn init_diag(banner: &str) -> Result<(), LogInitError> {
    let mut result = Ok(());

    LOGGER_INIT.call_once(|| {
        if let Err(e) = env_logger::try_init() {
            result = Err(LogInitError(e.to_string()));
            return;
        }

        log::info!("{banner}");
    });

    result
}
