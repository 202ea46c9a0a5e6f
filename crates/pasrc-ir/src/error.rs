#[derive(Debug)]
pub enum Error {
    DuplicateControlName(String),
    MissingThisProperty(String),
    UnknownScopeParameter { function: String, parameter: String },
    UnsupportedChange(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateControlName(name) => {
                write!(f, "duplicate control identifier `{name}` outside a test suite subtree")
            }
            Self::MissingThisProperty(func) => {
                write!(f, "function property `{func}` has no ThisProperty default")
            }
            Self::UnknownScopeParameter { function, parameter } => {
                write!(f, "function `{function}` references unknown parameter `{parameter}`")
            }
            Self::UnsupportedChange(prop) => {
                write!(f, "new property `{prop}` added to a component definition is not supported")
            }
        }
    }
}

impl std::error::Error for Error {}
