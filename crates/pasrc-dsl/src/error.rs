#[derive(Debug)]
pub enum Error {
    TabIndentation { line: u32 },
    BadIndent { line: u32, expected: u32, found: u32 },
    Malformed { line: u32, message: String },
    UnexpectedEof,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TabIndentation { line } => write!(f, "line {line}: tab indentation is not permitted"),
            Self::BadIndent { line, expected, found } => {
                write!(f, "line {line}: expected indent {expected}, found {found}")
            }
            Self::Malformed { line, message } => write!(f, "line {line}: {message}"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for Error {}
