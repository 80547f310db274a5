//! Error types for descriptor construction, parsing and writing.
//!
//! Parsing never unwinds: every failure comes back as an [`Error`] value that
//! records where the parser gave up. The position is advisory, it tells a human
//! where to look but is not a point from which parsing can resume.
//!
//! ## Error Categories
//!
//! - **Syntax**: missing or mismatched bracket, separator or quote
//! - **Lexical**: bad escape sequence, malformed number or literal
//! - **Semantic**: well-formed token that does not fit the host value (numeric
//!   overflow, element-list arity, a host type lacking the needed capability)
//! - **Invalid descriptor**: schema composition rejected at construction time
//!
//! ## Examples
//!
//! ```rust
//! use json_descriptor::{from_str, Descriptor, Error};
//!
//! let result: Result<Vec<i32>, Error> =
//!     from_str("[1, 2", &Descriptor::array(Descriptor::number()));
//! let err = result.unwrap_err();
//! assert_eq!(err.position(), Some(5));
//! assert!(err.to_string().contains("line 1"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors produced by this crate.
///
/// Parse errors carry the byte offset of the failure plus 1-based line and
/// column numbers derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Missing or mismatched structural character
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax {
        position: usize,
        line: usize,
        col: usize,
        msg: String,
    },

    /// Malformed token
    #[error("Lexical error at line {line}, column {col}: {msg}")]
    Lexical {
        position: usize,
        line: usize,
        col: usize,
        msg: String,
    },

    /// Well-formed token that cannot be stored in the target value
    #[error("Semantic error at line {line}, column {col}: {msg}")]
    Semantic {
        position: usize,
        line: usize,
        col: usize,
        msg: String,
    },

    /// Input ended in the middle of a value
    #[error("Unexpected end of input at line {line}, column {col}\nExpected: {expected}")]
    UnexpectedEof {
        position: usize,
        line: usize,
        col: usize,
        expected: String,
    },

    /// Composite nesting went past the configured ceiling
    #[error("Nesting exceeds {limit} levels at line {line}, column {col}")]
    DepthLimitExceeded {
        position: usize,
        line: usize,
        col: usize,
        limit: usize,
    },

    /// Non-whitespace text after a complete document
    #[error("Trailing characters at line {line}, column {col}")]
    TrailingCharacters {
        position: usize,
        line: usize,
        col: usize,
    },

    /// Rejected schema composition
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

/// Byte offset plus the human-facing line and column it falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub position: usize,
    pub line: usize,
    pub col: usize,
}

impl Location {
    /// Locates `position` (a byte offset) inside `input`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_descriptor::error::Location;
    ///
    /// let loc = Location::of("{\n  \"a\": x", 9);
    /// assert_eq!((loc.line, loc.col), (2, 8));
    /// ```
    #[must_use]
    pub fn of(input: &str, position: usize) -> Self {
        let mut end = position.min(input.len());
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        let before = &input[..end];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = before[line_start..].chars().count() + 1;
        Location {
            position,
            line,
            col,
        }
    }
}

impl Error {
    /// Creates a structural error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_descriptor::error::{Error, Location};
    ///
    /// let err = Error::syntax(Location::of("[1 2]", 3), "expected ',' or ']'");
    /// assert!(err.to_string().contains("column 4"));
    /// ```
    pub fn syntax(at: Location, msg: &str) -> Self {
        Error::Syntax {
            position: at.position,
            line: at.line,
            col: at.col,
            msg: msg.to_string(),
        }
    }

    /// Creates a lexical error for a malformed token.
    pub fn lexical(at: Location, msg: &str) -> Self {
        Error::Lexical {
            position: at.position,
            line: at.line,
            col: at.col,
            msg: msg.to_string(),
        }
    }

    /// Creates a semantic error for a token the target value cannot hold.
    pub fn semantic(at: Location, msg: &str) -> Self {
        Error::Semantic {
            position: at.position,
            line: at.line,
            col: at.col,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(at: Location, expected: &str) -> Self {
        Error::UnexpectedEof {
            position: at.position,
            line: at.line,
            col: at.col,
            expected: expected.to_string(),
        }
    }

    pub fn depth_limit(at: Location, limit: usize) -> Self {
        Error::DepthLimitExceeded {
            position: at.position,
            line: at.line,
            col: at.col,
            limit,
        }
    }

    pub fn trailing(at: Location) -> Self {
        Error::TrailingCharacters {
            position: at.position,
            line: at.line,
            col: at.col,
        }
    }

    /// Creates an error for a descriptor rejected at construction.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_descriptor::Error;
    ///
    /// let err = Error::invalid_descriptor("optional cannot directly wrap another optional");
    /// assert!(err.to_string().starts_with("Invalid descriptor"));
    /// ```
    pub fn invalid_descriptor(msg: &str) -> Self {
        Error::InvalidDescriptor(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Byte offset where parsing gave up, if this is a parse error.
    ///
    /// Advisory only: callers must not resume parsing from here.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Syntax { position, .. }
            | Error::Lexical { position, .. }
            | Error::Semantic { position, .. }
            | Error::UnexpectedEof { position, .. }
            | Error::DepthLimitExceeded { position, .. }
            | Error::TrailingCharacters { position, .. } => Some(*position),
            Error::Io(_) | Error::InvalidDescriptor(_) | Error::Custom(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
