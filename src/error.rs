//! Error types for parsing, emitting and auditing configuration documents.
//!
//! All failures are reported as values of the [`Error`] enum:
//!
//! - **Parse errors** carry the filename label, line, column, the include
//!   chain, and a rendering of the offending source line with a caret.
//! - **Type errors** come from typed accessors used on the wrong variant,
//!   out-of-range integer narrowing, bad array indices, and reads through a
//!   failed key lookup. They carry the target value's location.
//! - **Encoding errors** are raised by the emitter when asked to write
//!   something the active [`FormatOptions`](crate::FormatOptions) forbid
//!   (`inf`, `NaN`, uninitialized values).
//! - **I/O errors** surface failures from the host's include loader or
//!   include sink, annotated with the path involved.
//! - **Dangling keys** is the non-fatal audit result of
//!   [`Value::check_dangling`](crate::Value::check_dangling); it is a
//!   distinct variant so hosts can demote it to a warning.

use thiserror::Error;

/// Alias for `std::result::Result` with this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// All errors produced by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A syntax, indentation, duplicate-key or include error from the parser.
    #[error(transparent)]
    Parse(#[from] Box<ParseError>),

    /// A typed accessor was used on the wrong variant, or a lookup failed.
    #[error("{location}{message}")]
    Type { location: String, message: String },

    /// The emitter was asked to write a value the options forbid.
    #[error("{0}")]
    Encoding(String),

    /// The host's include loader or include sink failed.
    #[error("Failed to load '{path}': {message}")]
    Io { path: String, message: String },

    /// One or more object entries were never read. Raised by
    /// [`Value::check_dangling`](crate::Value::check_dangling); a warning by
    /// nature rather than a fatal condition.
    #[error("{}", dangling_message(.0))]
    DanglingKeys(Vec<DanglingKey>),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(Box::new(err))
    }
}

/// A parse failure with position and a rendered source-line excerpt.
///
/// The `Display` form is
/// `<file>:<line>:<column>[, included at: ...]: <message>` followed by the
/// source line (tabs expanded) and a caret pointing at the column.
#[derive(Debug, Clone, Error)]
#[error("{rendered}")]
pub struct ParseError {
    line: u32,
    column: u32,
    rendered: String,
}

impl ParseError {
    pub(crate) fn new(doc: &crate::doc::DocInfo, line: u32, column: u32, message: String) -> Self {
        let mut rendered = format!("{}:{}:{}", doc.filename(), line, column);
        doc.append_include_info(&mut rendered, "    ");
        rendered.push_str(": ");
        rendered.push_str(&message);
        ParseError {
            line,
            column,
            rendered,
        }
    }

    /// 1-indexed line of the error.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-indexed column of the error.
    pub fn column(&self) -> u32 {
        self.column
    }
}

/// One unread object entry reported by the dangling-key audit.
#[derive(Debug, Clone)]
pub struct DanglingKey {
    /// `"<file>:<line>: "` of the unread value, when known.
    pub location: String,
    /// The key that was never accessed.
    pub key: String,
}

fn dangling_message(keys: &[DanglingKey]) -> String {
    let mut message = String::from("Dangling keys:");
    for key in keys {
        message.push_str("\n    ");
        message.push_str(&key.location);
        message.push_str("Key '");
        message.push_str(&key.key);
        message.push_str("' never accessed.");
    }
    message
}
