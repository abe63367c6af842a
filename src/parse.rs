//! Parsing text into a [`Value`] tree.
//!
//! The tokenizer is fused with a recursive-descent grammar: the parser walks
//! the input byte by byte, keeping a cursor of `(position, line, line
//! start)`, with a save/restore primitive for the little look-ahead the
//! grammar needs (deciding whether an implicit top level is an object or an
//! array). Which constructs are legal is decided entirely by the
//! [`FormatOptions`] passed in; the same machine parses strict JSON and the
//! relaxed CFG dialect.
//!
//! Every parsed value is tagged with its document and 1-indexed line, and
//! comments are captured verbatim (delimiters included) onto the value they
//! precede or follow.
//!
//! ```rust
//! use cfgish::{parse_string, FormatOptions};
//!
//! let cfg = parse_string("width: 100\ntitle: \"hello\"\n", &FormatOptions::cfg(), "app.cfg").unwrap();
//! assert_eq!(cfg.get("width").unwrap().as_int().unwrap(), 100);
//! assert_eq!(cfg.get("width").unwrap().line(), Some(1));
//! ```
//!
//! `#include` directives are resolved through a [`ParseSession`], which
//! holds the per-session cache and the host's loader callback:
//!
//! ```rust
//! use cfgish::{FormatOptions, ParseSession};
//!
//! let mut session = ParseSession::new(|path: &str| {
//!     if path == "port.cfg" {
//!         Ok("8080".to_string())
//!     } else {
//!         Err("no such file".to_string())
//!     }
//! });
//! let cfg = session
//!     .parse("port: #include \"port.cfg\"\n", &FormatOptions::cfg(), "main.cfg")
//!     .unwrap();
//! assert_eq!(cfg.get("port").unwrap().as_int().unwrap(), 8080);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::doc::DocInfo;
use crate::error::{Error, ParseError, Result};
use crate::options::FormatOptions;
use crate::value::{Data, Value};

/// Parses a document without include support: an `#include` directive (only
/// legal under `allow_macro`) fails with an I/O error. `name` is a filename
/// label used in error messages and provenance.
pub fn parse_string(text: &str, options: &FormatOptions, name: &str) -> Result<Value> {
    ParseSession::new(|_: &str| Err("no include loader configured".to_string()))
        .parse(text, options, name)
}

/// A parse session: the include cache, the set of documents currently being
/// parsed, and the host callback that loads an include path.
///
/// Two `#include` directives naming the same resolved path yield structurally
/// equal trees from a single parse, and the included document records both
/// sites in its [`includers`](crate::DocInfo::includers) list.
pub struct ParseSession<'a> {
    loader: Box<dyn FnMut(&str) -> std::result::Result<String, String> + 'a>,
    parsed: HashMap<String, Value>,
    in_progress: HashSet<String>,
}

enum IncludeFailure {
    Cycle,
    Load(String),
    Failed(Error),
}

impl<'a> ParseSession<'a> {
    /// Creates a session with a loader that maps an include path to the
    /// text of that document.
    pub fn new<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> std::result::Result<String, String> + 'a,
    {
        ParseSession {
            loader: Box::new(loader),
            parsed: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Parses `text` as the document named `name`, resolving any `#include`
    /// directives through this session.
    pub fn parse(&mut self, text: &str, options: &FormatOptions, name: &str) -> Result<Value> {
        let doc = Arc::new(DocInfo::new(name));
        self.in_progress.insert(name.to_string());
        let result = Parser::new(text, options, doc, self).top_level();
        self.in_progress.remove(name);
        result
    }

    fn resolve(
        &mut self,
        path: &str,
        options: &FormatOptions,
        includer: &Arc<DocInfo>,
        line: u32,
    ) -> std::result::Result<Value, IncludeFailure> {
        if let Some(cached) = self.parsed.get(path) {
            if let Some(doc) = cached.doc() {
                doc.add_includer(includer.clone(), line);
            }
            return Ok(cached.clone());
        }
        if self.in_progress.contains(path) {
            return Err(IncludeFailure::Cycle);
        }
        let text = (self.loader)(path).map_err(IncludeFailure::Load)?;
        let child_doc = Arc::new(DocInfo::new(path));
        child_doc.add_includer(includer.clone(), line);
        self.in_progress.insert(path.to_string());
        let parsed = Parser::new(&text, options, child_doc, self).top_level();
        self.in_progress.remove(path);
        let value = parsed.map_err(IncludeFailure::Failed)?;
        self.parsed.insert(path.to_string(), value.clone());
        Ok(value)
    }
}

// --------------------------------------------

fn is_ident_starter(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphabetic()
}

fn is_ident_char(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphanumeric()
}

fn maybe_white(c: u8) -> bool {
    // '/' may start a comment.
    matches!(c, b'\n' | b'\r' | b'\t' | b' ' | b'/')
}

fn is_special_string_char(c: u8) -> bool {
    matches!(c, 0 | b'\\' | b'"' | b'\n' | b'\t')
}

fn quote(c: u8) -> String {
    match c {
        0 => "<eof>".to_string(),
        b' ' => "<space>".to_string(),
        b'\n' => "'\\n'".to_string(),
        b'\t' => "'\\t'".to_string(),
        b'\r' => "'\\r'".to_string(),
        0x08 => "'\\b'".to_string(),
        c => format!("'{}'", c as char),
    }
}

/// Cursor snapshot for bounded look-ahead and for pointing errors at the
/// start of the construct that failed.
#[derive(Clone, Copy)]
struct State {
    pos: usize,
    line_nr: u32,
    line_start: usize,
}

struct Parser<'p, 'a> {
    text: &'p str,
    bytes: &'p [u8],
    options: &'p FormatOptions,
    doc: Arc<DocInfo>,
    session: &'p mut ParseSession<'a>,
    pos: usize,
    line_nr: u32,
    line_start: usize,
    /// Expected number of indentation units between a newline and the next
    /// key or value.
    indentation: i32,
}

impl<'p, 'a> Parser<'p, 'a> {
    fn new(
        text: &'p str,
        options: &'p FormatOptions,
        doc: Arc<DocInfo>,
        session: &'p mut ParseSession<'a>,
    ) -> Self {
        Parser {
            text,
            bytes: text.as_bytes(),
            options,
            doc,
            session,
            pos: 0,
            line_nr: 1,
            line_start: 0,
            indentation: 0,
        }
    }

    // ----------------------------------------
    // Cursor primitives. Past-the-end reads yield 0, so look-ahead never
    // needs bounds checks.

    fn byte(&self, at: usize) -> u8 {
        self.bytes.get(at).copied().unwrap_or(0)
    }

    fn peek(&self) -> u8 {
        self.byte(self.pos)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.byte(self.pos + offset)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos.min(self.bytes.len())..].starts_with(s.as_bytes())
    }

    fn state(&self) -> State {
        State {
            pos: self.pos,
            line_nr: self.line_nr,
            line_start: self.line_start,
        }
    }

    fn set_state(&mut self, state: State) {
        self.pos = state.pos;
        self.line_nr = state.line_nr;
        self.line_start = state.line_start;
    }

    fn column(&self) -> u32 {
        (self.pos - self.line_start + 1) as u32
    }

    fn consume_newline(&mut self) {
        self.pos += 1;
        self.line_nr += 1;
        self.line_start = self.pos;
    }

    fn tag(&self, value: &mut Value) {
        value.tag(&self.doc, self.line_nr);
    }

    // ----------------------------------------
    // Errors. The message is followed by the source line (tabs expanded to
    // four spaces) and a caret under the offending column.

    fn error(&self, message: impl AsRef<str>) -> Error {
        let start_of_line = self.line_start;
        let mut end_of_line = self.pos;
        while !matches!(self.byte(end_of_line), 0 | b'\r' | b'\n') {
            end_of_line += 1;
        }

        let mut orientation = String::new();
        for ch in self.text.get(start_of_line..end_of_line).unwrap_or("").chars() {
            if ch == '\t' {
                orientation.push_str("    ");
            } else {
                orientation.push(ch);
            }
        }
        orientation.push('\n');
        for ch in self.text.get(start_of_line..self.pos).unwrap_or("").chars() {
            if ch == '\t' {
                orientation.push_str("    ");
            } else {
                orientation.push(' ');
            }
        }
        orientation.push('^');

        ParseError::new(
            &self.doc,
            self.line_nr,
            self.column(),
            format!("{}\n{}", message.as_ref(), orientation),
        )
        .into()
    }

    fn error_at(&mut self, state: State, message: impl AsRef<str>) -> Error {
        self.set_state(state);
        self.error(message)
    }

    fn indentation_error(&self, expected: i32, found: i32) -> Result<()> {
        if self.options.enforce_indentation {
            Err(self.error(format!(
                "Bad indentation: expected {} tabs, found {}",
                expected, found
            )))
        } else {
            Ok(())
        }
    }

    fn swallow(&mut self, c: u8) -> Result<()> {
        if self.peek() == c {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("Expected {}", quote(c))))
        }
    }

    fn try_swallow(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn is_reserved_identifier(&self, at: usize) -> bool {
        let rest = &self.bytes[at.min(self.bytes.len())..];
        if rest.starts_with(b"true") || rest.starts_with(b"null") {
            !is_ident_char(self.byte(at + 4))
        } else if rest.starts_with(b"false") {
            !is_ident_char(self.byte(at + 5))
        } else {
            false
        }
    }

    // ----------------------------------------
    // Whitespace and comments.

    /// Skips whitespace and comments. Returns whether anything was skipped
    /// and the indentation depth of the last line skipped onto; a depth of
    /// -1 means the line holds something other than pure indentation.
    /// With `break_on_newline` the skipper stops at the first line break,
    /// which is how same-line postfix comments are captured.
    fn skip_white(
        &mut self,
        mut out_comments: Option<&mut Vec<String>>,
        break_on_newline: bool,
    ) -> Result<(bool, i32)> {
        let start_pos = self.pos;
        let mut indentation: i32 = 0;
        let mut found_newline = false;
        let indent_str: &str = &self.options.indentation;

        loop {
            let c = self.peek();
            if !maybe_white(c) {
                break;
            }
            if c == b'\n' {
                self.consume_newline();
                indentation = 0;
                if break_on_newline {
                    return Ok((true, indentation));
                }
                found_newline = true;
            } else if c == b'\r' {
                if self.peek_at(1) != b'\n' {
                    return Err(self.error("CR with no LF. \\r only allowed before \\n."));
                }
                self.pos += 1;
                self.consume_newline();
                indentation = 0;
                if break_on_newline {
                    return Ok((true, indentation));
                }
                found_newline = true;
            } else if !indent_str.is_empty() && self.starts_with(indent_str) {
                self.pos += indent_str.len();
                if self.options.enforce_indentation && indent_str == "\t" && indentation == -1 {
                    return Err(self.error("Tabs should only occur on the start of a line!"));
                }
                indentation += 1;
            } else if c == b'\t' {
                self.pos += 1;
                if self.options.enforce_indentation && indentation == -1 {
                    return Err(self.error("Tabs should only occur on the start of a line!"));
                }
                indentation += 1;
            } else if c == b' ' {
                if found_newline && self.options.enforce_indentation {
                    if indent_str == "\t" {
                        return Err(self.error(
                            "Found a space at beginning of a line. Indentation must be done using tabs!",
                        ));
                    }
                    return Err(self.error(format!(
                        "Indentation should be a multiple of {} spaces.",
                        indent_str.len()
                    )));
                }
                self.pos += 1;
                indentation = -1;
            } else if c == b'/' && self.peek_at(1) == b'/' {
                if !self.options.single_line_comments {
                    return Err(self.error("Single line comments forbidden."));
                }
                let start = self.pos;
                self.pos += 2;
                while !matches!(self.peek(), 0 | b'\n') {
                    self.pos += 1;
                }
                if let Some(out) = out_comments.as_deref_mut() {
                    out.push(self.text[start..self.pos].to_string());
                }
                indentation = 0;
                if break_on_newline {
                    return Ok((true, indentation));
                }
            } else if c == b'/' && self.peek_at(1) == b'*' {
                if !self.options.block_comments {
                    return Err(self.error("Block comments forbidden."));
                }
                let state = self.state();
                self.pos += 2;
                let mut nesting = 1u32;
                while nesting > 0 {
                    match self.peek() {
                        0 => return Err(self.error_at(state, "Non-ending /* comment")),
                        b'/' if self.peek_at(1) == b'*' => {
                            self.pos += 2;
                            if !self.options.nesting_block_comments {
                                return Err(
                                    self.error("Nesting comments (/* /* */ */) forbidden.")
                                );
                            }
                            nesting += 1;
                        }
                        b'*' if self.peek_at(1) == b'/' => {
                            self.pos += 2;
                            nesting -= 1;
                        }
                        b'\n' => self.consume_newline(),
                        _ => self.pos += 1,
                    }
                }
                if let Some(out) = out_comments.as_deref_mut() {
                    out.push(self.text[state.pos..self.pos].to_string());
                }
                indentation = -1;
                if break_on_newline {
                    return Ok((true, indentation));
                }
            } else {
                break;
            }
        }

        if start_pos == self.pos {
            Ok((false, -1))
        } else {
            Ok((true, indentation))
        }
    }

    fn skip_white_ignore_comments(&mut self) -> Result<bool> {
        Ok(self.skip_white(None, false)?.0)
    }

    /// Skips leading whitespace, capturing comments as the value's prefix.
    /// Returns the indentation of the line the cursor landed on.
    fn skip_pre_white(&mut self, value: &mut Value) -> Result<i32> {
        if !maybe_white(self.peek()) {
            return Ok(-1);
        }
        let mut comments = Vec::new();
        let (_, indentation) = self.skip_white(Some(&mut comments), false)?;
        if !comments.is_empty() {
            value.comments_mut().prefix.append(&mut comments);
        }
        Ok(indentation)
    }

    /// Skips trailing whitespace up to the end of the line, capturing
    /// same-line comments as the value's postfix.
    fn skip_post_white(&mut self, value: &mut Value) -> Result<bool> {
        if !maybe_white(self.peek()) {
            return Ok(false);
        }
        let mut comments = Vec::new();
        let (did_skip, _) = self.skip_white(Some(&mut comments), true)?;
        if !comments.is_empty() {
            value.comments_mut().postfix.append(&mut comments);
        }
        Ok(did_skip)
    }

    // ----------------------------------------
    // Grammar.

    /// The top level can be any value, or the innards of an object:
    /// `foo = 1` / `"bar": 2`.
    fn top_level(&mut self) -> Result<Value> {
        let mut is_object = false;

        if self.options.implicit_top_object {
            let state = self.state();
            self.skip_white_ignore_comments()?;

            if is_ident_starter(self.peek()) && !self.is_reserved_identifier(self.pos) {
                is_object = true;
            } else if self.peek() == b'"' || self.peek() == b'@' {
                self.parse_string_literal()?;
                self.skip_white_ignore_comments()?;
                is_object = self.peek() == b':' || self.peek() == b'=';
            }

            self.set_state(state);
        }

        let mut ret = Value::default();
        self.tag(&mut ret);

        if is_object {
            self.parse_object_contents(&mut ret)?;
        } else {
            self.parse_array_contents(&mut ret)?;
            let len = ret.array_len().unwrap_or(0);
            if len > 1 && !self.options.implicit_top_array {
                return Err(self.error("Multiple values not allowed without enclosing []"));
            }
        }

        self.skip_post_white(&mut ret)?;

        if self.peek() != 0 {
            return Err(self.error("Expected EoF"));
        }

        if !is_object {
            let len = ret.array_len().unwrap_or(0);
            if len == 0 {
                if self.options.empty_file {
                    let mut empty = Value::object();
                    if ret.has_comments() {
                        *empty.comments_mut() = std::mem::take(ret.comments_mut());
                    }
                    return Ok(empty);
                }
                return Err(self.error("Empty file"));
            }
            if len == 1 {
                // A single value: not an array after all. The container's
                // comments ride along.
                let comments = if ret.has_comments() {
                    Some(std::mem::take(ret.comments_mut()))
                } else {
                    None
                };
                let mut first = ret.as_array_mut()?.remove(0);
                if let Some(comments) = comments {
                    first.comments_mut().append(comments);
                }
                return Ok(first);
            }
        }

        Ok(ret)
    }

    /// Parses one value into `dst`. Returns whether trailing whitespace was
    /// skipped, which the container loops use as the "had a separator"
    /// signal when commas may be omitted.
    fn parse_value(&mut self, dst: &mut Value) -> Result<bool> {
        let line_indentation = self.skip_pre_white(dst)?;
        self.tag(dst);

        if line_indentation >= 0 && self.indentation - 1 != line_indentation {
            self.indentation_error(self.indentation - 1, line_indentation)?;
        }

        match self.peek() {
            b'"' | b'@' => {
                let s = self.parse_string_literal()?;
                dst.set_data(Data::Str(s));
            }
            b'n' => {
                if !(self.peek_at(1) == b'u' && self.peek_at(2) == b'l' && self.peek_at(3) == b'l')
                    || is_ident_char(self.peek_at(4))
                {
                    return Err(self.error("Expected 'null'"));
                }
                self.pos += 4;
                dst.set_data(Data::Null);
            }
            b't' => {
                if !(self.peek_at(1) == b'r' && self.peek_at(2) == b'u' && self.peek_at(3) == b'e')
                    || is_ident_char(self.peek_at(4))
                {
                    return Err(self.error("Expected 'true'"));
                }
                self.pos += 4;
                dst.set_data(Data::Bool(true));
            }
            b'f' => {
                if !(self.peek_at(1) == b'a'
                    && self.peek_at(2) == b'l'
                    && self.peek_at(3) == b's'
                    && self.peek_at(4) == b'e')
                    || is_ident_char(self.peek_at(5))
                {
                    return Err(self.error("Expected 'false'"));
                }
                self.pos += 5;
                dst.set_data(Data::Bool(false));
            }
            b'{' => self.parse_object(dst)?,
            b'[' => self.parse_array(dst)?,
            b'#' => self.parse_macro(dst)?,
            c if c == b'+' || c == b'-' || c == b'.' || c.is_ascii_digit() => {
                if self.starts_with("-inf") {
                    if is_ident_char(self.peek_at(4)) {
                        return Err(self.error("Expected -inf"));
                    }
                    if !self.options.inf {
                        return Err(self.error("infinity forbidden."));
                    }
                    self.pos += 4;
                    dst.set_data(Data::Float(f64::NEG_INFINITY));
                } else if self.starts_with("+inf") {
                    if is_ident_char(self.peek_at(4)) {
                        return Err(self.error("Expected +inf"));
                    }
                    if !self.options.inf {
                        return Err(self.error("infinity forbidden."));
                    }
                    self.pos += 4;
                    dst.set_data(Data::Float(f64::INFINITY));
                } else if self.starts_with("+NaN") {
                    if is_ident_char(self.peek_at(4)) {
                        return Err(self.error("Expected +NaN"));
                    }
                    if !self.options.nan {
                        return Err(self.error("NaN (Not a Number) forbidden."));
                    }
                    self.pos += 4;
                    dst.set_data(Data::Float(f64::NAN));
                } else {
                    self.parse_finite_number(dst)?;
                }
            }
            _ => return Err(self.error("Expected value")),
        }

        self.skip_post_white(dst)
    }

    fn parse_array(&mut self, array: &mut Value) -> Result<()> {
        let state = self.state();
        self.swallow(b'[')?;

        self.indentation += 1;
        self.parse_array_contents(array)?;
        self.indentation -= 1;

        if self.peek() == b']' {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_at(state, "Non-terminated array"))
        }
    }

    fn parse_array_contents(&mut self, array: &mut Value) -> Result<()> {
        array.make_array();
        let mut next_prefix_comments: Vec<String> = Vec::new();

        loop {
            let mut value = Value::default();
            if !next_prefix_comments.is_empty() {
                value.comments_mut().prefix = std::mem::take(&mut next_prefix_comments);
            }
            let line_indentation = self.skip_pre_white(&mut value)?;

            if self.peek() == b']' {
                if line_indentation >= 0 && self.indentation - 1 != line_indentation {
                    self.indentation_error(self.indentation - 1, line_indentation)?;
                }
                if value.has_comments() {
                    array.comments_mut().pre_end_brace =
                        std::mem::take(&mut value.comments_mut().prefix);
                }
                break;
            }

            if self.peek() == 0 {
                if value.has_comments() {
                    array.comments_mut().pre_end_brace =
                        std::mem::take(&mut value.comments_mut().prefix);
                }
                break;
            }

            if line_indentation >= 0 && self.indentation != line_indentation {
                self.indentation_error(self.indentation, line_indentation)?;
            }

            if is_ident_starter(self.peek()) && !self.is_reserved_identifier(self.pos) {
                return Err(self.error(
                    "Found identifier; expected value. Did you mean to use a {object} rather than a [array]?",
                ));
            }

            let mut has_separator = self.parse_value(&mut value)?;
            self.skip_white(Some(&mut next_prefix_comments), false)?;

            let comma_state = self.state();
            let has_comma = self.peek() == b',';

            if has_comma {
                self.pos += 1;
                self.skip_post_white(&mut value)?;
                has_separator = true;
            }

            array.push(value)?;

            let is_last_element = self.peek() == 0 || self.peek() == b']';

            if is_last_element {
                if has_comma && !self.options.array_trailing_comma {
                    return Err(self.error_at(comma_state, "Trailing comma forbidden."));
                }
            } else if self.options.array_omit_comma {
                if !has_separator {
                    return Err(self.error("Expected a space, newline, comma or ]"));
                }
            } else if !has_comma {
                return Err(self.error("Expected a comma or ]"));
            }
        }
        Ok(())
    }

    fn parse_object(&mut self, object: &mut Value) -> Result<()> {
        let state = self.state();
        self.swallow(b'{')?;

        self.indentation += 1;
        self.parse_object_contents(object)?;
        self.indentation -= 1;

        if self.peek() == b'}' {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_at(state, "Non-terminated object"))
        }
    }

    fn parse_object_contents(&mut self, object: &mut Value) -> Result<()> {
        object.make_object();
        let mut next_prefix_comments: Vec<String> = Vec::new();

        loop {
            let mut value = Value::default();
            if !next_prefix_comments.is_empty() {
                value.comments_mut().prefix = std::mem::take(&mut next_prefix_comments);
            }
            let line_indentation = self.skip_pre_white(&mut value)?;

            if self.peek() == b'}' {
                if line_indentation >= 0 && self.indentation - 1 != line_indentation {
                    self.indentation_error(self.indentation - 1, line_indentation)?;
                }
                if value.has_comments() {
                    object.comments_mut().pre_end_brace =
                        std::mem::take(&mut value.comments_mut().prefix);
                }
                break;
            }

            if self.peek() == 0 {
                if value.has_comments() {
                    object.comments_mut().pre_end_brace =
                        std::mem::take(&mut value.comments_mut().prefix);
                }
                break;
            }

            if line_indentation >= 0 && self.indentation != line_indentation {
                self.indentation_error(self.indentation, line_indentation)?;
            }

            let pre_key_state = self.state();
            let key: String;

            if is_ident_starter(self.peek()) && !self.is_reserved_identifier(self.pos) {
                if !self.options.identifiers_keys {
                    return Err(self.error("You need to surround keys with quotes"));
                }
                let start = self.pos;
                while is_ident_char(self.peek()) {
                    self.pos += 1;
                }
                key = self.text[start..self.pos].to_string();
            } else if self.peek() == b'"' || self.peek() == b'@' {
                key = self.parse_string_literal()?;
            } else {
                return Err(self.error(format!(
                    "Object key expected (either an identifier or a quoted string), got {}",
                    quote(self.peek())
                )));
            }

            if !self.options.object_duplicate_keys {
                let prior = object
                    .as_object()?
                    .get_unmarked(&key)
                    .map(|existing| existing.location());
                if let Some(prior) = prior {
                    return Err(self.error_at(
                        pre_key_state,
                        format!("Duplicate key: \"{}\". Already set at {}", key, prior),
                    ));
                }
            }

            let space_after_key = self.skip_white_ignore_comments()?;

            let c = self.peek();
            if c == b':' || (self.options.object_separator_equal && c == b'=') {
                if c == b':' && space_after_key && !self.options.allow_space_before_colon {
                    return Err(self.error("No space allowed before colon"));
                }
                self.pos += 1;
                self.skip_white_ignore_comments()?;
            } else if self.options.omit_colon_before_object && (c == b'{' || c == b'#') {
                // The colon may be left out before a nested object.
            } else if self.options.object_separator_equal && self.options.omit_colon_before_object {
                return Err(self.error("Expected one of '=', ':', '{' or '#' after object key"));
            } else {
                return Err(self.error("Expected : after object key"));
            }

            let mut has_separator = self.parse_value(&mut value)?;
            self.skip_white(Some(&mut next_prefix_comments), false)?;

            let comma_state = self.state();
            let has_comma = self.peek() == b',';

            if has_comma {
                self.pos += 1;
                self.skip_post_white(&mut value)?;
                has_separator = true;
            }

            // Under object_duplicate_keys the last occurrence wins.
            object.as_object_mut()?.insert(key, value);

            let is_last_element = self.peek() == 0 || self.peek() == b'}';

            if is_last_element {
                if has_comma && !self.options.object_trailing_comma {
                    return Err(self.error_at(comma_state, "Trailing comma forbidden."));
                }
            } else if self.options.object_omit_comma {
                if !has_separator {
                    return Err(self.error("Expected a space, newline, comma or }"));
                }
            } else if !has_comma {
                return Err(self.error("Expected a comma or }"));
            }
        }
        Ok(())
    }

    // ----------------------------------------
    // Numbers.

    fn parse_finite_number(&mut self, dst: &mut Value) -> Result<()> {
        let pre_sign = self.pos;
        let mut sign: i64 = 1;

        if self.peek() == b'+' {
            if !self.options.unary_plus {
                return Err(self.error("Prefixing numbers with + is forbidden."));
            }
            self.pos += 1;
        }
        if self.peek() == b'-' {
            self.pos += 1;
            sign = -1;
        }

        if self.peek() == b'+' || self.peek() == b'-' {
            return Err(self.error("Duplicate sign"));
        }

        if self.peek() == b'0' && self.peek_at(1) == b'x' {
            if !self.options.hexadecimal_integers {
                return Err(self.error("Hexadecimal numbers forbidden."));
            }
            self.pos += 2;
            return self.parse_radix_integer(dst, 16, sign, "Missing hexadecimal digits after 0x");
        }

        if self.peek() == b'0' && self.peek_at(1) == b'b' {
            if !self.options.binary_integers {
                return Err(self.error("Binary numbers forbidden."));
            }
            self.pos += 2;
            return self.parse_radix_integer(dst, 2, sign, "Missing binary digits after 0b");
        }

        let mut p = self.pos;
        while self.byte(p).is_ascii_digit() {
            p += 1;
        }

        if matches!(self.byte(p), b'.' | b'e' | b'E') {
            self.pos = pre_sign;
            return self.parse_float_number(dst);
        }

        // It looks like an integer, but it may be too long to represent as
        // one. Nineteen digits need a lexicographic comparison against the
        // i64 limit; fewer always fit, more never do.
        let length = p - self.pos;
        if length < 19 {
            self.pos = pre_sign;
            return self.parse_int_number(dst);
        }
        if length > 19 {
            self.pos = pre_sign;
            return self.parse_float_number(dst);
        }

        let max_int_str: &[u8; 19] = if sign > 0 {
            b"9223372036854775807"
        } else {
            b"9223372036854775808"
        };
        for i in 0..19 {
            let digit = self.byte(self.pos + i);
            if digit > max_int_str[i] {
                self.pos = pre_sign;
                return self.parse_float_number(dst);
            }
            if digit < max_int_str[i] {
                self.pos = pre_sign;
                return self.parse_int_number(dst);
            }
        }
        self.pos = pre_sign;
        self.parse_int_number(dst)
    }

    fn parse_radix_integer(
        &mut self,
        dst: &mut Value,
        radix: u32,
        sign: i64,
        missing_digits: &str,
    ) -> Result<()> {
        let start = self.pos;
        while (self.peek() as char).is_digit(radix) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error(missing_digits));
        }
        let magnitude = u64::from_str_radix(&self.text[start..self.pos], radix)
            .map_err(|_| self.error("Integer out of range"))?;
        let value = magnitude as i64;
        dst.set_data(Data::Int(if sign < 0 { value.wrapping_neg() } else { value }));
        Ok(())
    }

    fn parse_int_number(&mut self, dst: &mut Value) -> Result<()> {
        let start = self.pos;
        if self.peek() == b'+' || self.peek() == b'-' {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.peek().is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(self.error("Invalid integer"));
        }
        let result: i64 = self.text[start..self.pos]
            .parse()
            .map_err(|_| self.error("Invalid integer"))?;
        if self.byte(digits_start) == b'0' && result != 0 {
            return Err(self.error("Integer may not start with a zero"));
        }
        dst.set_data(Data::Int(result));
        Ok(())
    }

    fn parse_float_number(&mut self, dst: &mut Value) -> Result<()> {
        let start = self.pos;
        if self.peek() == b'+' || self.peek() == b'-' {
            self.pos += 1;
        }
        while self.peek().is_ascii_digit() {
            self.pos += 1;
        }
        if self.peek() == b'.' {
            self.pos += 1;
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), b'e' | b'E') {
            let digits_offset = if matches!(self.peek_at(1), b'+' | b'-') { 2 } else { 1 };
            if self.peek_at(digits_offset).is_ascii_digit() {
                self.pos += digits_offset;
                while self.peek().is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }
        if self.pos == start {
            return Err(self.error("Invalid number"));
        }
        let result: f64 = self.text[start..self.pos]
            .parse()
            .map_err(|_| self.error("Invalid number"))?;
        dst.set_data(Data::Float(result));
        Ok(())
    }

    // ----------------------------------------
    // Strings.

    fn parse_string_literal(&mut self) -> Result<String> {
        if self.peek() == b'@' {
            return self.parse_csharp_string();
        }

        let state = self.state();
        if self.peek() != b'"' {
            return Err(self.error("Quote (\") expected"));
        }

        if self.peek_at(1) == b'"' && self.peek_at(2) == b'"' {
            // Python-style multiline string: raw content until the closing
            // """ not followed by a fourth quote.
            if !self.options.str_python_multiline {
                return Err(self.error("Python \"\"\"-style multiline strings forbidden."));
            }
            self.pos += 3;
            let start = self.pos;
            loop {
                if self.peek() == 0 || self.peek_at(1) == 0 || self.peek_at(2) == 0 {
                    return Err(self.error_at(state, "Unterminated multiline string"));
                }
                if self.peek() == b'"'
                    && self.peek_at(1) == b'"'
                    && self.peek_at(2) == b'"'
                    && self.peek_at(3) != b'"'
                {
                    let s = self.text[start..self.pos].to_string();
                    self.pos += 3;
                    return Ok(s);
                }
                if self.peek() == b'\n' {
                    self.consume_newline();
                } else {
                    self.pos += 1;
                }
            }
        }

        self.pos += 1;
        let mut out = String::new();

        loop {
            // Copy long runs of unremarkable characters in one go.
            let mut safe_end = self.pos;
            while !is_special_string_char(self.byte(safe_end)) {
                safe_end += 1;
            }
            if safe_end != self.pos {
                out.push_str(&self.text[self.pos..safe_end]);
                self.pos = safe_end;
            }

            match self.peek() {
                0 => return Err(self.error_at(state, "Unterminated string")),
                b'"' => {
                    self.pos += 1;
                    return Ok(out);
                }
                b'\n' => return Err(self.error("Newline in string")),
                b'\t' => {
                    if !self.options.str_allow_tab {
                        return Err(self.error("Un-escaped tab not allowed in string"));
                    }
                    out.push('\t');
                    self.pos += 1;
                }
                b'\\' => {
                    self.pos += 1;
                    match self.peek() {
                        b'"' => {
                            out.push('"');
                            self.pos += 1;
                        }
                        b'\\' => {
                            out.push('\\');
                            self.pos += 1;
                        }
                        b'/' => {
                            out.push('/');
                            self.pos += 1;
                        }
                        b'b' => {
                            out.push('\u{0008}');
                            self.pos += 1;
                        }
                        b'f' => {
                            out.push('\u{000C}');
                            self.pos += 1;
                        }
                        b'n' => {
                            out.push('\n');
                            self.pos += 1;
                        }
                        b'r' => {
                            out.push('\r');
                            self.pos += 1;
                        }
                        b't' => {
                            out.push('\t');
                            self.pos += 1;
                        }
                        b'u' => {
                            self.pos += 1;
                            let mut codepoint = self.parse_hex(4)?;
                            if (0xD800..=0xDBFF).contains(&codepoint) {
                                // First half of a UTF-16 surrogate pair.
                                if !(self.peek() == b'\\' && self.peek_at(1) == b'u') {
                                    return Err(self.error("Missing second unicode surrogate."));
                                }
                                self.pos += 2;
                                let second = self.parse_hex(4)?;
                                if !(0xDC00..=0xDFFF).contains(&second) {
                                    return Err(self.error("Invalid second unicode surrogate"));
                                }
                                codepoint = (codepoint << 10) + second - 0x35FDC00;
                            }
                            let ch = char::from_u32(codepoint as u32)
                                .ok_or_else(|| self.error("Bad unicode codepoint"))?;
                            out.push(ch);
                        }
                        b'U' => {
                            if !self.options.str_32bit_unicode {
                                return Err(self.error("\\U 32 bit unicodes forbidden."));
                            }
                            self.pos += 1;
                            let codepoint = self.parse_hex(8)?;
                            let ch = u32::try_from(codepoint)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| self.error("Bad unicode codepoint"))?;
                            out.push(ch);
                        }
                        other => {
                            return Err(
                                self.error(format!("Unknown escape character {}", quote(other)))
                            )
                        }
                    }
                }
                other => {
                    out.push(other as char);
                    self.pos += 1;
                }
            }
        }
    }

    /// C#-style verbatim string: everything until the next `"`, except `""`
    /// which encodes a single quote.
    fn parse_csharp_string(&mut self) -> Result<String> {
        let state = self.state();
        if !self.options.str_csharp_verbatim {
            return Err(self.error("C# @-style verbatim strings forbidden."));
        }
        self.swallow(b'@')?;
        self.swallow(b'"')?;

        let mut out = String::new();
        loop {
            match self.peek() {
                0 => return Err(self.error_at(state, "Unterminated verbatim string")),
                b'\n' => return Err(self.error("Newline in verbatim string")),
                b'"' if self.peek_at(1) == b'"' => {
                    self.pos += 2;
                    out.push('"');
                }
                b'"' => {
                    self.pos += 1;
                    return Ok(out);
                }
                _ => {
                    let mut end = self.pos + 1;
                    while !matches!(self.byte(end), 0 | b'\n' | b'"') {
                        end += 1;
                    }
                    out.push_str(&self.text[self.pos..end]);
                    self.pos = end;
                }
            }
        }
    }

    fn parse_hex(&mut self, count: usize) -> Result<u64> {
        let mut ret: u64 = 0;
        for i in 0..count {
            let c = self.byte(self.pos + i);
            let digit = match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => 10 + c - b'a',
                b'A'..=b'F' => 10 + c - b'A',
                _ => {
                    return Err(self.error(format!(
                        "Expected hexadecimal digit, got {}",
                        quote(self.peek())
                    )))
                }
            };
            ret = ret * 16 + digit as u64;
        }
        self.pos += count;
        Ok(ret)
    }

    // ----------------------------------------
    // Includes.

    fn parse_macro(&mut self, dst: &mut Value) -> Result<()> {
        if !self.options.allow_macro {
            return Err(self.error("#macros forbidden."));
        }
        if !self.try_swallow("#include") {
            return Err(self.error("Expected '#include'"));
        }
        self.skip_white_ignore_comments()?;

        let (absolute, terminator) = match self.peek() {
            b'"' => (false, b'"'),
            b'<' => (true, b'>'),
            _ => return Err(self.error("Expected \" or <")),
        };

        let state = self.state();
        self.pos += 1;
        let start = self.pos;
        let path: String;
        loop {
            match self.peek() {
                0 => return Err(self.error_at(state, "Unterminated include path")),
                b'\n' => return Err(self.error("Newline in string")),
                c if c == terminator => {
                    path = self.text[start..self.pos].to_string();
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }

        // Quoted paths resolve relative to the directory of the including
        // document; angle-bracket paths are used as-is.
        let resolved = if absolute {
            path
        } else {
            match self.doc.filename().rfind('/') {
                Some(slash) => format!("{}{}", &self.doc.filename()[..slash + 1], path),
                None => path,
            }
        };

        let line = self.line_nr;
        let doc = self.doc.clone();
        match self.session.resolve(&resolved, self.options, &doc, line) {
            Ok(value) => {
                dst.assign(value);
                Ok(())
            }
            Err(IncludeFailure::Cycle) => {
                Err(self.error(format!("Recursive #include of '{}'", resolved)))
            }
            Err(IncludeFailure::Load(message)) => Err(Error::Io {
                path: resolved,
                message,
            }),
            Err(IncludeFailure::Failed(err)) => Err(err),
        }
    }
}
