//! Serializing a [`Value`] tree back to text.
//!
//! The writer is the parser's inverse: any document a given
//! [`FormatOptions`] accepts round-trips through
//! `parse_string` → [`dump_string`] → `parse_string` to a structurally equal
//! tree, including comment placement and number formatting.
//!
//! ```rust
//! use cfgish::{dump_string, FormatOptions, Value};
//!
//! let mut cfg = Value::object();
//! cfg.insert_or_assign("pi", Value::from(3.25)).unwrap();
//! let json = dump_string(&cfg, &FormatOptions::json()).unwrap();
//! assert_eq!(json, "{\n\t\"pi\": 3.25\n}\n");
//! ```
//!
//! Floats are printed with the shortest decimal string that reparses to the
//! exact same bits, in the printf `%g` style (`5e-324`, `3.14`,
//! `1.7976931348623157e+308`). Under `distinct_floats`, integer-valued
//! floats keep a `.0` suffix and `-0.0` stays distinct from `0`, so a dumped
//! document never silently changes a value's type.

use std::sync::Arc;

use crate::doc::DocInfo;
use crate::error::{Error, Result};
use crate::options::FormatOptions;
use crate::value::{Data, Value};

/// The callback used to write an included document to its own path when
/// emitting with `allow_macro`.
pub type IncludeSink<'s> = dyn FnMut(&str, &str) -> std::result::Result<(), String> + 's;

/// Writes `value` as a string in the given format.
///
/// Fails when the tree contains an uninitialized value (unless
/// `write_uninitialized` is set) or an `inf`/`NaN` the options forbid.
/// Subtrees that were parsed from other documents are inlined; use
/// [`dump_string_with`] to split them back out through `#include`.
///
/// When `mark_accessed` is set (the default), every visited object entry is
/// marked as accessed so a later dangling audit does not flag serialized
/// output.
pub fn dump_string(value: &Value, options: &FormatOptions) -> Result<String> {
    dump_internal(value, options, None)
}

/// Like [`dump_string`], but when `allow_macro` is set, any subtree whose
/// document differs from the root's is written to its own file through
/// `sink(path, text)` and replaced by `#include <path>` in the output.
pub fn dump_string_with(
    value: &Value,
    options: &FormatOptions,
    sink: &mut IncludeSink<'_>,
) -> Result<String> {
    dump_internal(value, options, Some(sink))
}

fn dump_internal<'s>(
    value: &Value,
    options: &FormatOptions,
    sink: Option<&mut IncludeSink<'s>>,
) -> Result<String> {
    let mut writer = Writer {
        out: String::new(),
        compact: options.compact(),
        options,
        doc: value.doc().cloned(),
        sink,
    };

    if options.implicit_top_object && value.is_object() {
        writer.write_object_contents(0, value)?;
    } else {
        writer.write_value(0, value, true, true)?;
        if options.end_with_newline && !options.compact() {
            writer.out.push('\n');
        }
    }

    if options.mark_accessed {
        value.mark_accessed(true);
    }
    Ok(writer.out)
}

struct Writer<'w, 's> {
    out: String,
    compact: bool,
    options: &'w FormatOptions,
    doc: Option<Arc<DocInfo>>,
    sink: Option<&'w mut IncludeSink<'s>>,
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn has_pre_end_brace_comments(value: &Value) -> bool {
    value.has_comments() && !value.comments().pre_end_brace.is_empty()
}

impl Writer<'_, '_> {
    fn write_indent(&mut self, indent: usize) {
        if self.compact {
            return;
        }
        for _ in 0..indent {
            self.out.push_str(&self.options.indentation);
        }
    }

    fn write_prefix_comment_list(&mut self, indent: usize, comments: &[String]) {
        if !self.options.write_comments || comments.is_empty() {
            return;
        }
        self.out.push('\n');
        for comment in comments {
            self.write_indent(indent);
            self.out.push_str(comment);
            self.out.push('\n');
        }
    }

    fn write_prefix_comments(&mut self, indent: usize, value: &Value) {
        if !self.options.write_comments || !value.has_comments() {
            return;
        }
        self.write_prefix_comment_list(indent, &value.comments().prefix);
    }

    fn write_postfix_comments(&mut self, comments: &[String]) {
        if !self.options.write_comments {
            return;
        }
        for comment in comments {
            self.out.push(' ');
            self.out.push_str(comment);
        }
    }

    fn write_value(
        &mut self,
        indent: usize,
        value: &Value,
        write_prefix: bool,
        write_postfix: bool,
    ) -> Result<()> {
        // A subtree parsed from another document goes back to its own file
        // when the host provided a sink.
        if self.options.allow_macro && self.sink.is_some() {
            if let Some(doc) = value.doc() {
                let same_doc = self.doc.as_ref().map_or(false, |own| Arc::ptr_eq(own, doc));
                if !same_doc {
                    let filename = doc.filename().to_string();
                    let text = {
                        let reborrowed = self.sink.as_mut().map(|sink| &mut **sink);
                        dump_internal(value, self.options, reborrowed)?
                    };
                    if let Some(sink) = self.sink.as_mut() {
                        sink(&filename, &text).map_err(|message| Error::Io {
                            path: filename.clone(),
                            message,
                        })?;
                    }
                    self.out.push_str("#include <");
                    self.out.push_str(&filename);
                    self.out.push('>');
                    return Ok(());
                }
            }
        }

        if write_prefix {
            self.write_prefix_comments(indent, value);
        }

        match &value.data {
            Data::Null => self.out.push_str("null"),
            Data::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Data::Int(i) => self.out.push_str(&i.to_string()),
            Data::Float(f) => self.write_number(*f)?,
            Data::Str(s) => self.write_string(s),
            Data::Array(array) => {
                if array.is_empty() && !has_pre_end_brace_comments(value) {
                    self.out.push_str(if self.compact { "[]" } else { "[ ]" });
                } else if self.compact || self.is_simple_array(array) {
                    self.out.push('[');
                    if !self.compact {
                        self.out.push(' ');
                    }
                    for (i, element) in array.iter().enumerate() {
                        self.write_value(indent + 1, element, false, true)?;
                        if self.compact {
                            if i + 1 < array.len() {
                                self.out.push(',');
                            }
                        } else if self.options.array_omit_comma || i + 1 == array.len() {
                            self.out.push(' ');
                        } else {
                            self.out.push_str(", ");
                        }
                    }
                    self.write_prefix_comment_list(indent + 1, &value.comments().pre_end_brace);
                    self.out.push(']');
                } else {
                    self.out.push_str("[\n");
                    for (i, element) in array.iter().enumerate() {
                        self.write_prefix_comments(indent + 1, element);
                        self.write_indent(indent + 1);
                        self.write_value(indent + 1, element, false, true)?;
                        if self.options.array_omit_comma || i + 1 == array.len() {
                            self.out.push('\n');
                        } else {
                            self.out.push_str(",\n");
                        }
                    }
                    self.write_prefix_comment_list(indent + 1, &value.comments().pre_end_brace);
                    self.write_indent(indent);
                    self.out.push(']');
                }
            }
            Data::Object(object) => {
                if object.is_empty() && !has_pre_end_brace_comments(value) {
                    self.out.push_str(if self.compact { "{}" } else { "{ }" });
                } else {
                    if self.compact {
                        self.out.push('{');
                    } else {
                        self.out.push_str("{\n");
                    }
                    self.write_object_contents(indent + 1, value)?;
                    self.write_indent(indent);
                    self.out.push('}');
                }
            }
            Data::Uninitialized | Data::BadLookup(_) => {
                if self.options.write_uninitialized {
                    self.out.push_str("UNINITIALIZED");
                } else {
                    return Err(Error::Encoding(
                        "Failed to serialize uninitialized value".to_string(),
                    ));
                }
            }
        }

        if write_postfix {
            self.write_postfix_comments(&value.comments().postfix);
        }
        Ok(())
    }

    fn write_object_contents(&mut self, indent: usize, value: &Value) -> Result<()> {
        let object = value.as_object()?;

        let mut pairs: Vec<(&str, &Value)> = object.iter_raw().collect();
        if self.options.sort_keys {
            pairs.sort_by(|a, b| a.0.cmp(b.0));
        }

        let align_values = !self.compact && self.options.object_align_values;
        let longest_key = if align_values {
            pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0)
        } else {
            0
        };

        let count = pairs.len();
        for (i, (key, entry_value)) in pairs.into_iter().enumerate() {
            self.write_prefix_comments(indent, entry_value);
            self.write_indent(indent);
            self.write_key(key);
            if self.compact {
                self.out.push(':');
            } else if self.options.omit_colon_before_object
                && entry_value.is_object()
                && entry_value.object_len().unwrap_or(0) != 0
            {
                self.out.push(' ');
            } else {
                self.out.push_str(": ");
                if align_values {
                    for _ in key.len()..longest_key {
                        self.out.push(' ');
                    }
                }
            }
            self.write_value(indent, entry_value, false, true)?;
            if self.compact {
                if i + 1 < count {
                    self.out.push(',');
                }
            } else if self.options.object_omit_comma || i + 1 == count {
                self.out.push('\n');
            } else {
                self.out.push_str(",\n");
            }
        }

        self.write_prefix_comment_list(indent, &value.comments().pre_end_brace);
        Ok(())
    }

    fn write_key(&mut self, key: &str) {
        // Keyword-shaped keys stay quoted: the parser would not read them
        // back as identifiers.
        let reserved = matches!(key, "true" | "false" | "null");
        if self.options.identifiers_keys && is_identifier(key) && !reserved {
            self.out.push_str(key);
        } else {
            self.write_string(key);
        }
    }

    // ----------------------------------------
    // Numbers.

    fn write_number(&mut self, val: f64) -> Result<()> {
        if self.options.distinct_floats && val == 0.0 && val.is_sign_negative() {
            self.out.push_str("-0.0");
            return Ok(());
        }

        // Integer-valued doubles in i64 range print as integers, with a .0
        // suffix under distinct_floats so they stay floats on reparse.
        if val.fract() == 0.0 && val >= -9_223_372_036_854_775_808.0 && val < 9_223_372_036_854_775_808.0
        {
            self.out.push_str(&(val as i64).to_string());
            if self.options.distinct_floats {
                self.out.push_str(".0");
            }
            return Ok(());
        }

        if val.is_finite() {
            // A double that survives an f32 round-trip gets the float-32
            // short form, provided the string still reparses to the exact
            // double.
            let as_f32 = val as f32;
            if f64::from(as_f32) == val {
                for precision in [6, 8, 9] {
                    let s = format_g(val, precision);
                    let f32_ok = s.parse::<f32>().map_or(false, |p| p == as_f32);
                    let f64_ok = s.parse::<f64>().map_or(false, |p| p == val);
                    if f32_ok && f64_ok {
                        self.out.push_str(&s);
                        return Ok(());
                    }
                }
            }

            // One significant digit first: subnormals like 5e-324 have very
            // short exact forms. Then default, 16 and finally 17 digits.
            for precision in [1, 6, 16] {
                let s = format_g(val, precision);
                if s.parse::<f64>().map_or(false, |p| p == val) {
                    self.out.push_str(&s);
                    return Ok(());
                }
            }
            self.out.push_str(&format_g(val, 17));
            return Ok(());
        }

        if val == f64::INFINITY {
            if !self.options.inf {
                return Err(Error::Encoding("Can't encode infinity".to_string()));
            }
            self.out.push_str("+inf");
        } else if val == f64::NEG_INFINITY {
            if !self.options.inf {
                return Err(Error::Encoding(
                    "Can't encode negative infinity".to_string(),
                ));
            }
            self.out.push_str("-inf");
        } else {
            if !self.options.nan {
                return Err(Error::Encoding("Can't encode NaN".to_string()));
            }
            self.out.push_str("+NaN");
        }
        Ok(())
    }

    // ----------------------------------------
    // Strings.

    fn write_string(&mut self, s: &str) {
        const LONG_LINE: usize = 240;

        if !self.options.str_python_multiline
            || !s.contains('\n')
            || s.len() < LONG_LINE
            || s.contains("\"\"\"")
        {
            self.write_quoted_string(s);
        } else {
            self.out.push_str("\"\"\"");
            self.out.push_str(s);
            self.out.push_str("\"\"\"");
        }
    }

    fn write_quoted_string(&mut self, s: &str) {
        self.out.push('"');
        for ch in s.chars() {
            match ch {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\u{0008}' => self.out.push_str("\\b"),
                '\u{000C}' => self.out.push_str("\\f"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    self.out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    // ----------------------------------------
    // Layout decisions.

    fn is_simple(&self, value: &Value) -> bool {
        if value.is_array() && value.array_len().unwrap_or(0) > 0 {
            return false;
        }
        if value.is_object() && value.object_len().unwrap_or(0) > 0 {
            return false;
        }
        if self.options.write_comments && value.has_comments() {
            return false;
        }
        true
    }

    /// One-line arrays: any all-number array up to 16 elements (e.g. a 4x4
    /// matrix), or up to 4 simple scalars with an estimated width under 60.
    fn is_simple_array(&self, array: &[Value]) -> bool {
        if array.len() <= 16 && array.iter().all(Value::is_number) {
            return true;
        }
        if array.len() > 4 {
            return false;
        }
        let mut estimated_width = 0;
        for value in array {
            if !self.is_simple(value) {
                return false;
            }
            estimated_width += match &value.data {
                Data::Str(s) => 2 + s.len(),
                _ => 5,
            };
            estimated_width += 2;
        }
        estimated_width < 60
    }
}

/// printf-`%g` with the given number of significant digits: scientific
/// notation when the decimal exponent is below -4 or at least `precision`,
/// trailing zeros trimmed, exponent sign always written and padded to two
/// digits.
fn format_g(val: f64, precision: usize) -> String {
    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, val);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = match exponent.parse() {
        Ok(e) => e,
        Err(_) => return scientific,
    };

    if exponent < -4 || exponent >= precision as i32 {
        let mantissa = trim_trailing_zeros(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_trailing_zeros(&format!("{:.*}", decimals, val)).to_string()
    }
}

fn trim_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
