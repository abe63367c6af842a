//! Dialect and layout switches consumed by both the parser and the emitter.
//!
//! [`FormatOptions`] is a plain record of toggles. Three presets cover the
//! common cases:
//!
//! - [`FormatOptions::json`]: strict JSON — every relaxation off.
//! - [`FormatOptions::cfg`]: the CFG dialect — relaxed syntax with enforced
//!   tab indentation and `#include` support. This is also the `Default`.
//! - [`FormatOptions::forgiving`]: everything on, nothing enforced — for
//!   reading files of unknown pedigree.
//!
//! Presets are plain values; tweak individual fields with struct-update
//! syntax:
//!
//! ```rust
//! use cfgish::FormatOptions;
//!
//! let options = FormatOptions {
//!     sort_keys: true,
//!     indentation: "  ".to_string(),
//!     ..FormatOptions::json()
//! };
//! assert!(!options.compact());
//! ```

/// Every way the file format can be tweaked.
///
/// Consumed by [`parse_string`](crate::parse_string) (grammar switches) and
/// [`dump_string`](crate::dump_string) (layout switches). See the module
/// docs for the presets.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatOptions {
    /// String written per nesting level: a single tab, a run of spaces, or
    /// empty. Empty means compact output (no newlines, minimal spaces).
    pub indentation: String,
    /// Parser checks that each line is indented by depth copies of
    /// `indentation`.
    pub enforce_indentation: bool,
    /// Emitter ends the file with a newline (unless compact).
    pub end_with_newline: bool,

    // Top file:
    /// Accept an empty file as the empty object.
    pub empty_file: bool,
    /// Allow key-value pairs at the top level without `{ }`.
    pub implicit_top_object: bool,
    /// Allow several values at the top level without `[ ]`.
    pub implicit_top_array: bool,

    // Comments:
    /// Allow `// ...` comments.
    pub single_line_comments: bool,
    /// Allow `/* ... */` comments.
    pub block_comments: bool,
    /// Allow `/* /* nested */ */` comments.
    pub nesting_block_comments: bool,

    // Numbers:
    /// Allow `+inf`, `-inf`.
    pub inf: bool,
    /// Allow `+NaN`.
    pub nan: bool,
    /// Allow `0xff`.
    pub hexadecimal_integers: bool,
    /// Allow `0b1010`.
    pub binary_integers: bool,
    /// Allow `+42`.
    pub unary_plus: bool,
    /// Print `9.0` as `9.0` rather than `9`, and `-0.0` distinct from `0`.
    /// A must for round-tripping.
    pub distinct_floats: bool,

    // Arrays:
    /// Allow `[1 2 3]`.
    pub array_omit_comma: bool,
    /// Allow `[1, 2, 3,]`.
    pub array_trailing_comma: bool,

    // Objects:
    /// Allow `{ is_this_ok: true }`.
    pub identifiers_keys: bool,
    /// Allow `{ "is_this_ok" = true }`.
    pub object_separator_equal: bool,
    /// Allow `{ "is_this_ok" : true }`.
    pub allow_space_before_colon: bool,
    /// Allow `{ "nested_object" { } }`.
    pub omit_colon_before_object: bool,
    /// Allow `{a:1 b:2}`.
    pub object_omit_comma: bool,
    /// Allow `{a:1, b:2,}`.
    pub object_trailing_comma: bool,
    /// Allow `{"a":1, "a":2}` — the last occurrence wins.
    pub object_duplicate_keys: bool,
    /// Pad keys with spaces so values line up.
    pub object_align_values: bool,

    // Strings:
    /// Allow `@"Verbatim\strings"`.
    pub str_csharp_verbatim: bool,
    /// Allow `"""Python-style verbatim strings"""`.
    pub str_python_multiline: bool,
    /// Allow `\U0001D11E` eight-digit escapes.
    pub str_32bit_unicode: bool,
    /// Allow an unescaped tab inside a quoted string.
    pub str_allow_tab: bool,

    // Special:
    /// Process `#include "other_file.cfg"` directives.
    pub allow_macro: bool,

    // When writing:
    /// Replay attached comments.
    pub write_comments: bool,
    /// Sort keys lexicographically instead of by insertion order.
    pub sort_keys: bool,
    /// Write uninitialized values as `UNINITIALIZED` instead of failing.
    /// Useful for debugging.
    pub write_uninitialized: bool,
    /// Dumping marks every visited entry as accessed so a later dangling
    /// audit does not flag serialized output.
    pub mark_accessed: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::cfg()
    }
}

impl FormatOptions {
    /// The CFG file format: relaxed syntax, tab indentation enforced,
    /// `#include` allowed.
    pub fn cfg() -> Self {
        FormatOptions {
            indentation: "\t".to_string(),
            enforce_indentation: true,
            end_with_newline: true,

            empty_file: false,
            implicit_top_object: true,
            implicit_top_array: true,

            single_line_comments: true,
            block_comments: true,
            nesting_block_comments: true,

            inf: true,
            nan: true,
            hexadecimal_integers: true,
            binary_integers: true,
            unary_plus: true,
            distinct_floats: true,

            array_omit_comma: true,
            array_trailing_comma: true,

            identifiers_keys: true,
            object_separator_equal: false,
            allow_space_before_colon: false,
            omit_colon_before_object: false,
            object_omit_comma: true,
            object_trailing_comma: true,
            object_duplicate_keys: false,
            object_align_values: true,

            str_csharp_verbatim: true,
            str_python_multiline: true,
            str_32bit_unicode: true,
            str_allow_tab: true,

            allow_macro: true,

            write_comments: true,
            sort_keys: false,
            write_uninitialized: false,
            mark_accessed: true,
        }
    }

    /// Strict JSON: every relaxation off, indentation not enforced,
    /// comments stripped on write.
    pub fn json() -> Self {
        FormatOptions {
            indentation: "\t".to_string(),
            enforce_indentation: false,

            empty_file: false,
            implicit_top_object: false,
            implicit_top_array: false,

            single_line_comments: false,
            block_comments: false,
            nesting_block_comments: false,

            inf: false,
            nan: false,
            hexadecimal_integers: false,
            binary_integers: false,
            unary_plus: false,
            distinct_floats: true,

            array_omit_comma: false,
            array_trailing_comma: false,

            identifiers_keys: false,
            object_separator_equal: false,
            allow_space_before_colon: true,
            omit_colon_before_object: false,
            object_omit_comma: false,
            object_trailing_comma: false,
            // To be 100% JSON compatible this would be true, but it is
            // error prone.
            object_duplicate_keys: false,
            object_align_values: true,

            str_csharp_verbatim: false,
            str_python_multiline: false,
            str_32bit_unicode: false,
            str_allow_tab: false,

            allow_macro: false,

            write_comments: false,
            sort_keys: false,
            ..Self::cfg()
        }
    }

    /// A very forgiving format for parsing files that are not strict:
    /// every relaxation on, indentation unchecked, duplicate keys tolerated.
    pub fn forgiving() -> Self {
        FormatOptions {
            indentation: "\t".to_string(),
            enforce_indentation: false,

            empty_file: true,
            implicit_top_object: true,
            implicit_top_array: true,

            object_separator_equal: true,
            allow_space_before_colon: true,
            omit_colon_before_object: true,
            object_duplicate_keys: true,

            write_comments: false,
            ..Self::cfg()
        }
    }

    /// True when `indentation` is empty: no newlines, minimal whitespace.
    pub fn compact(&self) -> bool {
        self.indentation.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let json = FormatOptions::json();
        assert!(!json.single_line_comments);
        assert!(!json.implicit_top_object);
        assert!(json.distinct_floats);
        assert!(!json.allow_macro);

        let cfg = FormatOptions::cfg();
        assert!(cfg.enforce_indentation);
        assert_eq!(cfg.indentation, "\t");
        assert!(cfg.allow_macro);
        assert_eq!(cfg, FormatOptions::default());

        let forgiving = FormatOptions::forgiving();
        assert!(!forgiving.enforce_indentation);
        assert!(forgiving.object_duplicate_keys);
        assert!(forgiving.object_separator_equal);
    }

    #[test]
    fn test_compact() {
        let mut options = FormatOptions::json();
        assert!(!options.compact());
        options.indentation = String::new();
        assert!(options.compact());
    }
}
