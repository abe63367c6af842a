//! # cfgish
//!
//! A configuration document library built around one dynamic [`Value`] type
//! and two symmetric engines: a parser that turns text into a value tree
//! (with source provenance and attached comments) and an emitter that
//! serializes a tree back to text. The document language is a strict
//! superset of JSON with opt-in relaxations: identifier keys, trailing and
//! omitted commas, comments, hex/binary integers, `±inf`/`+NaN`, verbatim
//! and multi-line strings, `#include` directives, `=` separators, implicit
//! top-level objects, and enforced indentation.
//!
//! ## Reading a config
//!
//! ```rust
//! use cfgish::{parse_string, FormatOptions};
//!
//! let text = "
//! port:    8080
//! name:    \"demo\"
//! factors: [1 2 4]  // commas optional
//! ";
//! let cfg = parse_string(text, &FormatOptions::forgiving(), "demo.cfg").unwrap();
//!
//! assert_eq!(cfg.get("port").unwrap().as_int().unwrap(), 8080);
//! assert_eq!(cfg.get_or("missing", 42i64).unwrap(), 42);
//! ```
//!
//! ## Catching typos with the dangling-key audit
//!
//! Every object entry remembers whether it was read. After pulling out the
//! settings you understand, ask the tree what you missed:
//!
//! ```rust
//! use cfgish::{parse_string, FormatOptions};
//!
//! let cfg = parse_string(r#"{"log_level": "info", "log_levle": "debug"}"#,
//!                        &FormatOptions::json(), "typo.json").unwrap();
//! cfg.get("log_level").unwrap();
//!
//! let report = cfg.check_dangling().unwrap_err();
//! assert!(report.to_string().contains("'log_levle'"));
//! ```
//!
//! ## Writing it back
//!
//! The emitter is the parser's inverse — insertion order, comments and
//! number formatting survive a round trip:
//!
//! ```rust
//! use cfgish::{dump_string, parse_string, FormatOptions};
//!
//! let options = FormatOptions::cfg();
//! let cfg = parse_string("// setup\nwidth: 3.14\n", &options, "a.cfg").unwrap();
//! let text = dump_string(&cfg, &options).unwrap();
//! assert!(text.contains("// setup"));
//! assert!(text.contains("3.14"));
//! ```
//!
//! ## Dialects
//!
//! Everything is driven by [`FormatOptions`]; [`FormatOptions::json`] is
//! strict JSON, [`FormatOptions::cfg`] the relaxed CFG dialect with enforced
//! tab indentation, [`FormatOptions::forgiving`] reads nearly anything.
//! Individual switches can be toggled freely:
//!
//! ```rust
//! use cfgish::{parse_string, FormatOptions};
//!
//! // Strict JSON rejects trailing commas...
//! assert!(parse_string("[1, 2,]", &FormatOptions::json(), "a.json").is_err());
//! // ...the relaxed dialects accept them.
//! assert!(parse_string("[1, 2,]", &FormatOptions::forgiving(), "a.cfg").is_ok());
//! ```
//!
//! ## Includes
//!
//! `#include "relative.cfg"` and `#include <as-is.cfg>` are resolved through
//! a [`ParseSession`] holding a host-provided loader callback; repeated
//! includes of the same path are parsed once and cached. The library itself
//! performs no file I/O.
//!
//! ## Interop
//!
//! [`Value`] implements serde's `Serialize` and `Deserialize`, so trees can
//! be converted to and from any other serde format or typed struct.

pub mod doc;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod parse;
pub mod value;
pub mod write;

pub use doc::{DocInfo, Include};
pub use error::{DanglingKey, Error, ParseError, Result};
pub use map::ObjectMap;
pub use options::FormatOptions;
pub use parse::{parse_string, ParseSession};
pub use value::{Comments, FromValue, Kind, Value};
pub use write::{dump_string, dump_string_with, IncludeSink};
