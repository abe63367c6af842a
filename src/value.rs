//! The dynamic configuration value.
//!
//! [`Value`] is a tagged variant (null, bool, integer, float, string, array,
//! object) that additionally remembers *where it came from* — the document
//! and line it was parsed from plus any comments that surrounded it — and,
//! for object entries, *whether it has been read*. The latter powers
//! [`Value::check_dangling`], which flags config keys nobody looked at:
//! the usual symptom of a typo in a config file.
//!
//! ## Creating values
//!
//! ```rust
//! use cfgish::{ObjectMap, Value};
//!
//! let number = Value::from(42);
//! let text = Value::from("hello");
//! let list = Value::from(vec![1, 2, 3]);
//!
//! let mut server = Value::object();
//! server.insert_or_assign("port", Value::from(8080)).unwrap();
//! assert_eq!(server.get("port").unwrap().as_int().unwrap(), 8080);
//! ```
//!
//! ## Typed reads
//!
//! Typed accessors return `Result` and cite the value's source location on a
//! mismatch:
//!
//! ```rust
//! use cfgish::Value;
//!
//! let value = Value::from(3.5);
//! assert_eq!(value.as_float().unwrap(), 3.5);
//! assert!(value.as_bool().is_err());
//! ```
//!
//! Integers widen to float but never the other way:
//!
//! ```rust
//! use cfgish::Value;
//!
//! assert_eq!(Value::from(2).as_float().unwrap(), 2.0);
//! assert!(Value::from(2.0).as_int().is_err());
//! ```

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops;
use std::sync::Arc;

use crate::doc::{where_is, DocInfo};
use crate::error::{DanglingKey, Error, Result};
use crate::map::ObjectMap;
use crate::options::FormatOptions;

/// The variant tag of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A freshly constructed value; reading or serializing it is an error.
    Uninitialized,
    /// The write-only result of looking up a missing key on a mutable
    /// object. Reading through it reports the missing key.
    BadLookup,
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl Kind {
    /// Human-readable name, as used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Uninitialized => "uninitialized",
            Kind::BadLookup => "undefined",
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comments attached to a value, with their `//` or `/* */` delimiters kept
/// verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comments {
    /// Comments on preceding lines.
    pub prefix: Vec<String>,
    /// After the value, on the same line.
    pub postfix: Vec<String>,
    /// Before the closing `}` or `]` of a container.
    pub pre_end_brace: Vec<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.postfix.is_empty() && self.pre_end_brace.is_empty()
    }

    /// Moves all comments from `other` onto the end of `self`.
    pub fn append(&mut self, mut other: Comments) {
        self.prefix.append(&mut other.prefix);
        self.postfix.append(&mut other.postfix);
        self.pre_end_brace.append(&mut other.pre_end_brace);
    }
}

#[derive(Clone, Debug)]
pub(crate) struct BadLookup {
    pub(crate) doc: Option<Arc<DocInfo>>,
    pub(crate) line: Option<u32>,
    pub(crate) key: String,
}

#[derive(Clone, Debug)]
pub(crate) enum Data {
    Uninitialized,
    BadLookup(Box<BadLookup>),
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Object(ObjectMap),
}

/// A dynamic config value with provenance and comments.
///
/// Copies are deep: a clone is a fully independent tree. Equality is
/// structural over the data only; provenance, comments and accessed flags
/// never participate.
#[derive(Clone, Debug)]
pub struct Value {
    pub(crate) data: Data,
    doc: Option<Arc<DocInfo>>,
    line: Option<u32>,
    comments: Option<Box<Comments>>,
}

impl Default for Value {
    /// An uninitialized value. Turn it into a container with
    /// [`Value::object`] or [`Value::array`], or assign into it.
    fn default() -> Self {
        Value::new(Data::Uninitialized)
    }
}

impl Value {
    pub(crate) fn new(data: Data) -> Self {
        Value {
            data,
            doc: None,
            line: None,
            comments: None,
        }
    }

    /// The null value.
    pub fn null() -> Self {
        Value::new(Data::Null)
    }

    /// An empty object.
    pub fn object() -> Self {
        Value::new(Data::Object(ObjectMap::new()))
    }

    /// An empty array.
    pub fn array() -> Self {
        Value::new(Data::Array(Vec::new()))
    }

    pub(crate) fn bad_lookup(doc: Option<Arc<DocInfo>>, line: Option<u32>, key: String) -> Self {
        Value::new(Data::BadLookup(Box::new(BadLookup { doc, line, key })))
    }

    pub(crate) fn make_object(&mut self) {
        debug_assert!(matches!(self.data, Data::Uninitialized));
        self.data = Data::Object(ObjectMap::new());
    }

    pub(crate) fn make_array(&mut self) {
        debug_assert!(matches!(self.data, Data::Uninitialized));
        self.data = Data::Array(Vec::new());
    }

    pub(crate) fn set_data(&mut self, data: Data) {
        self.data = data;
    }

    pub(crate) fn tag(&mut self, doc: &Arc<DocInfo>, line: u32) {
        self.doc = Some(doc.clone());
        self.line = Some(line);
    }

    // ----------------------------------------
    // Inspectors:

    /// The variant tag.
    pub fn kind(&self) -> Kind {
        match &self.data {
            Data::Uninitialized => Kind::Uninitialized,
            Data::BadLookup(_) => Kind::BadLookup,
            Data::Null => Kind::Null,
            Data::Bool(_) => Kind::Bool,
            Data::Int(_) => Kind::Int,
            Data::Float(_) => Kind::Float,
            Data::Str(_) => Kind::String,
            Data::Array(_) => Kind::Array,
            Data::Object(_) => Kind::Object,
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self.data, Data::Uninitialized)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, Data::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.data, Data::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self.data, Data::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self.data, Data::Float(_))
    }

    /// True for both integers and floats.
    pub fn is_number(&self) -> bool {
        self.is_int() || self.is_float()
    }

    pub fn is_string(&self) -> bool {
        matches!(self.data, Data::Str(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data, Data::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.data, Data::Object(_))
    }

    /// `"<file>:<line>: "` when provenance is available, otherwise shorter
    /// forms down to the empty string.
    pub fn location(&self) -> String {
        where_is(self.doc.as_ref(), self.line)
    }

    /// 1-indexed source line, if this value was parsed.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Handle to the document this value was parsed from.
    pub fn doc(&self) -> Option<&Arc<DocInfo>> {
        self.doc.as_ref()
    }

    pub fn set_doc(&mut self, doc: Option<Arc<DocInfo>>) {
        self.doc = doc;
    }

    // ----------------------------------------
    // Typed reads:

    fn type_error(&self, expected: Kind) -> Error {
        if let Data::BadLookup(bad) = &self.data {
            return Error::Type {
                location: where_is(bad.doc.as_ref(), bad.line),
                message: format!("Failed to find key '{}'", bad.key),
            };
        }
        let found = self.kind();
        let mut message = format!("Expected {}, got {}", expected, found);
        if found == Kind::Uninitialized && expected == Kind::Object {
            message.push_str(". Did you forget to call Value::object()?");
        } else if found == Kind::Uninitialized && expected == Kind::Array {
            message.push_str(". Did you forget to call Value::array()?");
        }
        Error::Type {
            location: self.location(),
            message,
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match &self.data {
            Data::Bool(b) => Ok(*b),
            _ => Err(self.type_error(Kind::Bool)),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match &self.data {
            Data::Int(i) => Ok(*i),
            _ => Err(self.type_error(Kind::Int)),
        }
    }

    /// Returns the float value; integers widen losslessly enough for config
    /// purposes, floats never narrow to int.
    pub fn as_float(&self) -> Result<f64> {
        match &self.data {
            Data::Int(i) => Ok(*i as f64),
            Data::Float(f) => Ok(*f),
            _ => Err(self.type_error(Kind::Float)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match &self.data {
            Data::Str(s) => Ok(s),
            _ => Err(self.type_error(Kind::String)),
        }
    }

    pub fn as_array(&self) -> Result<&[Value]> {
        match &self.data {
            Data::Array(array) => Ok(array),
            _ => Err(self.type_error(Kind::Array)),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Vec<Value>> {
        if let Data::Array(ref mut array) = self.data {
            Ok(array)
        } else {
            Err(self.type_error(Kind::Array))
        }
    }

    pub fn as_object(&self) -> Result<&ObjectMap> {
        match &self.data {
            Data::Object(object) => Ok(object),
            _ => Err(self.type_error(Kind::Object)),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut ObjectMap> {
        if let Data::Object(ref mut object) = self.data {
            Ok(object)
        } else {
            Err(self.type_error(Kind::Object))
        }
    }

    /// Converts to any [`FromValue`] type, e.g. `value.cast::<u16>()?`.
    pub fn cast<T: FromValue>(&self) -> Result<T> {
        T::from_value(self)
    }

    // ----------------------------------------
    // Arrays:

    pub fn array_len(&self) -> Result<usize> {
        Ok(self.as_array()?.len())
    }

    /// Appends to an array.
    pub fn push(&mut self, value: Value) -> Result<()> {
        self.as_array_mut()?.push(value);
        Ok(())
    }

    /// Bounds-checked array indexing.
    pub fn at(&self, index: usize) -> Result<&Value> {
        let array = self.as_array()?;
        array.get(index).ok_or_else(|| Error::Type {
            location: self.location(),
            message: "Array index out of range".to_string(),
        })
    }

    /// Bounds-checked mutable array indexing.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut Value> {
        let len = self.as_array()?.len();
        if index >= len {
            return Err(Error::Type {
                location: self.location(),
                message: "Array index out of range".to_string(),
            });
        }
        Ok(&mut self.as_array_mut()?[index])
    }

    // ----------------------------------------
    // Objects:

    pub fn object_len(&self) -> Result<usize> {
        Ok(self.as_object()?.len())
    }

    /// True if this is an object containing `key`. Does not count as a read.
    pub fn has_key(&self, key: &str) -> bool {
        match &self.data {
            Data::Object(object) => object.contains_key(key),
            _ => false,
        }
    }

    /// Reads an object entry, marking it accessed. Fails with the object's
    /// location when the key is missing, and with a type error when this is
    /// not an object.
    pub fn get(&self, key: &str) -> Result<&Value> {
        let object = self.as_object()?;
        object.get(key).ok_or_else(|| Error::Type {
            location: self.location(),
            message: format!("Key '{}' not in object", key),
        })
    }

    /// Mutable lookup. A missing key gets a write-only placeholder recording
    /// this object's location; the first assignment turns it into a real
    /// entry, and reading it before that reports the missing key.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value> {
        let doc = self.doc.clone();
        let line = self.line;
        let object = self.as_object_mut()?;
        Ok(object.entry_or_bad_lookup(key, doc, line))
    }

    /// Reads `key` and converts, or returns `default` when the key is
    /// missing. A present key of the wrong type is still an error.
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> Result<T> {
        match self.as_object()?.get(key) {
            Some(value) => value.cast(),
            None => Ok(default),
        }
    }

    /// Like `self.get(a)?.get(b)?...` but returns `default` on the first
    /// missing key anywhere along the path.
    pub fn get_or_path<T: FromValue>(&self, keys: &[&str], default: T) -> Result<T> {
        let mut current = self;
        for key in keys {
            match current.as_object()?.get(key) {
                Some(value) => current = value,
                None => return Ok(default),
            }
        }
        current.cast()
    }

    /// `obj[key] = value` with insertion: an existing entry is assigned in
    /// place (keeping its provenance when `value` has none), a new key is
    /// appended.
    pub fn insert_or_assign(&mut self, key: &str, value: Value) -> Result<()> {
        self.as_object_mut()?.insert_or_assign(key, value);
        Ok(())
    }

    /// Inserts only if the key is absent. Returns whether it was inserted.
    pub fn emplace(&mut self, key: impl Into<String>, value: Value) -> Result<bool> {
        Ok(self.as_object_mut()?.emplace(key.into(), value))
    }

    /// Removes a key from an object. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.as_object_mut()?.remove(key).is_some())
    }

    // ----------------------------------------
    // Assignment:

    /// Replaces this value with `other`, retaining the current provenance
    /// and comments when `other` carries none.
    pub fn assign(&mut self, other: Value) {
        let Value {
            data,
            doc,
            line,
            comments,
        } = other;
        self.data = data;
        if doc.is_some() || line.is_some() {
            self.doc = doc;
            self.line = line;
        }
        if comments.is_some() {
            self.comments = comments;
        }
    }

    // ----------------------------------------
    // Comments:

    /// Was there any comment around this value in the input?
    pub fn has_comments(&self) -> bool {
        self.comments.as_ref().map_or(false, |c| !c.is_empty())
    }

    pub fn comments(&self) -> &Comments {
        static EMPTY: Comments = Comments {
            prefix: Vec::new(),
            postfix: Vec::new(),
            pre_end_brace: Vec::new(),
        };
        match &self.comments {
            Some(comments) => comments,
            None => &EMPTY,
        }
    }

    pub fn comments_mut(&mut self) -> &mut Comments {
        self.comments.get_or_insert_with(Box::default)
    }

    // ----------------------------------------
    // Access tracking:

    /// Sets the accessed flag on every object entry in this tree. Works
    /// through a shared reference; the flags are interior-mutable.
    pub fn mark_accessed(&self, accessed: bool) {
        match &self.data {
            Data::Object(object) => {
                for (_, entry) in object.entries() {
                    entry.mark(accessed);
                    entry.value.mark_accessed(accessed);
                }
            }
            Data::Array(array) => {
                for element in array {
                    element.mark_accessed(accessed);
                }
            }
            _ => {}
        }
    }

    /// Visits every reachable unaccessed object entry. Accessed entries are
    /// descended into; arrays are walked unconditionally.
    pub fn visit_dangling<F>(&self, visitor: &mut F)
    where
        F: FnMut(&str, &Value),
    {
        match &self.data {
            Data::Object(object) => {
                for (key, entry) in object.entries() {
                    if entry.is_accessed() {
                        entry.value.visit_dangling(visitor);
                    } else {
                        visitor(key, &entry.value);
                    }
                }
            }
            Data::Array(array) => {
                for element in array {
                    element.visit_dangling(visitor);
                }
            }
            _ => {}
        }
    }

    /// Reports every object entry that was never read since parsing (or the
    /// last [`mark_accessed`](Self::mark_accessed) reset) as
    /// [`Error::DanglingKeys`]. The usual way to catch typos in a config
    /// file: parse, read what you need, then call this.
    ///
    /// ```rust
    /// use cfgish::{parse_string, FormatOptions};
    ///
    /// let cfg = parse_string(r#"{"used": 1, "unused": 2}"#, &FormatOptions::json(), "app.json").unwrap();
    /// cfg.get("used").unwrap();
    ///
    /// let report = cfg.check_dangling().unwrap_err();
    /// assert!(report.to_string().contains("'unused'"));
    /// ```
    pub fn check_dangling(&self) -> Result<()> {
        let mut dangling = Vec::new();
        self.visit_dangling(&mut |key: &str, value: &Value| {
            dangling.push(DanglingKey {
                location: value.location(),
                key: key.to_string(),
            });
        });
        if dangling.is_empty() {
            Ok(())
        } else {
            Err(Error::DanglingKeys(dangling))
        }
    }
}

/// Structural deep equality over data only. `Uninitialized` and the result
/// of a failed lookup compare unequal to everything, including themselves;
/// so does `NaN`. Integers and floats are disjoint.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (Data::Null, Data::Null) => true,
            (Data::Bool(a), Data::Bool(b)) => a == b,
            (Data::Int(a), Data::Int(b)) => a == b,
            (Data::Float(a), Data::Float(b)) => a == b,
            (Data::Str(a), Data::Str(b)) => a == b,
            (Data::Array(a), Data::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Data::Object(a), Data::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Fail-safe JSON-ish rendering: allows `inf`, `NaN` and uninitialized
/// values, writes no trailing newline and marks nothing as accessed.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = FormatOptions {
            inf: true,
            nan: true,
            write_uninitialized: true,
            end_with_newline: false,
            mark_accessed: false,
            ..FormatOptions::json()
        };
        match crate::write::dump_string(self, &options) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

// ----------------------------------------
// Index sugar. These panic where the fallible accessors would error, like
// `Vec` and `HashMap` indexing; use `get`/`get_mut`/`at` to handle failure.

impl ops::Index<&str> for Value {
    type Output = Value;

    /// Panics when the key is missing or this is not an object.
    fn index(&self, key: &str) -> &Value {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl ops::IndexMut<&str> for Value {
    /// Creates a write-only placeholder for missing keys; panics when this
    /// is not an object.
    fn index_mut(&mut self, key: &str) -> &mut Value {
        match self.get_mut(key) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl ops::Index<usize> for Value {
    type Output = Value;

    /// Panics when out of bounds or not an array.
    fn index(&self, index: usize) -> &Value {
        match self.at(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl ops::IndexMut<usize> for Value {
    /// Panics when out of bounds or not an array.
    fn index_mut(&mut self, index: usize) -> &mut Value {
        match self.at_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

// ----------------------------------------
// Conversions in:

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::new(Data::Bool(value))
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::new(Data::Int(value as i64))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Value {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        i64::try_from(value)
            .map(|i| Value::new(Data::Int(i)))
            .map_err(|_| Error::Type {
                location: String::new(),
                message: "Integer too large to fit into 63 bits".to_string(),
            })
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::new(Data::Float(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::new(Data::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(Data::Str(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::new(Data::Str(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::new(Data::Array(values.into_iter().map(Into::into).collect()))
    }
}

impl From<ObjectMap> for Value {
    fn from(map: ObjectMap) -> Self {
        Value::new(Data::Object(map))
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Value::from(ObjectMap::from_iter(iter))
    }
}

// ----------------------------------------
// Conversions out:

/// Typed extraction from a [`Value`], used by [`Value::cast`],
/// [`Value::get_or`] and [`Value::get_or_path`]. Integer impls are
/// range-checked.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_int()
    }
}

macro_rules! impl_from_value_integer {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self> {
                    let wide = value.as_int()?;
                    <$t>::try_from(wide).map_err(|_| Error::Type {
                        location: value.location(),
                        message: "Integer out of range".to_string(),
                    })
                }
            }
        )*
    };
}

impl_from_value_integer!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.as_float()? as f32)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_float()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.as_str()?.to_string())
    }
}

// ----------------------------------------
// Serde interop. Serializing walks raw entries so it is not mistaken for
// reading; deserializing builds a tree without provenance.

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.data {
            Data::Null => serializer.serialize_unit(),
            Data::Bool(b) => serializer.serialize_bool(*b),
            Data::Int(i) => serializer.serialize_i64(*i),
            Data::Float(f) => serializer.serialize_f64(*f),
            Data::Str(s) => serializer.serialize_str(s),
            Data::Array(array) => {
                let mut seq = serializer.serialize_seq(Some(array.len()))?;
                for element in array {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Data::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object.iter_raw() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Data::Uninitialized | Data::BadLookup(_) => Err(serde::ser::Error::custom(
                "cannot serialize an uninitialized value",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid config value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                if value <= i64::MAX as u64 {
                    Ok(Value::from(value as i64))
                } else {
                    Ok(Value::from(value as f64))
                }
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::null())
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::null())
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut elements = Vec::new();
                while let Some(element) = seq.next_element()? {
                    elements.push(element);
                }
                Ok(Value::new(Data::Array(elements)))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut object = ObjectMap::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    object.insert(key, value);
                }
                Ok(Value::from(object))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
