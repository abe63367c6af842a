//! Document identity and include provenance.
//!
//! Every value parsed from text carries a handle to a [`DocInfo`] describing
//! the document it came from. When a document is pulled in through an
//! `#include` directive, the including sites are recorded so error messages
//! can print the whole chain (`..., included at: main.cfg:7`).

use std::sync::{Arc, Mutex};

/// Identity of a parsed document: a filename label plus the list of sites
/// that `#include`d it.
///
/// The filename is only a label for error reporting; the library never opens
/// files itself. Includer sites are appended through a shared handle while a
/// parse session runs, which is why the list sits behind a mutex.
#[derive(Debug)]
pub struct DocInfo {
    filename: String,
    includers: Mutex<Vec<Include>>,
}

/// One site that included a document: the including document and the
/// 1-indexed line of the `#include` directive.
#[derive(Debug, Clone)]
pub struct Include {
    pub doc: Arc<DocInfo>,
    pub line: u32,
}

impl DocInfo {
    pub fn new(filename: impl Into<String>) -> Self {
        DocInfo {
            filename: filename.into(),
            includers: Mutex::new(Vec::new()),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// A snapshot of the sites that have included this document so far.
    pub fn includers(&self) -> Vec<Include> {
        self.includers
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub(crate) fn add_includer(&self, doc: Arc<DocInfo>, line: u32) {
        if let Ok(mut guard) = self.includers.lock() {
            guard.push(Include { doc, line });
        }
    }

    /// Appends `", included at:"` lines for every includer, recursively.
    pub fn append_include_info(&self, out: &mut String, indent: &str) {
        let includers = self.includers();
        if includers.is_empty() {
            return;
        }
        out.push_str(", included at:\n");
        for includer in &includers {
            out.push_str(indent);
            out.push_str(includer.doc.filename());
            out.push(':');
            out.push_str(&includer.line.to_string());
            includer
                .doc
                .append_include_info(out, &format!("{}    ", indent));
            out.push('\n');
        }
        out.pop();
    }
}

/// Renders `"<file>:<line>: "` (with include chain) for error messages.
/// Empty when there is no provenance at all.
pub(crate) fn where_is(doc: Option<&Arc<DocInfo>>, line: Option<u32>) -> String {
    match (doc, line) {
        (Some(doc), line) => {
            let mut ret = doc.filename().to_string();
            if let Some(line) = line {
                ret.push(':');
                ret.push_str(&line.to_string());
            }
            doc.append_include_info(&mut ret, "    ");
            ret.push_str(": ");
            ret
        }
        (None, Some(line)) => format!("line {}: ", line),
        (None, None) => String::new(),
    }
}
