//! Source writer with indentation tracking and fresh-name allocation.
//!
//! [`SourceWriter`] accumulates Go source one line at a time at the current
//! nesting depth and renders it with four-space indentation. It also hands
//! out collision-free local variable names: the first request for a base
//! name returns the base itself, later requests return `base_1`, `base_2`,
//! and so on, skipping anything already issued in the current segment.
//!
//! ```
//! use vesupro_codegen::writer::SourceWriter;
//! use vesupro_codegen::vs_line;
//!
//! let mut w = SourceWriter::new();
//! w.open("if ok");
//! let v = w.fresh("arg0", "string");
//! vs_line!(w, "{v} := \"x\"");
//! w.close();
//! assert_eq!(w.finish(), "if ok {\n    arg0 := \"x\"\n}\n");
//! ```

use std::collections::HashMap;

const INDENT: &str = "    ";

/// Line-oriented Go source builder.
#[derive(Debug, Default)]
pub struct SourceWriter {
    out: String,
    depth: usize,
    /// Every name issued or reserved in this segment, with its bound type.
    bound: HashMap<String, String>,
    /// Next suffix to try per base name.
    next_suffix: HashMap<String, usize>,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current depth. Empty text gives a bare newline.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.out.push('\n');
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    /// Decrease the depth; never goes below zero.
    pub fn unindent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Write `header {` and indent.
    pub fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.indent();
    }

    /// Unindent and write `}`.
    pub fn close(&mut self) {
        self.unindent();
        self.line("}");
    }

    // ── Fresh names ──────────────────────────────────────────────────────

    /// Allocate a name derived from `base`, bound to `ty`.
    ///
    /// Allocation is injective within a segment: no two calls return the
    /// same name, whatever bases they use.
    pub fn fresh(&mut self, base: &str, ty: &str) -> String {
        let mut suffix = self.next_suffix.get(base).copied().unwrap_or(0);
        loop {
            let candidate = if suffix == 0 {
                base.to_string()
            } else {
                format!("{base}_{suffix}")
            };
            suffix += 1;
            if !self.bound.contains_key(&candidate) {
                self.next_suffix.insert(base.to_string(), suffix);
                self.bound.insert(candidate.clone(), ty.to_string());
                return candidate;
            }
        }
    }

    /// Mark `name` as taken so [`fresh`](Self::fresh) never returns it.
    pub fn reserve(&mut self, name: &str, ty: &str) {
        self.bound.insert(name.to_string(), ty.to_string());
    }

    /// The type a name was bound to in the current segment.
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.bound.get(name).map(String::as_str)
    }

    /// Forget all names; the next segment starts from scratch.
    pub fn reset_names(&mut self) {
        self.bound.clear();
        self.next_suffix.clear();
    }

    /// The rendered source.
    pub fn finish(self) -> String {
        self.out
    }
}

/// Formatted [`SourceWriter::line`].
#[macro_export]
macro_rules! vs_line {
    ($w:expr, $($arg:tt)*) => {
        $w.line(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_request_returns_base() {
        let mut w = SourceWriter::new();
        assert_eq!(w.fresh("tok", "vesupro.Token"), "tok");
        assert_eq!(w.fresh("tok", "vesupro.Token"), "tok_1");
        assert_eq!(w.fresh("tok", "vesupro.Token"), "tok_2");
        assert_eq!(w.type_of("tok_1"), Some("vesupro.Token"));
    }

    #[test]
    fn test_fresh_skips_issued_names() {
        let mut w = SourceWriter::new();
        assert_eq!(w.fresh("arg0_1", "uint64"), "arg0_1");
        assert_eq!(w.fresh("arg0", "string"), "arg0");
        assert_eq!(w.fresh("arg0", "uint64"), "arg0_2");
    }

    #[test]
    fn test_reserved_names_are_never_issued() {
        let mut w = SourceWriter::new();
        w.reserve("err", "error");
        assert_eq!(w.fresh("err", "error"), "err_1");
        assert_eq!(w.type_of("err"), Some("error"));
    }

    #[test]
    fn test_injective_across_bases() {
        let mut w = SourceWriter::new();
        let mut seen = HashSet::new();
        for i in 0..50 {
            let base = if i % 3 == 0 { "v" } else { "v_1" };
            assert!(seen.insert(w.fresh(base, "int")), "duplicate at {i}");
        }
    }

    #[test]
    fn test_reset_starts_new_segment() {
        let mut w = SourceWriter::new();
        w.fresh("tok", "t");
        w.fresh("tok", "t");
        w.reset_names();
        assert_eq!(w.fresh("tok", "t"), "tok");
        assert_eq!(w.type_of("tok_1"), None);
    }

    #[test]
    fn test_unindent_saturates() {
        let mut w = SourceWriter::new();
        w.unindent();
        w.unindent();
        w.line("x");
        assert_eq!(w.finish(), "x\n");
    }

    #[test]
    fn test_nested_blocks() {
        let mut w = SourceWriter::new();
        w.open("func f()");
        w.open("if true");
        w.line("return");
        w.close();
        w.line("");
        w.close();
        assert_eq!(
            w.finish(),
            "func f() {\n    if true {\n        return\n    }\n\n}\n"
        );
    }
}
