//! Diagnostics and fix-its reported by the front-end.
//!
//! The store keeps diagnostics keyed by [`Location`](crate::Location) and
//! fix-its grouped per file, so both can be cleared wholesale when a file
//! is re-indexed.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::LineCol;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A compiler message anchored at a location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Compiler-specific code (e.g. a warning flag name).
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Length of the highlighted range in bytes, 0 for a point.
    pub length: u32,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            length: 0,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A suggested edit: replace `length` bytes at `start` with `text`.
///
/// Fix-its are grouped per file by the store, so the position carries no
/// file id. Ordered by position so a file's edits can be applied in order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixIt {
    pub start: LineCol,
    pub length: u32,
    pub text: SmolStr,
}

impl FixIt {
    pub fn new(start: LineCol, length: u32, text: impl Into<SmolStr>) -> Self {
        Self {
            start,
            length,
            text: text.into(),
        }
    }

    /// Pure insertion (nothing replaced).
    pub fn insert(start: LineCol, text: impl Into<SmolStr>) -> Self {
        Self::new(start, 0, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_diagnostic_builders() {
        let diag = Diagnostic::warning("unused variable 'x'")
            .with_code("-Wunused-variable")
            .with_length(1);

        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code.as_deref(), Some("-Wunused-variable"));
        assert_eq!(diag.length, 1);
        assert!(!diag.is_error());
        assert!(Diagnostic::error("boom").is_error());
    }

    #[test]
    fn test_severity_lsp() {
        assert_eq!(Severity::Error.to_lsp(), 1);
        assert_eq!(Severity::Hint.to_lsp(), 4);
    }

    #[test]
    fn test_fixits_sort_by_position() {
        let set = BTreeSet::from([
            FixIt::insert(LineCol::new(4, 0), ";"),
            FixIt::new(LineCol::new(1, 2), 3, "nullptr"),
            FixIt::insert(LineCol::new(1, 0), "#include <cstddef>\n"),
        ]);
        let starts: Vec<_> = set.iter().map(|f| f.start).collect();

        assert_eq!(
            starts,
            vec![LineCol::new(1, 0), LineCol::new(1, 2), LineCol::new(4, 0)]
        );
    }
}
