//! # crossref-base
//!
//! Cross-reference resolution core for a source-code indexing service.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → storage naming, daemon connection settings
//!   ↓
//! xref    → occurrence records, cross-reference store, best-target ranking
//!   ↓
//! base    → Primitives (FileId, Location, path codec)
//! ```
//!
//! The parse front-end, the indexing scheduler and the client/daemon
//! transport live outside this crate. They feed [`xref::CrossRefStore`]
//! with [`xref::IndexBatch`]es and query it for targets.

/// Foundation types: FileId, Location, path encoding
pub mod base;

/// Crate error types
pub mod error;

/// Project storage layout and connection settings
pub mod project;

/// Cross-reference data model, store and target resolution
pub mod xref;

pub use base::{FileId, FileRegistry, LineCol, LineIndex, Location, TextRange, TextSize};
pub use error::{Error, InvalidPathError, Result};
pub use xref::{
    CandidateSet, CrossRefStore, IndexBatch, SymbolInfo, SymbolKind, TargetWeight, best_target,
    target_rank,
};
