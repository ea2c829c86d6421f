//! Cross-reference model: occurrence records, the multi-index store, and
//! best-target resolution.
//!
//! - [`SymbolInfo`], [`SymbolKind`] - What the front-end reports per occurrence
//! - [`TargetWeight`], [`CandidateSet`] - Candidate targets of one reference
//! - [`CrossRefStore`] - Shared indexes, purged and re-filled per file
//! - [`best_target`] - Canonical target among candidates
//! - [`FileSet`] - In-memory [`FileRegistry`](crate::FileRegistry)

mod diagnostics;
mod ids;
mod resolve;
mod source;
mod store;
mod symbols;

pub use diagnostics::{Diagnostic, FixIt, Severity};
pub use ids::{SymbolArena, SymbolHandle};
pub use resolve::{CandidateSet, best_target, target_rank};
pub use source::FileSet;
pub use store::{
    CrossRefStore, IndexBatch, IngestSummary, InvariantViolation, StoreStats, StoreView,
};
pub use symbols::{SymbolInfo, SymbolKind, TargetWeight};
