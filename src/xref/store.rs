//! Cross-reference store: the indexes the indexing service fills and queries.
//!
//! ## Key Data Structures
//!
//! - [`IndexBatch`] - Everything one translation unit reports for a file
//! - [`CrossRefStore`] - Shared store; writers ingest/purge, readers query
//! - [`StoreView`] - A consistent read snapshot of every index
//!
//! Records live once in a [`SymbolArena`]; symbol-by-location maps a
//! location to its handle and the name/USR indexes map strings to
//! locations, so amending a record is seen through every index.
//!
//! All per-file state is either keyed by `FileId` or by `Location` in an
//! ordered map, where one file's entries are a contiguous range. That is
//! what lets [`CrossRefStore::purge_file`] remove exactly one file's
//! contributions. Fix-its and diagnostics are per-compilation output, so
//! they also remember which unit reported them and go away with it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::diagnostics::{Diagnostic, FixIt};
use super::ids::{SymbolArena, SymbolHandle};
use super::resolve::{CandidateSet, best_target};
use super::symbols::{SymbolInfo, TargetWeight};
use crate::base::{FileId, FileRegistry, Location};

// ============================================================================
// INDEX BATCH
// ============================================================================

/// One translation unit's result for a file, ready to be merged.
///
/// Occurrences located in other files (headers) are merged into existing
/// records; everything else attributed to `file` replaces what the store
/// held for it.
#[derive(Clone, Debug, Default)]
pub struct IndexBatch {
    pub file: FileId,
    pub occurrences: Vec<(Location, SymbolInfo)>,
    /// Use site → candidate targets.
    pub references: Vec<(Location, CandidateSet)>,
    /// Files whose content this file's result depends on.
    pub dependencies: BTreeSet<FileId>,
    pub fixits: BTreeMap<FileId, BTreeSet<FixIt>>,
    pub diagnostics: Vec<(Location, Diagnostic)>,
    /// The unit failed to parse; its own-file symbols are kept apart in
    /// the error-symbol partition until a clean result replaces them.
    pub salvaged: bool,
}

impl IndexBatch {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }

    pub fn occurrence(mut self, location: Location, info: SymbolInfo) -> Self {
        self.occurrences.push((location, info));
        self
    }

    pub fn reference(
        mut self,
        location: Location,
        candidates: impl IntoIterator<Item = (Location, TargetWeight)>,
    ) -> Self {
        self.references
            .push((location, candidates.into_iter().collect()));
        self
    }

    pub fn dependency(mut self, file: FileId) -> Self {
        self.dependencies.insert(file);
        self
    }

    pub fn fixit(mut self, file: FileId, fixit: FixIt) -> Self {
        self.fixits.entry(file).or_default().insert(fixit);
        self
    }

    pub fn diagnostic(mut self, location: Location, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push((location, diagnostic));
        self
    }

    pub fn salvaged(mut self) -> Self {
        self.salvaged = true;
        self
    }
}

/// What an ingest did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub file: FileId,
    /// The batch's own file id did not resolve; nothing was applied.
    pub skipped: bool,
    pub symbols_added: usize,
    pub symbols_amended: usize,
    pub salvaged_symbols: usize,
    pub references: usize,
    /// Entries discarded for naming unknown files or use sites without a
    /// symbol record.
    pub dropped: usize,
}

/// Entry counts per index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub symbols: usize,
    pub error_symbols: usize,
    pub symbol_names: usize,
    pub usrs: usize,
    pub references: usize,
    pub dependencies: usize,
    pub fixits: usize,
    pub diagnostics: usize,
}

/// A broken internal invariant. Seeing one is a bug in the store, not a
/// condition callers are expected to handle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("null location in {index}")]
    NullLocation { index: &'static str },

    #[error("{location} points at a removed record")]
    DanglingHandle { location: Location },

    #[error("arena holds {live} records but the indexes reference {indexed}")]
    ArenaCountMismatch { live: usize, indexed: usize },

    #[error("error symbol {location} filed under {file}")]
    MisfiledErrorSymbol { file: FileId, location: Location },

    #[error("{index} entry `{key}` lists {location}, whose record disagrees")]
    StaleEntry {
        index: &'static str,
        key: SmolStr,
        location: Location,
    },

    #[error("record at {location} is missing from {index} under `{key}`")]
    MissingEntry {
        index: &'static str,
        key: SmolStr,
        location: Location,
    },

    #[error("reference at {location} has no symbol record")]
    ReferenceWithoutSymbol { location: Location },

    #[error("empty set left in {index}")]
    EmptySet { index: &'static str },
}

// ============================================================================
// INNER STATE
// ============================================================================

#[derive(Debug, Default)]
struct StoreInner {
    arena: SymbolArena,
    symbols: BTreeMap<Location, SymbolHandle>,
    symbol_names: FxHashMap<SmolStr, BTreeSet<Location>>,
    references: BTreeMap<Location, CandidateSet>,
    usrs: FxHashMap<SmolStr, BTreeSet<Location>>,
    dependencies: FxHashMap<FileId, BTreeSet<FileId>>,
    /// Target file → fix-it → units that reported it.
    fixits: FxHashMap<FileId, BTreeMap<FixIt, BTreeSet<FileId>>>,
    /// Location → (reporting unit, diagnostic).
    diagnostics: BTreeMap<Location, (FileId, Diagnostic)>,
    error_symbols: FxHashMap<FileId, BTreeMap<Location, SymbolHandle>>,
}

fn keys_in_file<V>(map: &BTreeMap<Location, V>, file: FileId) -> Vec<Location> {
    map.range(Location::file_range(file))
        .map(|(loc, _)| *loc)
        .collect()
}

fn add_to_set(map: &mut FxHashMap<SmolStr, BTreeSet<Location>>, key: &SmolStr, loc: Location) {
    map.entry(key.clone()).or_default().insert(loc);
}

fn remove_from_set(map: &mut FxHashMap<SmolStr, BTreeSet<Location>>, key: &SmolStr, loc: Location) {
    if let Some(set) = map.get_mut(key) {
        set.remove(&loc);
        if set.is_empty() {
            map.remove(key);
        }
    }
}

impl StoreInner {
    fn handle_at(&self, loc: &Location) -> Option<SymbolHandle> {
        self.symbols
            .get(loc)
            .or_else(|| self.error_symbols.get(&loc.file())?.get(loc))
            .copied()
    }

    fn record(&self, loc: &Location) -> Option<&SymbolInfo> {
        self.handle_at(loc).and_then(|h| self.arena.get(h))
    }

    fn index_record(&mut self, loc: Location, info: &SymbolInfo) {
        if let Some(name) = &info.symbol_name {
            add_to_set(&mut self.symbol_names, name, loc);
        }
        if let Some(usr) = &info.usr {
            add_to_set(&mut self.usrs, usr, loc);
        }
    }

    fn unindex_record(&mut self, loc: Location, info: &SymbolInfo) {
        if let Some(name) = &info.symbol_name {
            remove_from_set(&mut self.symbol_names, name, loc);
        }
        if let Some(usr) = &info.usr {
            remove_from_set(&mut self.usrs, usr, loc);
        }
    }

    /// Remove every entry attributed to `file`. Returns the number of
    /// symbol records dropped.
    fn purge(&mut self, file: FileId) -> usize {
        let mut removed = 0;

        for loc in keys_in_file(&self.symbols, file) {
            let Some(handle) = self.symbols.remove(&loc) else {
                continue;
            };
            if let Some(info) = self.arena.remove(handle) {
                self.unindex_record(loc, &info);
                removed += 1;
            }
        }

        if let Some(errors) = self.error_symbols.remove(&file) {
            for handle in errors.into_values() {
                if self.arena.remove(handle).is_some() {
                    removed += 1;
                }
            }
        }

        // Candidate sets of other files may still point into `file`; they
        // belong to those files and are refreshed when they are re-indexed.
        for loc in keys_in_file(&self.references, file) {
            self.references.remove(&loc);
        }

        // Positions inside a purged file are stale whoever reported them.
        for loc in keys_in_file(&self.diagnostics, file) {
            self.diagnostics.remove(&loc);
        }
        self.diagnostics.retain(|_, (source, _)| *source != file);

        self.fixits.remove(&file);
        self.fixits.retain(|_, fixits| {
            fixits.retain(|_, sources| {
                sources.remove(&file);
                !sources.is_empty()
            });
            !fixits.is_empty()
        });

        self.dependencies.remove(&file);

        removed
    }

    /// Amend the record behind `handle`, indexing any name or USR it gains.
    fn amend(&mut self, handle: SymbolHandle, loc: Location, info: &SymbolInfo) -> bool {
        let Some(existing) = self.arena.get_mut(handle) else {
            return false;
        };
        let had_name = existing.symbol_name.is_some();
        let had_usr = existing.usr.is_some();
        if !existing.unite(info) {
            return false;
        }

        let gained_name = existing.symbol_name.clone().filter(|_| !had_name);
        let gained_usr = existing.usr.clone().filter(|_| !had_usr);
        if let Some(name) = gained_name {
            add_to_set(&mut self.symbol_names, &name, loc);
        }
        if let Some(usr) = gained_usr {
            add_to_set(&mut self.usrs, &usr, loc);
        }
        tracing::trace!(%loc, "amended symbol record");
        true
    }

    fn merge(&mut self, batch: IndexBatch, summary: &mut IngestSummary) {
        let file = batch.file;

        for (loc, info) in batch.occurrences {
            if batch.salvaged && loc.file() == file {
                let errors = self.error_symbols.entry(file).or_default();
                match errors.get(&loc).copied() {
                    Some(handle) => {
                        if let Some(existing) = self.arena.get_mut(handle) {
                            existing.unite(&info);
                        }
                    }
                    None => {
                        errors.insert(loc, self.arena.insert(info));
                    }
                }
                summary.salvaged_symbols += 1;
                continue;
            }

            match self.symbols.get(&loc).copied() {
                Some(handle) => {
                    if self.amend(handle, loc, &info) {
                        summary.symbols_amended += 1;
                    }
                }
                None => {
                    self.index_record(loc, &info);
                    let handle = self.arena.insert(info);
                    self.symbols.insert(loc, handle);
                    summary.symbols_added += 1;
                }
            }
        }

        for (use_site, candidates) in batch.references {
            if self.record(&use_site).is_none() {
                tracing::warn!(%use_site, "dropping reference without a symbol record");
                summary.dropped += 1;
                continue;
            }
            let entry = self.references.entry(use_site).or_default();
            for (target, weight) in candidates {
                entry
                    .entry(target)
                    .and_modify(|existing| {
                        if weight.definition && !existing.definition {
                            *existing = weight;
                        }
                    })
                    .or_insert(weight);
            }
            summary.references += 1;
        }

        if !batch.dependencies.is_empty() {
            self.dependencies
                .entry(file)
                .or_default()
                .extend(batch.dependencies);
        }

        for (fixit_file, fixits) in batch.fixits {
            for fixit in fixits {
                self.fixits
                    .entry(fixit_file)
                    .or_default()
                    .entry(fixit)
                    .or_default()
                    .insert(file);
            }
        }

        // Last diagnostic reported at a location wins.
        self.diagnostics.extend(
            batch
                .diagnostics
                .into_iter()
                .map(|(loc, diagnostic)| (loc, (file, diagnostic))),
        );
    }

    fn check_set_index(
        &self,
        index: &'static str,
        map: &FxHashMap<SmolStr, BTreeSet<Location>>,
        key_of: fn(&SymbolInfo) -> Option<&SmolStr>,
        out: &mut Vec<InvariantViolation>,
    ) {
        for (key, locations) in map {
            if locations.is_empty() {
                out.push(InvariantViolation::EmptySet { index });
            }
            for &location in locations {
                let matches = self
                    .symbols
                    .get(&location)
                    .and_then(|&h| self.arena.get(h))
                    .is_some_and(|info| key_of(info) == Some(key));
                if !matches {
                    out.push(InvariantViolation::StaleEntry {
                        index,
                        key: key.clone(),
                        location,
                    });
                }
            }
        }
        for (&location, &handle) in &self.symbols {
            let Some(key) = self.arena.get(handle).and_then(key_of) else {
                continue;
            };
            if !map.get(key).is_some_and(|set| set.contains(&location)) {
                out.push(InvariantViolation::MissingEntry {
                    index,
                    key: key.clone(),
                    location,
                });
            }
        }
    }

    fn invariant_violations(&self) -> Vec<InvariantViolation> {
        let mut out = Vec::new();

        for (&location, &handle) in &self.symbols {
            if location.is_null() {
                out.push(InvariantViolation::NullLocation { index: "symbols" });
            }
            if self.arena.get(handle).is_none() {
                out.push(InvariantViolation::DanglingHandle { location });
            }
        }

        let mut indexed = self.symbols.len();
        for (&file, errors) in &self.error_symbols {
            if errors.is_empty() {
                out.push(InvariantViolation::EmptySet { index: "error symbols" });
            }
            indexed += errors.len();
            for (&location, &handle) in errors {
                if location.file() != file || file.is_null() {
                    out.push(InvariantViolation::MisfiledErrorSymbol { file, location });
                }
                if self.arena.get(handle).is_none() {
                    out.push(InvariantViolation::DanglingHandle { location });
                }
            }
        }
        if indexed != self.arena.len() {
            out.push(InvariantViolation::ArenaCountMismatch {
                live: self.arena.len(),
                indexed,
            });
        }

        self.check_set_index(
            "symbol names",
            &self.symbol_names,
            |info| info.symbol_name.as_ref(),
            &mut out,
        );
        self.check_set_index("usrs", &self.usrs, |info| info.usr.as_ref(), &mut out);

        for (&location, candidates) in &self.references {
            if location.is_null() {
                out.push(InvariantViolation::NullLocation { index: "references" });
            }
            if self.record(&location).is_none() {
                out.push(InvariantViolation::ReferenceWithoutSymbol { location });
            }
            if candidates.is_empty() {
                out.push(InvariantViolation::EmptySet { index: "references" });
            }
            if candidates.keys().any(|target| target.is_null()) {
                out.push(InvariantViolation::NullLocation { index: "reference targets" });
            }
        }

        for (file, deps) in &self.dependencies {
            if file.is_null() || deps.iter().any(|d| d.is_null()) {
                out.push(InvariantViolation::NullLocation { index: "dependencies" });
            }
            if deps.is_empty() {
                out.push(InvariantViolation::EmptySet { index: "dependencies" });
            }
        }

        for (file, fixits) in &self.fixits {
            if file.is_null() {
                out.push(InvariantViolation::NullLocation { index: "fixits" });
            }
            if fixits.is_empty() {
                out.push(InvariantViolation::EmptySet { index: "fixits" });
            }
            for sources in fixits.values() {
                if sources.is_empty() {
                    out.push(InvariantViolation::EmptySet { index: "fixit sources" });
                }
                if sources.iter().any(|source| source.is_null()) {
                    out.push(InvariantViolation::NullLocation { index: "fixit sources" });
                }
            }
        }

        for (loc, (source, _)) in &self.diagnostics {
            if loc.is_null() || source.is_null() {
                out.push(InvariantViolation::NullLocation { index: "diagnostics" });
            }
        }

        out
    }

    fn assert_invariants(&self, after: &str) {
        if cfg!(debug_assertions) {
            let violations = self.invariant_violations();
            assert!(
                violations.is_empty(),
                "cross-reference store invariants broken after {after}: {violations:?}"
            );
        }
    }
}

/// Drop entries naming files the registry cannot resolve.
///
/// Returns `None` when the batch's own file does not resolve.
fn prepare(mut batch: IndexBatch, registry: &dyn FileRegistry) -> Option<(IndexBatch, usize)> {
    if batch.file.is_null() || !registry.contains(batch.file) {
        tracing::warn!(file = %batch.file, "skipping batch for unregistered file");
        return None;
    }

    let mut dropped = 0;
    let mut resolves = |file: FileId| {
        let ok = !file.is_null() && registry.contains(file);
        if !ok {
            dropped += 1;
        }
        ok
    };

    batch.occurrences.retain(|(loc, _)| resolves(loc.file()));
    batch.references.retain_mut(|(loc, candidates)| {
        if !resolves(loc.file()) {
            return false;
        }
        candidates.retain(|target, _| resolves(target.file()));
        !candidates.is_empty()
    });
    batch.dependencies.retain(|&dep| resolves(dep));
    batch.fixits.retain(|&fixit_file, _| resolves(fixit_file));
    batch.diagnostics.retain(|(loc, _)| resolves(loc.file()));

    if dropped > 0 {
        tracing::warn!(file = %batch.file, dropped, "dropped entries naming unregistered files");
    }
    Some((batch, dropped))
}

// ============================================================================
// STORE
// ============================================================================

/// The shared cross-reference store.
///
/// Every mutation (purge, or purge-then-merge for an ingest) runs inside
/// one exclusive section, and every query runs against a [`StoreView`]
/// holding a shared lock, so a reader never sees a file half replaced.
/// Batch validation happens before the lock is taken.
pub struct CrossRefStore {
    registry: Arc<dyn FileRegistry>,
    inner: RwLock<StoreInner>,
}

impl CrossRefStore {
    pub fn new(registry: Arc<dyn FileRegistry>) -> Self {
        Self {
            registry,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub fn registry(&self) -> &dyn FileRegistry {
        self.registry.as_ref()
    }

    /// Take a read snapshot. Hold it only for the duration of one query;
    /// writers wait until it is dropped.
    pub fn read(&self) -> StoreView<'_> {
        StoreView {
            inner: self.inner.read(),
        }
    }

    /// Remove every entry attributed to `file` from every index.
    pub fn purge_file(&self, file: FileId) -> usize {
        let mut inner = self.inner.write();
        let removed = inner.purge(file);
        inner.assert_invariants("purge");
        tracing::debug!(%file, removed, "purged file");
        removed
    }

    /// Replace `batch.file`'s contributions with `batch`.
    pub fn ingest(&self, batch: IndexBatch) -> IngestSummary {
        let file = batch.file;
        let Some((batch, dropped)) = prepare(batch, self.registry()) else {
            return IngestSummary {
                file,
                skipped: true,
                ..IngestSummary::default()
            };
        };

        let mut inner = self.inner.write();
        apply(&mut inner, batch, dropped)
    }

    /// Ingest several batches. Validation runs in parallel; the batches
    /// are then applied in order within one exclusive section.
    pub fn ingest_many(&self, batches: Vec<IndexBatch>) -> Vec<IngestSummary> {
        let registry = self.registry();
        let prepared: Vec<_> = batches
            .into_par_iter()
            .map(|batch| {
                let file = batch.file;
                (file, prepare(batch, registry))
            })
            .collect();

        let mut inner = self.inner.write();
        prepared
            .into_iter()
            .map(|(file, prepared)| match prepared {
                Some((batch, dropped)) => apply(&mut inner, batch, dropped),
                None => IngestSummary {
                    file,
                    skipped: true,
                    ..IngestSummary::default()
                },
            })
            .collect()
    }

    /// Best target of the reference at `location`, or [`Location::NULL`].
    pub fn lookup_best_target(&self, location: Location) -> Location {
        self.read().best_target(location)
    }

    /// Copy of the record at `location`.
    pub fn symbol_at(&self, location: Location) -> Option<SymbolInfo> {
        self.read().symbol_at(location).cloned()
    }

    pub fn stats(&self) -> StoreStats {
        self.read().stats()
    }
}

fn apply(inner: &mut StoreInner, batch: IndexBatch, dropped: usize) -> IngestSummary {
    let mut summary = IngestSummary {
        file: batch.file,
        dropped,
        ..IngestSummary::default()
    };
    let purged = inner.purge(batch.file);
    inner.merge(batch, &mut summary);
    inner.assert_invariants("ingest");
    tracing::debug!(
        file = %summary.file,
        purged,
        added = summary.symbols_added,
        amended = summary.symbols_amended,
        salvaged = summary.salvaged_symbols,
        references = summary.references,
        dropped = summary.dropped,
        "ingested file"
    );
    summary
}

impl fmt::Debug for CrossRefStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossRefStore")
            .field("stats", &self.stats())
            .finish()
    }
}

// ============================================================================
// READ VIEW
// ============================================================================

/// A consistent snapshot of the store for one or more queries.
pub struct StoreView<'a> {
    inner: RwLockReadGuard<'a, StoreInner>,
}

impl StoreView<'_> {
    /// Record at `location`, falling back to salvaged error symbols.
    pub fn symbol_at(&self, location: Location) -> Option<&SymbolInfo> {
        self.inner.record(&location)
    }

    /// Records located in `file`, in location order.
    pub fn symbols_in_file(&self, file: FileId) -> Vec<(Location, &SymbolInfo)> {
        self.inner
            .symbols
            .range(Location::file_range(file))
            .filter_map(|(&loc, &h)| Some((loc, self.inner.arena.get(h)?)))
            .collect()
    }

    /// Salvaged records of a file that failed to parse.
    pub fn error_symbols_for(&self, file: FileId) -> Vec<(Location, &SymbolInfo)> {
        self.inner
            .error_symbols
            .get(&file)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|(&loc, &h)| Some((loc, self.inner.arena.get(h)?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn candidates_at(&self, location: Location) -> Option<&CandidateSet> {
        self.inner.references.get(&location)
    }

    /// Canonical target of the reference at `location`.
    pub fn best_target(&self, location: Location) -> Location {
        self.candidates_at(location)
            .map_or(Location::NULL, |candidates| best_target(candidates))
    }

    /// Use sites that list `target` among their candidates.
    pub fn find_references(&self, target: Location) -> Vec<Location> {
        self.inner
            .references
            .iter()
            .filter(|(_, candidates)| candidates.contains_key(&target))
            .map(|(&loc, _)| loc)
            .collect()
    }

    pub fn symbols_named(&self, name: &str) -> Vec<Location> {
        self.inner
            .symbol_names
            .get(name)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// All occurrences merged under one USR, across translation units.
    pub fn usr_locations(&self, usr: &str) -> Vec<Location> {
        self.inner
            .usrs
            .get(usr)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// First definition among the USR's occurrences.
    pub fn definition_of_usr(&self, usr: &str) -> Option<Location> {
        self.inner.usrs.get(usr)?.iter().copied().find(|loc| {
            self.inner
                .record(loc)
                .is_some_and(|info| info.definition)
        })
    }

    pub fn dependencies_of(&self, file: FileId) -> Vec<FileId> {
        self.inner
            .dependencies
            .get(&file)
            .map(|deps| deps.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Files whose result depends on `file`; these go stale with it.
    pub fn dependents_of(&self, file: FileId) -> Vec<FileId> {
        let mut out: Vec<_> = self
            .inner
            .dependencies
            .iter()
            .filter(|(_, deps)| deps.contains(&file))
            .map(|(&dependent, _)| dependent)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn fixits_for(&self, file: FileId) -> Vec<FixIt> {
        self.inner
            .fixits
            .get(&file)
            .map(|fixits| fixits.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn diagnostics_for(&self, file: FileId) -> Vec<(Location, &Diagnostic)> {
        self.inner
            .diagnostics
            .range(Location::file_range(file))
            .map(|(&loc, (_, diag))| (loc, diag))
            .collect()
    }

    /// Every file with at least one entry in any index.
    pub fn files(&self) -> BTreeSet<FileId> {
        let inner = &*self.inner;
        inner
            .symbols
            .keys()
            .chain(inner.references.keys())
            .chain(inner.diagnostics.keys())
            .map(|loc| loc.file())
            .chain(inner.error_symbols.keys().copied())
            .chain(inner.dependencies.keys().copied())
            .chain(inner.fixits.keys().copied())
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        let inner = &*self.inner;
        StoreStats {
            symbols: inner.symbols.len(),
            error_symbols: inner.error_symbols.values().map(BTreeMap::len).sum(),
            symbol_names: inner.symbol_names.len(),
            usrs: inner.usrs.len(),
            references: inner.references.len(),
            dependencies: inner.dependencies.len(),
            fixits: inner.fixits.values().map(BTreeMap::len).sum(),
            diagnostics: inner.diagnostics.len(),
        }
    }

    /// Audit the internal consistency of every index.
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        self.inner.invariant_violations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xref::{FileSet, Severity, SymbolKind};
    use crate::base::LineCol;
    use std::path::Path;

    struct Fixture {
        store: CrossRefStore,
        main: FileId,
        header: FileId,
        other: FileId,
    }

    fn fixture() -> Fixture {
        let files = Arc::new(FileSet::new());
        let main = files.intern(Path::new("/src/main.cpp"));
        let header = files.intern(Path::new("/src/widget.h"));
        let other = files.intern(Path::new("/src/other.cpp"));
        Fixture {
            store: CrossRefStore::new(files),
            main,
            header,
            other,
        }
    }

    fn loc(file: FileId, line: u32, col: u32) -> Location {
        Location::new(file, line, col)
    }

    /// `main.cpp` constructs a `Widget` declared in `widget.h`.
    fn main_batch(f: &Fixture) -> IndexBatch {
        let class_decl = loc(f.header, 2, 6);
        let ctor_decl = loc(f.header, 4, 4);
        let use_site = loc(f.main, 10, 4);
        IndexBatch::new(f.main)
            .occurrence(
                class_decl,
                SymbolInfo::new(SymbolKind::ClassDecl)
                    .definition()
                    .with_name("Widget")
                    .with_usr("c:@S@Widget"),
            )
            .occurrence(
                ctor_decl,
                SymbolInfo::new(SymbolKind::Constructor)
                    .with_name("Widget")
                    .with_usr("c:@S@Widget@F@Widget#"),
            )
            .occurrence(
                use_site,
                SymbolInfo::new(SymbolKind::CallExpr).with_name("Widget"),
            )
            .reference(
                use_site,
                [
                    (class_decl, TargetWeight::definition(SymbolKind::ClassDecl)),
                    (ctor_decl, TargetWeight::declaration(SymbolKind::Constructor)),
                ],
            )
            .dependency(f.header)
            .fixit(f.main, FixIt::insert(LineCol::new(10, 20), ";"))
            .diagnostic(
                loc(f.main, 10, 20),
                Diagnostic::error("expected ';' after expression"),
            )
    }

    #[test]
    fn test_ingest_populates_every_index() {
        let f = fixture();
        let summary = f.store.ingest(main_batch(&f));

        assert_eq!(summary.symbols_added, 3);
        assert_eq!(summary.references, 1);
        assert_eq!(summary.dropped, 0);
        assert!(!summary.skipped);

        let view = f.store.read();
        assert_eq!(view.symbols_named("Widget").len(), 3);
        assert_eq!(view.usr_locations("c:@S@Widget"), vec![loc(f.header, 2, 6)]);
        assert_eq!(view.dependencies_of(f.main), vec![f.header]);
        assert_eq!(view.dependents_of(f.header), vec![f.main]);
        assert_eq!(view.fixits_for(f.main).len(), 1);
        assert_eq!(view.diagnostics_for(f.main)[0].1.severity, Severity::Error);
        assert!(view.invariant_violations().is_empty());
    }

    #[test]
    fn test_lookup_prefers_constructor_over_class() {
        let f = fixture();
        f.store.ingest(main_batch(&f));

        assert_eq!(
            f.store.lookup_best_target(loc(f.main, 10, 4)),
            loc(f.header, 4, 4)
        );
        assert_eq!(f.store.lookup_best_target(loc(f.main, 99, 0)), Location::NULL);
    }

    #[test]
    fn test_find_references() {
        let f = fixture();
        f.store.ingest(main_batch(&f));

        let view = f.store.read();
        assert_eq!(view.find_references(loc(f.header, 4, 4)), vec![loc(f.main, 10, 4)]);
        assert!(view.find_references(loc(f.header, 9, 9)).is_empty());
    }

    #[test]
    fn test_second_unit_amends_header_record() {
        let f = fixture();
        f.store.ingest(main_batch(&f));

        // other.cpp sees the constructor's definition in the same header.
        let ctor = loc(f.header, 4, 4);
        let summary = f.store.ingest(
            IndexBatch::new(f.other).occurrence(
                ctor,
                SymbolInfo::new(SymbolKind::Constructor)
                    .definition()
                    .with_type("void ()"),
            ),
        );

        assert_eq!(summary.symbols_added, 0);
        assert_eq!(summary.symbols_amended, 1);

        let record = f.store.symbol_at(ctor).unwrap();
        assert!(record.definition);
        assert_eq!(record.type_name.as_deref(), Some("void ()"));
        assert_eq!(record.usr.as_deref(), Some("c:@S@Widget@F@Widget#"));
        assert_eq!(
            f.store.read().definition_of_usr("c:@S@Widget@F@Widget#"),
            Some(ctor)
        );
    }

    #[test]
    fn test_amend_indexes_gained_usr() {
        let f = fixture();
        let site = loc(f.header, 1, 0);
        f.store
            .ingest(IndexBatch::new(f.main).occurrence(site, SymbolInfo::new(SymbolKind::VarDecl)));
        f.store.ingest(
            IndexBatch::new(f.other).occurrence(
                site,
                SymbolInfo::new(SymbolKind::VarDecl).with_name("g").with_usr("c:@g"),
            ),
        );

        let view = f.store.read();
        assert_eq!(view.usr_locations("c:@g"), vec![site]);
        assert_eq!(view.symbols_named("g"), vec![site]);
        assert!(view.invariant_violations().is_empty());
    }

    #[test]
    fn test_purge_removes_only_that_file() {
        let f = fixture();
        f.store.ingest(main_batch(&f));

        let removed = f.store.purge_file(f.main);
        assert_eq!(removed, 1); // the use site; header records stay

        let view = f.store.read();
        assert!(view.symbol_at(loc(f.main, 10, 4)).is_none());
        assert!(view.candidates_at(loc(f.main, 10, 4)).is_none());
        assert!(view.dependencies_of(f.main).is_empty());
        assert!(view.fixits_for(f.main).is_empty());
        assert!(view.diagnostics_for(f.main).is_empty());
        assert_eq!(view.symbols_named("Widget").len(), 2);
        assert!(view.symbol_at(loc(f.header, 2, 6)).is_some());
        assert!(view.invariant_violations().is_empty());
    }

    #[test]
    fn test_reindexing_target_file_keeps_other_files_references() {
        let f = fixture();
        f.store.ingest(main_batch(&f));
        let use_site = loc(f.main, 10, 4);
        let before = f.store.read().candidates_at(use_site).cloned();

        f.store.purge_file(f.header);
        {
            let view = f.store.read();
            assert_eq!(view.candidates_at(use_site).cloned(), before);
            assert!(view.usr_locations("c:@S@Widget").is_empty());
            assert!(view.invariant_violations().is_empty());
        }

        let ctor = loc(f.header, 4, 4);
        f.store.ingest(
            IndexBatch::new(f.header).occurrence(
                ctor,
                SymbolInfo::new(SymbolKind::Constructor)
                    .with_name("Widget")
                    .with_usr("c:@S@Widget@F@Widget#"),
            ),
        );

        let view = f.store.read();
        assert_eq!(view.candidates_at(use_site).cloned(), before);
        assert_eq!(view.best_target(use_site), ctor);
        assert!(view.symbol_at(ctor).is_some());
        assert_eq!(view.dependencies_of(f.main), vec![f.header]);
        assert!(view.invariant_violations().is_empty());
    }

    #[test]
    fn test_reported_fixits_and_diagnostics_leave_with_their_unit() {
        let f = fixture();
        let semicolon = FixIt::insert(LineCol::new(1, 0), ";");
        let header_error = loc(f.header, 1, 1);

        f.store.ingest(
            IndexBatch::new(f.main)
                .fixit(f.header, semicolon.clone())
                .diagnostic(header_error, Diagnostic::error("missing ;")),
        );
        f.store.ingest(IndexBatch::new(f.other).fixit(f.header, semicolon.clone()));
        assert_eq!(f.store.read().diagnostics_for(f.header).len(), 1);

        // main.cpp now compiles cleanly; other.cpp still reports the fix-it.
        f.store.ingest(IndexBatch::new(f.main));
        {
            let view = f.store.read();
            assert!(view.diagnostics_for(f.header).is_empty());
            assert_eq!(view.fixits_for(f.header), vec![semicolon.clone()]);
        }

        f.store.ingest(IndexBatch::new(f.other));
        let view = f.store.read();
        assert!(view.fixits_for(f.header).is_empty());
        assert_eq!(view.stats().fixits, 0);
        assert!(view.files().is_empty());
        assert!(view.invariant_violations().is_empty());
    }

    #[test]
    fn test_reingest_does_not_accumulate_fixits() {
        let f = fixture();
        for col in 0..3 {
            f.store.ingest(
                IndexBatch::new(f.main).fixit(f.header, FixIt::insert(LineCol::new(7, col), ";")),
            );
        }

        assert_eq!(
            f.store.read().fixits_for(f.header),
            vec![FixIt::insert(LineCol::new(7, 2), ";")]
        );
    }

    #[test]
    fn test_reingest_replaces_previous_contribution() {
        let f = fixture();
        f.store.ingest(main_batch(&f));

        let moved = loc(f.main, 12, 4);
        f.store.ingest(
            IndexBatch::new(f.main)
                .occurrence(moved, SymbolInfo::new(SymbolKind::CallExpr).with_name("Widget"))
                .reference(
                    moved,
                    [(loc(f.header, 4, 4), TargetWeight::declaration(SymbolKind::Constructor))],
                ),
        );

        let view = f.store.read();
        assert!(view.symbol_at(loc(f.main, 10, 4)).is_none());
        assert_eq!(view.best_target(moved), loc(f.header, 4, 4));
        assert!(view.diagnostics_for(f.main).is_empty());
        assert!(view.dependencies_of(f.main).is_empty());
    }

    #[test]
    fn test_salvaged_symbols_are_isolated_then_replaced() {
        let f = fixture();
        let site = loc(f.main, 3, 0);
        let summary = f.store.ingest(
            IndexBatch::new(f.main)
                .occurrence(site, SymbolInfo::new(SymbolKind::FunctionDecl).with_name("half"))
                .salvaged(),
        );
        assert_eq!(summary.salvaged_symbols, 1);

        {
            let view = f.store.read();
            assert!(view.symbol_at(site).is_some());
            assert!(view.symbols_in_file(f.main).is_empty());
            assert!(view.symbols_named("half").is_empty());
            assert_eq!(view.error_symbols_for(f.main).len(), 1);
        }

        f.store.ingest(
            IndexBatch::new(f.main)
                .occurrence(site, SymbolInfo::new(SymbolKind::FunctionDecl).definition().with_name("whole")),
        );

        let view = f.store.read();
        assert!(view.error_symbols_for(f.main).is_empty());
        assert_eq!(view.symbols_named("whole"), vec![site]);
        assert_eq!(view.stats().error_symbols, 0);
    }

    #[test]
    fn test_unregistered_files_are_dropped() {
        let f = fixture();
        let stray = FileId::new(999);

        let skipped = f.store.ingest(IndexBatch::new(stray));
        assert!(skipped.skipped);

        let summary = f.store.ingest(
            IndexBatch::new(f.main)
                .occurrence(loc(stray, 0, 0), SymbolInfo::new(SymbolKind::VarDecl))
                .occurrence(loc(f.main, 0, 0), SymbolInfo::new(SymbolKind::DeclRefExpr))
                .reference(
                    loc(f.main, 0, 0),
                    [
                        (loc(stray, 1, 0), TargetWeight::declaration(SymbolKind::VarDecl)),
                        (loc(f.header, 1, 0), TargetWeight::declaration(SymbolKind::VarDecl)),
                    ],
                )
                .dependency(stray),
        );

        assert_eq!(summary.dropped, 3);
        let view = f.store.read();
        assert!(view.symbol_at(loc(stray, 0, 0)).is_none());
        assert_eq!(
            view.candidates_at(loc(f.main, 0, 0)).map(|c| c.len()),
            Some(1)
        );
        assert!(!view.files().contains(&stray));
    }

    #[test]
    fn test_reference_without_use_site_record_is_dropped() {
        let f = fixture();
        let summary = f.store.ingest(IndexBatch::new(f.main).reference(
            loc(f.main, 5, 5),
            [(loc(f.header, 1, 0), TargetWeight::declaration(SymbolKind::VarDecl))],
        ));

        assert_eq!(summary.references, 0);
        assert_eq!(summary.dropped, 1);
        assert_eq!(f.store.stats().references, 0);
    }

    #[test]
    fn test_ingest_many_applies_all_batches() {
        let f = fixture();
        let summaries = f.store.ingest_many(vec![
            main_batch(&f),
            IndexBatch::new(FileId::new(404)),
            IndexBatch::new(f.other)
                .occurrence(loc(f.other, 1, 0), SymbolInfo::new(SymbolKind::VarDecl).with_name("x")),
        ]);

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].file, f.main);
        assert!(summaries[1].skipped);
        assert_eq!(summaries[2].symbols_added, 1);
        assert_eq!(
            f.store.read().files(),
            BTreeSet::from([f.main, f.header, f.other])
        );
    }
}
