//! Stable handles for occurrence records.

use std::fmt;

use super::symbols::SymbolInfo;

/// A handle to one [`SymbolInfo`] in a [`SymbolArena`].
///
/// Every index of the store holds handles (directly or through the
/// symbol-by-location map), never copies of the record, so amending a
/// record in place is seen by all of them. A handle stays valid until
/// its record is removed; freed slots are reused by later inserts.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolHandle(u32);

impl SymbolHandle {
    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolHandle({})", self.0)
    }
}

/// Slot storage for occurrence records addressed by [`SymbolHandle`].
#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    slots: Vec<Option<SymbolInfo>>,
    free: Vec<u32>,
    live: usize,
}

impl SymbolArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: SymbolInfo) -> SymbolHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(info);
            return SymbolHandle(index);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Some(info));
        SymbolHandle(index)
    }

    pub fn get(&self, handle: SymbolHandle) -> Option<&SymbolInfo> {
        self.slots.get(handle.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: SymbolHandle) -> Option<&mut SymbolInfo> {
        self.slots.get_mut(handle.0 as usize)?.as_mut()
    }

    /// Remove a record, freeing its slot for reuse.
    pub fn remove(&mut self, handle: SymbolHandle) -> Option<SymbolInfo> {
        let info = self.slots.get_mut(handle.0 as usize)?.take()?;
        self.free.push(handle.0);
        self.live -= 1;
        Some(info)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
