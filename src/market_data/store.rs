//! Shared ticker store
//!
//! One slot per watchlist entry, indexed by watchlist position. The refresh
//! loop is the only writer; readers copy the whole array out under the lock
//! and render from their copy.

use std::collections::TryReserveError;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use super::ticker::{SymbolName, TickerRow};

/// Mutex-guarded array of the latest ticker rows
#[derive(Debug)]
pub struct TickerStore {
    rows: Mutex<Vec<TickerRow>>,
    len: usize,
}

impl TickerStore {
    /// Allocate one empty row per symbol
    pub fn new(symbols: &[SymbolName]) -> Result<Self, TryReserveError> {
        let mut rows = Vec::new();
        rows.try_reserve_exact(symbols.len())?;
        rows.extend(symbols.iter().copied().map(TickerRow::empty));
        Ok(Self::from_rows(rows))
    }

    /// Build a store from pre-filled rows
    pub fn from_rows(rows: Vec<TickerRow>) -> Self {
        let len = rows.len();
        Self {
            rows: Mutex::new(rows),
            len,
        }
    }

    /// Number of slots; fixed for the lifetime of the store
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TickerRow>> {
        // A panic while holding the lock can only interrupt a plain copy, so
        // the rows are still whole values.
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the row at `origin_index` as one unit.
    ///
    /// Returns `false` when the index is out of range or the row belongs to a
    /// different symbol than the slot.
    pub fn publish(&self, origin_index: usize, row: TickerRow) -> bool {
        let mut rows = self.lock();
        match rows.get_mut(origin_index) {
            Some(slot) if slot.symbol == row.symbol => {
                *slot = row;
                true
            }
            Some(slot) => {
                warn!(
                    "Refusing to publish {} into slot {} owned by {}",
                    row.symbol, origin_index, slot.symbol
                );
                false
            }
            None => false,
        }
    }

    /// Publish every scratch row flagged as updated, under one lock acquisition.
    ///
    /// Returns how many rows were written.
    pub fn publish_updated(&self, scratch: &[TickerRow], updated: &[bool]) -> usize {
        let mut rows = self.lock();
        let mut written = 0;
        for (origin_index, slot) in rows.iter_mut().enumerate() {
            let fresh = updated.get(origin_index).copied().unwrap_or(false);
            if !fresh {
                continue;
            }
            if let Some(row) = scratch.get(origin_index) {
                if row.symbol == slot.symbol {
                    *slot = *row;
                    written += 1;
                }
            }
        }
        written
    }

    /// Copy the whole array into caller-owned memory
    pub fn snapshot_into(&self, dest: &mut Vec<TickerRow>) {
        let rows = self.lock();
        dest.clear();
        dest.extend_from_slice(&rows);
    }

    /// Copy of the row at `origin_index`
    pub fn row_at(&self, origin_index: usize) -> Option<TickerRow> {
        self.lock().get(origin_index).copied()
    }

    /// Symbol at `origin_index`, copied out so the lock is released immediately
    pub fn symbol_at(&self, origin_index: usize) -> Option<SymbolName> {
        self.lock().get(origin_index).map(|row| row.symbol)
    }

    /// Latest row for `symbol`, trying `origin_hint` before scanning
    pub fn find_row(&self, origin_hint: Option<usize>, symbol: &SymbolName) -> Option<TickerRow> {
        let rows = self.lock();
        if let Some(row) = origin_hint.and_then(|idx| rows.get(idx)) {
            if row.symbol == *symbol {
                return Some(*row);
            }
        }
        rows.iter().find(|row| row.symbol == *symbol).copied()
    }
}
