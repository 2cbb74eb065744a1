//! Snapshot & sort engine for the price board
//!
//! Each frame copies the shared store into a render-local snapshot, resets
//! the origin map to watchlist order and applies the active sort. Rows and
//! their origin entries always move together.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::market_data::{TickerRow, TickerStore};

/// Column the board is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Watchlist order
    #[default]
    None,
    Price,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

/// Active sort field and direction, changed only by user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    /// Three-state toggle: none -> descending -> ascending -> none
    pub fn cycle(&mut self, field: SortField) {
        if field == SortField::None {
            return;
        }
        if self.field != field {
            self.field = field;
            self.direction = SortDirection::Descending;
        } else if self.direction == SortDirection::Descending {
            self.direction = SortDirection::Ascending;
        } else {
            *self = SortState::default();
        }
    }

    /// What pressing the toggle for `field` would do next
    pub fn next_hint(&self, field: SortField) -> &'static str {
        if self.field != field {
            "↓"
        } else if self.direction == SortDirection::Descending {
            "↑"
        } else {
            "="
        }
    }

    fn key(&self, row: &TickerRow) -> OrderedFloat<f64> {
        match self.field {
            SortField::Price => OrderedFloat(row.price),
            SortField::Change => OrderedFloat(row.change_24h),
            SortField::None => OrderedFloat(0.0),
        }
    }

    /// Order two rows; equal keys fall back to watchlist order in both directions
    fn compare(&self, lhs: (&TickerRow, usize), rhs: (&TickerRow, usize)) -> Ordering {
        match self.key(lhs.0).cmp(&self.key(rhs.0)) {
            Ordering::Equal => lhs.1.cmp(&rhs.1),
            ord if self.direction == SortDirection::Descending => ord.reverse(),
            ord => ord,
        }
    }
}

/// Render-local copy of the ticker store plus the origin index of each row
#[derive(Debug, Default)]
pub struct PriceBoard {
    rows: Vec<TickerRow>,
    origin_index: Vec<usize>,
}

impl PriceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the store and restore watchlist order
    pub fn refresh_snapshot(&mut self, store: &TickerStore) {
        store.snapshot_into(&mut self.rows);
        self.origin_index.clear();
        self.origin_index.extend(0..self.rows.len());
    }

    /// Insertion sort over the snapshot; a no-op for [`SortField::None`]
    pub fn apply_sort(&mut self, sort: SortState) {
        if sort.field == SortField::None || self.rows.len() <= 1 {
            return;
        }
        for i in 1..self.rows.len() {
            let mut j = i;
            while j > 0
                && sort.compare(
                    (&self.rows[j - 1], self.origin_index[j - 1]),
                    (&self.rows[j], self.origin_index[j]),
                ) == Ordering::Greater
            {
                self.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.rows.swap(a, b);
        self.origin_index.swap(a, b);
    }

    /// Watchlist position of the row shown at `display_index`
    pub fn resolve_origin(&self, display_index: usize) -> Option<usize> {
        self.origin_index.get(display_index).copied()
    }

    /// Clamp a selection into the current row range
    pub fn clamp_selection(&self, selected: usize) -> usize {
        selected.min(self.rows.len().saturating_sub(1))
    }

    pub fn rows(&self) -> &[TickerRow] {
        &self.rows
    }

    pub fn origins(&self) -> &[usize] {
        &self.origin_index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
