//! Footer status signal shared between the refresh loop and the renderer

use std::sync::atomic::{AtomicU8, Ordering};

/// Outcome of the most recent refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Normal,
    Fetching,
    NetworkError,
}

impl FetchStatus {
    pub fn label(self) -> &'static str {
        match self {
            FetchStatus::Normal => "NORMAL",
            FetchStatus::Fetching => "FETCHING",
            FetchStatus::NetworkError => "NETWORK ERROR",
        }
    }

    fn to_raw(self) -> u8 {
        match self {
            FetchStatus::Normal => 0,
            FetchStatus::Fetching => 1,
            FetchStatus::NetworkError => 2,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => FetchStatus::Fetching,
            2 => FetchStatus::NetworkError,
            _ => FetchStatus::Normal,
        }
    }
}

/// Lock-free cell holding the current [`FetchStatus`]
#[derive(Debug, Default)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    pub fn new(status: FetchStatus) -> Self {
        Self(AtomicU8::new(status.to_raw()))
    }

    pub fn set(&self, status: FetchStatus) {
        self.0.store(status.to_raw(), Ordering::Relaxed);
    }

    pub fn get(&self) -> FetchStatus {
        FetchStatus::from_raw(self.0.load(Ordering::Relaxed))
    }
}
