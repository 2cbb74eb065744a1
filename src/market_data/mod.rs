//! Market data types, the shared ticker store and the refresh loop

pub mod candle;
pub mod refresh;
pub mod status;
pub mod store;
pub mod ticker;

pub use candle::{Candle, Period};
pub use refresh::{CycleReport, RefreshError, RefreshLoop};
pub use status::{FetchStatus, StatusCell};
pub use store::TickerStore;
pub use ticker::{MAX_SYMBOL_LEN, MAX_SYMBOLS, PriceText, SymbolError, SymbolName, TickerRow};
