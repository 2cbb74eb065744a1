//! Ticker snapshot rows and the fixed-capacity strings they carry

use std::fmt;

/// Maximum number of symbols tracked in one watchlist
pub const MAX_SYMBOLS: usize = 50;

/// Maximum length of a trading symbol in bytes
pub const MAX_SYMBOL_LEN: usize = 19;

/// Capacity of a preserved numeric text field
pub const PRICE_TEXT_LEN: usize = 31;

/// Error raised when a symbol cannot be represented
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("symbol must not be empty")]
    Empty,
    #[error("symbol {0} exceeds {max} characters", max = MAX_SYMBOL_LEN)]
    TooLong(String),
    #[error("symbol {0} contains characters other than ASCII letters and digits")]
    InvalidCharacter(String),
}

/// Inline ASCII string with a compile-time capacity.
///
/// Keeps ticker rows and candles `Copy`, so replacing a row is one
/// assignment rather than a field-by-field update.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineStr<const N: usize> {
    bytes: [u8; N],
    len: u8,
}

impl<const N: usize> InlineStr<N> {
    /// An empty string
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Copy `value` in, returning `None` when it does not fit or is not ASCII
    pub fn try_from_str(value: &str) -> Option<Self> {
        if value.len() > N || value.len() > u8::MAX as usize || !value.is_ascii() {
            return None;
        }
        let mut bytes = [0; N];
        bytes[..value.len()].copy_from_slice(value.as_bytes());
        Some(Self {
            bytes,
            len: value.len() as u8,
        })
    }

    /// Same as [`try_from_str`](Self::try_from_str) but yields an empty string on overflow
    pub fn from_str_or_empty(value: &str) -> Self {
        Self::try_from_str(value).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for InlineStr<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for InlineStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for InlineStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unparsed numeric text as returned by the exchange (empty = absent)
pub type PriceText = InlineStr<PRICE_TEXT_LEN>;

/// Trading pair identifier such as `BTCUSDT`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SymbolName(InlineStr<MAX_SYMBOL_LEN>);

impl SymbolName {
    /// Validate and upper-case a symbol
    pub fn new(raw: &str) -> Result<Self, SymbolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SymbolError::InvalidCharacter(trimmed.to_string()));
        }
        let upper = trimmed.to_ascii_uppercase();
        InlineStr::try_from_str(&upper)
            .map(Self)
            .ok_or(SymbolError::TooLong(upper))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for SymbolName {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Latest 24h snapshot for one symbol.
///
/// The symbol is fixed when the row is created from the watchlist; every
/// other field is replaced together when the refresh loop publishes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickerRow {
    pub symbol: SymbolName,
    pub price: f64,
    /// 24h change in percent
    pub change_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume_base: f64,
    pub volume_quote: f64,
    pub trade_count: u64,
    /// Unix seconds at which the sample was taken, zero before the first fetch
    pub timestamp: u64,
    pub price_text: PriceText,
    pub high_text: PriceText,
    pub low_text: PriceText,
}

impl TickerRow {
    /// Placeholder row for a symbol that has not been fetched yet
    pub fn empty(symbol: SymbolName) -> Self {
        Self {
            symbol,
            ..Self::default()
        }
    }

    /// Whether any fetch has ever filled this row
    pub fn has_data(&self) -> bool {
        self.timestamp > 0
    }
}
