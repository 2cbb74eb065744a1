//! Candle data structure and chart periods

use super::ticker::PriceText;

/// One OHLC interval as returned by the klines endpoint
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Candle {
    /// Unix seconds
    pub open_time: u64,
    /// Unix seconds; always greater than `open_time`
    pub close_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub open_text: PriceText,
    pub high_text: PriceText,
    pub low_text: PriceText,
    pub close_text: PriceText,
    pub volume_base: f64,
    pub volume_quote: f64,
    pub trade_count: u64,
    pub taker_buy_base: f64,
    pub taker_buy_quote: f64,
}

impl Candle {
    /// Create a candle from primitive values with no preserved text
    pub fn new(open_time: u64, close_time: u64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            close_time,
            open,
            high,
            low,
            close,
            ..Self::default()
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Percent move from open to close, `None` when the open is zero
    pub fn change_percent(&self) -> Option<f64> {
        if self.open == 0.0 {
            None
        } else {
            Some((self.close - self.open) / self.open * 100.0)
        }
    }

    /// Whether the interval has closed at `now` (unix seconds)
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.close_time
    }
}

/// Chart interval, ordered from finest to coarsest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    OneMinute,
    FifteenMinutes,
    OneHour,
    FourHours,
    #[default]
    OneDay,
    OneWeek,
    OneMonth,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::OneMinute,
        Period::FifteenMinutes,
        Period::OneHour,
        Period::FourHours,
        Period::OneDay,
        Period::OneWeek,
        Period::OneMonth,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    /// Step through the period list, wrapping at both ends
    pub fn offset(self, step: isize) -> Period {
        let len = Self::ALL.len() as isize;
        let next = (self.position() as isize + step).rem_euclid(len);
        Self::ALL[next as usize]
    }

    /// Interval code understood by the klines endpoint
    pub fn interval_code(self) -> &'static str {
        match self {
            Period::OneMinute => "1m",
            Period::FifteenMinutes => "15m",
            Period::OneHour => "1h",
            Period::FourHours => "4h",
            Period::OneDay => "1d",
            Period::OneWeek => "1w",
            Period::OneMonth => "1M",
        }
    }

    /// Number of candles requested for this interval
    pub fn candle_limit(self) -> u32 {
        match self {
            Period::OneMinute => 240,      // 4 hours
            Period::FifteenMinutes => 192, // 2 days
            Period::OneHour => 168,        // 1 week
            Period::FourHours => 180,      // ~30 days
            Period::OneDay => 120,         // ~4 months
            Period::OneWeek => 104,        // 2 years
            Period::OneMonth => 120,       // 10 years
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::OneMinute => "1 MINUTE",
            Period::FifteenMinutes => "15 MINUTES",
            Period::OneHour => "1 HOUR",
            Period::FourHours => "4 HOURS",
            Period::OneDay => "1 DAY",
            Period::OneWeek => "1 WEEK",
            Period::OneMonth => "1 MONTH",
        }
    }
}
