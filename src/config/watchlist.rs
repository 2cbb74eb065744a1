//! Watchlist file: one symbol per line, `#` comments and blank lines ignored

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::{info, warn};

use crate::market_data::{MAX_SYMBOLS, SymbolError, SymbolName};

/// File name of the watchlist inside the home directory
pub const WATCHLIST_FILE: &str = ".cticker.conf";

const DEFAULT_SYMBOLS: [&str; 3] = ["BTCUSDT", "ETHUSDT", "BNBUSDT"];

#[derive(Debug, thiserror::Error)]
pub enum WatchlistError {
    #[error("cannot access watchlist {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid symbol on line {line}: {source}")]
    InvalidSymbol {
        line: usize,
        #[source]
        source: SymbolError,
    },
    #[error("watchlist {0} contains no symbols")]
    Empty(PathBuf),
    #[error("cannot locate the home directory")]
    NoHome,
}

/// Ordered list of symbols; fixes fetch order and default display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    symbols: Vec<SymbolName>,
}

impl Default for Watchlist {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS
                .iter()
                .filter_map(|s| SymbolName::new(s).ok())
                .collect(),
        }
    }
}

impl Watchlist {
    pub fn new(symbols: Vec<SymbolName>) -> Self {
        Self { symbols }
    }

    /// `$HOME/.cticker.conf`
    pub fn default_path() -> Result<PathBuf, WatchlistError> {
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(WATCHLIST_FILE))
            .ok_or(WatchlistError::NoHome)
    }

    /// Parse file contents; entries past [`MAX_SYMBOLS`] are dropped with a warning
    pub fn parse(content: &str) -> Result<Self, WatchlistError> {
        let mut symbols = Vec::new();
        let mut dropped = 0usize;

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if symbols.len() >= MAX_SYMBOLS {
                dropped += 1;
                continue;
            }
            let symbol = SymbolName::new(line).map_err(|source| WatchlistError::InvalidSymbol {
                line: idx + 1,
                source,
            })?;
            symbols.push(symbol);
        }

        if dropped > 0 {
            warn!(
                "Watchlist holds at most {} symbols; ignored {} extra entries",
                MAX_SYMBOLS, dropped
            );
        }
        Ok(Self { symbols })
    }

    /// Load the watchlist at `path`, creating the default list if the file is missing
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, WatchlistError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let watchlist = Self::default();
                match watchlist.save_to(path) {
                    Ok(()) => info!("Created default watchlist at {}", path.display()),
                    Err(e) => warn!("Could not persist default watchlist: {}", e),
                }
                return Ok(watchlist);
            }
            Err(source) => {
                return Err(WatchlistError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let watchlist = Self::parse(&content)?;
        if watchlist.is_empty() {
            return Err(WatchlistError::Empty(path.to_path_buf()));
        }
        info!(
            "Loaded {} symbols from {}",
            watchlist.len(),
            path.display()
        );
        Ok(watchlist)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), WatchlistError> {
        let path = path.as_ref();
        let mut content = String::new();
        for symbol in &self.symbols {
            content.push_str(symbol.as_str());
            content.push('\n');
        }
        fs::write(path, content).map_err(|source| WatchlistError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn symbols(&self) -> &[SymbolName] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(watchlist: &Watchlist) -> Vec<&str> {
        watchlist.symbols().iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let watchlist = Watchlist::parse("# majors\nbtcusdt\n\n  ETHUSDT  \n#SOLUSDT\n").unwrap();
        assert_eq!(names(&watchlist), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_parse_caps_at_max_symbols() {
        let content: String = (0..60).map(|i| format!("SYM{i}USDT\n")).collect();
        let watchlist = Watchlist::parse(&content).unwrap();
        assert_eq!(watchlist.len(), MAX_SYMBOLS);
        assert_eq!(watchlist.symbols()[49].as_str(), "SYM49USDT");
    }

    #[test]
    fn test_parse_rejects_long_symbol() {
        let err = Watchlist::parse("BTCUSDT\nAVERYLONGSYMBOLNAMEUSDT\n").unwrap_err();
        assert!(matches!(err, WatchlistError::InvalidSymbol { line: 2, .. }));
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(WATCHLIST_FILE);

        let watchlist = Watchlist::load_from(&path).unwrap();
        assert_eq!(names(&watchlist), vec!["BTCUSDT", "ETHUSDT", "BNBUSDT"]);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "BTCUSDT\nETHUSDT\nBNBUSDT\n"
        );
    }

    #[test]
    fn test_empty_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(WATCHLIST_FILE);
        fs::write(&path, "# nothing here\n\n").unwrap();

        assert!(matches!(
            Watchlist::load_from(&path),
            Err(WatchlistError::Empty(_))
        ));
    }
}
