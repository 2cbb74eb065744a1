//! Session state owned by the render/input loop
//!
//! The runtime context wires the shared store, status signal and shutdown
//! token together; the price board and chart session hold per-frame state.

pub mod chart_session;
pub mod price_board;
pub mod runtime;

pub use chart_session::{ChartError, ChartSession};
pub use price_board::{PriceBoard, SortDirection, SortField, SortState};
pub use runtime::RuntimeContext;
