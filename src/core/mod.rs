//! Core fund pipeline: parsing, return calculation, caching and listing

pub mod cache;
pub mod clock;
pub mod config;
pub mod fund;
pub mod listing;
pub mod log;
pub mod parser;
pub mod returns;
pub mod sort;
pub mod source;

// Re-export main types for cleaner imports
pub use clock::{Clock, ManualClock, SystemClock};
pub use fund::{EnrichedFund, FundRecord, HistoryPoint, Outcome, ReturnSet};
pub use listing::FundListService;
pub use parser::{parse, parse_with_report};
pub use returns::{compute_returns, compute_returns_as_of};
pub use sort::{SortKey, sort_funds};
pub use source::{FundReturnsSource, FundUniverseSource};
