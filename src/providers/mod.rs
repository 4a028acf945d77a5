pub mod amfi_feed;
pub mod history;
pub mod util;

pub use amfi_feed::{AmfiFeedProvider, UniverseCache};
pub use history::{HistoryCache, HistoryEntry, HistoryProvider};
