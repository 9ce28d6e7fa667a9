//! Coordinator Module
//!
//! The search façade and the collaborators it is built from:
//! - `SearchCoordinator`: cache, live fetch, fallbacks, stats
//! - `RemoteSource`: the live delegate
//! - `Clock`: time for TTL expiry and history
//! - `SearchHistory`: persisted queries behind suggestions

mod clock;
mod history;
mod search;
mod source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use history::SearchHistory;
pub use search::SearchCoordinator;
pub use source::{RemoteSource, StaticSource};
