pub mod intent;
pub mod location;
pub mod rank;
pub mod semantic;

pub use rank::{RankConfig, Ranker, ScoredResult};
pub use semantic::{explain_empty, MemorySearch, SearchStats};
