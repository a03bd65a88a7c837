//! Natural-language search over a collection of geotagged photo memories.
//!
//! A query is embedded, compared against every memory's embedding, and the
//! distances are turned into a thresholded, ranked list with the best few
//! flagged for highlighting:
//!
//! ```no_run
//! use memorymap::config::SearchConfig;
//! use memorymap::embed::HashEmbedder;
//! use memorymap::search::MemorySearch;
//! use memorymap::store::{Collection, MemoryRecord};
//!
//! # fn main() -> memorymap::Result<()> {
//! let collection = Collection::new(vec![
//!     MemoryRecord::new("Goa", 15.6745, 73.7068, "Sunset at Arambol Beach", "goa.jpg"),
//! ])?;
//! let search = MemorySearch::build(
//!     collection,
//!     Box::new(HashEmbedder::default()?),
//!     &SearchConfig::default(),
//! )?;
//! for hit in search.answer_query("sunset beach")? {
//!     println!("{} {:.3}", hit.record, hit.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embed;
pub mod error;
pub mod index;
pub mod logging;
pub mod search;
pub mod store;

pub use error::{MemoryMapError, Result};
