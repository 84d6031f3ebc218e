//! Footage curation.
//!
//! Search results are scored by duration suitability, merged into a
//! duplicate-free selection under a diversity check, then downloaded until
//! a duration budget and a unique source count are both met.
//!
//! Candidate order is pinned by the scorer (stable sort), which keeps the
//! greedy diversity selection deterministic for a given set of results.

pub mod diversity;
pub mod download;
mod error;
mod fetcher;
pub mod providers;
pub mod scorer;
mod selection;

pub use error::{FootageError, FootageResult};
pub use fetcher::{BudgetedFetcher, FetchConfig, FetchReport, FetchRequest, FetchState};
pub use providers::{create_provider, expand_material_patterns, FootageProvider, LocalProvider};
pub use selection::{Offer, SelectionSet};
