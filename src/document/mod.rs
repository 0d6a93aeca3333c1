//! Document state, region extraction and caching.
//!
//! This module provides:
//! - `Region` and `RegionScanner` for locating embedded script blocks
//! - `RegionCache` for memoizing regions per document revision
//! - `DocumentState` and `DocumentStore` for document lifecycle management
//! - `LineIndex` for LSP position -> byte offset conversion

mod cache;
mod region;
mod state;
mod text;

pub use cache::{CacheEntry, RegionCache};
pub use region::{
    extract_regions, Region, RegionScanner, RegionSource, DEFAULT_CLOSE_DELIMITER,
    DEFAULT_OPEN_DELIMITER,
};
pub use state::{DocumentState, DocumentStore};
pub use text::LineIndex;
