//! Embedded script region extraction.
//!
//! A region is one `open ... close` block of the embedded scripting language
//! inside a template document. Scanning is a plain left-to-right regex pass
//! with a shortest-match body: nested or escaped delimiters are not handled,
//! and an open delimiter with no close delimiter after it yields no region.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RetagError, RetagResult};

/// Default opening delimiter of an embedded script block.
pub const DEFAULT_OPEN_DELIMITER: &str = "<?php";

/// Default closing delimiter of an embedded script block.
pub const DEFAULT_CLOSE_DELIMITER: &str = "?>";

static DEFAULT_SCANNER: LazyLock<RegionScanner> = LazyLock::new(|| {
    RegionScanner::new(DEFAULT_OPEN_DELIMITER, DEFAULT_CLOSE_DELIMITER)
        .expect("default delimiters are valid")
});

/// A span of embedded script, including both delimiters.
///
/// Offsets are byte offsets into the document text, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Inclusive at both ends, so a cursor sitting right after the closing
    /// delimiter is still inside the block.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// True if `range` shares at least one interior position with this region.
    /// Touching at a boundary does not count.
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        range.start < self.end && range.end > self.start
    }

    /// True if `range` lies entirely inside this region.
    pub fn covers(&self, range: &Range<usize>) -> bool {
        range.start >= self.start && range.end <= self.end
    }
}

/// Anything that can turn document text into an ordered list of regions.
pub trait RegionSource {
    fn extract(&self, text: &str) -> Vec<Region>;
}

/// Regex scanner for a pair of literal delimiters.
#[derive(Debug, Clone)]
pub struct RegionScanner {
    pattern: Regex,
}

impl RegionScanner {
    /// Build a scanner for `open ... close`. Delimiters are literal text.
    pub fn new(open: &str, close: &str) -> RetagResult<Self> {
        if open.is_empty() {
            return Err(RetagError::EmptyDelimiter { which: "open" });
        }
        if close.is_empty() {
            return Err(RetagError::EmptyDelimiter { which: "close" });
        }

        let pattern = Regex::new(&format!(
            "(?s){}.*?{}",
            regex::escape(open),
            regex::escape(close)
        ))?;
        Ok(Self { pattern })
    }

    /// Scan `text` for regions. Each call returns a fresh list.
    pub fn scan(&self, text: &str) -> Vec<Region> {
        self.pattern
            .find_iter(text)
            .map(|m| Region::new(m.start(), m.start() + m.as_str().len()))
            .collect()
    }
}

impl Default for RegionScanner {
    fn default() -> Self {
        DEFAULT_SCANNER.clone()
    }
}

impl RegionSource for RegionScanner {
    fn extract(&self, text: &str) -> Vec<Region> {
        self.scan(text)
    }
}

/// Extract regions delimited by `<?php` and `?>`.
pub fn extract_regions(text: &str) -> Vec<Region> {
    DEFAULT_SCANNER.scan(text)
}
