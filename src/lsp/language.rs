//! Language selection from cursor and viewport positions.

use std::fmt;
use std::ops::Range;

use crate::document::Region;

/// The two language modes a hybrid document can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageTag {
    /// Embedded scripting language.
    Script,
    /// Surrounding templating language.
    Template,
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageTag::Script => f.write_str("script"),
            LanguageTag::Template => f.write_str("template"),
        }
    }
}

/// Language at a single offset.
///
/// Region bounds are inclusive on both sides, so an offset directly after a
/// closing delimiter still selects the script language.
pub fn language_at(regions: &[Region], offset: usize) -> LanguageTag {
    if regions.iter().any(|r| r.contains(offset)) {
        LanguageTag::Script
    } else {
        LanguageTag::Template
    }
}

/// What a set of visible ranges shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    pub script: bool,
    pub template: bool,
}

impl Visibility {
    pub fn is_mixed(&self) -> bool {
        self.script && self.template
    }

    /// The language the viewport settles on by itself, or `None` when it is
    /// mixed and the cursor has to decide.
    pub fn language(&self) -> Option<LanguageTag> {
        if self.is_mixed() {
            None
        } else if self.script {
            Some(LanguageTag::Script)
        } else {
            Some(LanguageTag::Template)
        }
    }

    fn observe(&mut self, regions: &[Region], range: &Range<usize>) {
        if !self.script && regions.iter().any(|r| r.overlaps(range)) {
            self.script = true;
        }
        if !self.template && !regions.iter().any(|r| r.covers(range)) {
            self.template = true;
        }
    }
}

/// Classify the visible ranges, stopping once both languages have been seen.
pub fn visibility(regions: &[Region], visible: &[Range<usize>]) -> Visibility {
    let mut seen = Visibility::default();
    for range in visible {
        seen.observe(regions, range);
        if seen.is_mixed() {
            break;
        }
    }
    seen
}

/// Language for a viewport made of one or more visible ranges.
///
/// A mixed viewport defers to the cursor. An empty viewport is template.
pub fn language_for_viewport(
    regions: &[Region],
    visible: &[Range<usize>],
    cursor: usize,
) -> LanguageTag {
    visibility(regions, visible)
        .language()
        .unwrap_or_else(|| language_at(regions, cursor))
}
