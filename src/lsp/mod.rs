//! LSP-facing pieces.
//!
//! - Language selection for a cursor offset or a set of visible ranges
//! - Custom `retag/*` notifications exchanged with the editor extension
//! - The one-time advisory prompt

pub(crate) mod advisory;
mod language;
mod notifications;

pub use language::{language_at, language_for_viewport, visibility, LanguageTag, Visibility};
pub use notifications::{
    SelectionChanged, SelectionChangedParams, SetLanguage, SetLanguageParams,
    VisibleRangesChanged, VisibleRangesChangedParams,
};
