//! Editor event handling: cache lookup, language decision, retag request.

use std::ops::Range;
use std::sync::Arc;

use tower_lsp::lsp_types::Url;

use crate::document::{DocumentState, Region, RegionCache, RegionScanner, RegionSource};
use crate::lsp::{language_at, visibility, LanguageTag};

/// One-way channel to the host editor.
///
/// Calls are fire-and-forget: the host owns applying the tag, and a later
/// request supersedes an earlier one.
pub trait LanguageSink {
    fn set_language(&self, uri: &Url, tag: LanguageTag);
}

impl<S: LanguageSink + ?Sized> LanguageSink for Arc<S> {
    fn set_language(&self, uri: &Url, tag: LanguageTag) {
        (**self).set_language(uri, tag)
    }
}

/// Reacts to cursor, viewport and close events for hybrid documents.
///
/// Callers are expected to filter out non-hybrid documents before handing
/// them over.
pub struct Retagger<S, E = RegionScanner> {
    cache: RegionCache<E>,
    sink: S,
}

impl<S: LanguageSink> Retagger<S> {
    pub fn new(sink: S) -> Self {
        Self::with_cache(RegionCache::new(), sink)
    }
}

impl<S: LanguageSink, E: RegionSource> Retagger<S, E> {
    pub fn with_cache(cache: RegionCache<E>, sink: S) -> Self {
        Self { cache, sink }
    }

    pub fn cache(&self) -> &RegionCache<E> {
        &self.cache
    }

    fn regions(&self, doc: &DocumentState) -> Arc<[Region]> {
        self.cache.get_regions(&doc.uri, doc.version, doc.text())
    }

    /// The cursor moved to `cursor` (byte offset).
    pub fn selection_changed(&self, doc: &DocumentState, cursor: usize) -> LanguageTag {
        let regions = self.regions(doc);
        let tag = language_at(&regions, cursor);
        log::debug!("{} cursor at {} -> {}", doc.uri, cursor, tag);
        self.sink.set_language(&doc.uri, tag);
        tag
    }

    /// The visible ranges changed.
    ///
    /// `cursor` is only consulted when the viewport shows both languages.
    /// An empty viewport, or a mixed one without a cursor, is ignored and
    /// returns `None`.
    pub fn viewport_changed(
        &self,
        doc: &DocumentState,
        visible: &[Range<usize>],
        cursor: Option<usize>,
    ) -> Option<LanguageTag> {
        if visible.is_empty() {
            return None;
        }

        let regions = self.regions(doc);
        let seen = visibility(&regions, visible);
        let Some(tag) = seen
            .language()
            .or_else(|| cursor.map(|offset| language_at(&regions, offset)))
        else {
            log::debug!("{} mixed viewport without a cursor", doc.uri);
            return None;
        };
        log::debug!(
            "{} viewport {:?} cursor {:?} -> {}",
            doc.uri,
            visible,
            cursor,
            tag
        );
        self.sink.set_language(&doc.uri, tag);
        Some(tag)
    }

    pub fn document_closed(&self, uri: &Url) {
        self.cache.invalidate(uri);
    }

    /// Drop all cached regions.
    pub fn dispose(&self) {
        self.cache.clear();
    }
}
