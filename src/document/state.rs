//! Open document tracking.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::text::LineIndex;

/// Snapshot of one open hybrid document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub uri: Url,
    /// Revision counter from the client, bumped on every edit.
    pub version: i32,
    pub line_index: LineIndex,
}

impl DocumentState {
    pub fn new(uri: Url, source: String, version: i32) -> Self {
        Self {
            uri,
            version,
            line_index: LineIndex::new(source),
        }
    }

    pub fn text(&self) -> &str {
        self.line_index.source()
    }
}

/// Thread-safe storage for open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentState>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open or replace a document.
    pub fn open(&self, uri: Url, source: String, version: i32) -> Arc<DocumentState> {
        let state = Arc::new(DocumentState::new(uri.clone(), source, version));
        self.documents.insert(uri, Arc::clone(&state));
        state
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_replace_close() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///views/home.blade.php").unwrap();

        store.open(uri.clone(), "a".to_string(), 1);
        store.open(uri.clone(), "ab".to_string(), 2);

        let doc = store.get(&uri).unwrap();
        assert_eq!(doc.version, 2);
        assert_eq!(doc.text(), "ab");
        assert_eq!(store.len(), 1);

        store.close(&uri);
        assert!(store.get(&uri).is_none());
        assert!(store.is_empty());
    }
}
