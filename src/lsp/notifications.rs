//! Custom notifications exchanged with the editor extension.
//!
//! Cursor and viewport state are not part of core LSP, so the extension
//! forwards them with `retag/*` notifications and applies `retag/setLanguage`.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{Position, Range, TextDocumentIdentifier};

/// Client -> server: the primary cursor moved.
#[derive(Debug)]
pub enum SelectionChanged {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionChangedParams {
    pub text_document: TextDocumentIdentifier,
    /// Active end of the primary selection.
    pub position: Position,
}

impl Notification for SelectionChanged {
    type Params = SelectionChangedParams;
    const METHOD: &'static str = "retag/selectionChanged";
}

/// Client -> server: the visible ranges of an editor changed.
#[derive(Debug)]
pub enum VisibleRangesChanged {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRangesChangedParams {
    pub text_document: TextDocumentIdentifier,
    pub visible_ranges: Vec<Range>,
    /// Active end of the primary selection, used when the viewport is mixed.
    pub position: Position,
}

impl Notification for VisibleRangesChanged {
    type Params = VisibleRangesChangedParams;
    const METHOD: &'static str = "retag/visibleRangesChanged";
}

/// Server -> client: retag the document with a language id.
#[derive(Debug)]
pub enum SetLanguage {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLanguageParams {
    pub text_document: TextDocumentIdentifier,
    pub language_id: String,
}

impl Notification for SetLanguage {
    type Params = SetLanguageParams;
    const METHOD: &'static str = "retag/setLanguage";
}
