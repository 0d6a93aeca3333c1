//! Language server that retags hybrid template documents.
//!
//! A hybrid document mixes a templating language with embedded script blocks
//! (`<?php ... ?>` in `.blade.php` files by default). The editor extension
//! forwards cursor and viewport changes; the server answers with the language
//! id the document should currently be rendered as.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use tokio::sync::mpsc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};

mod document;
pub mod error;
mod lsp;
mod retag;
pub mod settings;

pub use document::{
    extract_regions, CacheEntry, DocumentState, DocumentStore, LineIndex, Region, RegionCache,
    RegionScanner, RegionSource,
};
pub use error::{RetagError, RetagResult};
pub use lsp::{
    language_at, language_for_viewport, visibility, LanguageTag, SelectionChanged,
    SelectionChangedParams, SetLanguage, SetLanguageParams, Visibility, VisibleRangesChanged,
    VisibleRangesChangedParams,
};
pub use retag::{LanguageSink, Retagger};
pub use settings::{discover_settings, load_settings, Preferences, RetagConfig};

/// Sends `retag/setLanguage` to the client without waiting on it.
///
/// Requests are queued to a single forwarding task, so the client sees them
/// in the order the decisions were made.
pub struct ClientSink {
    tx: mpsc::UnboundedSender<SetLanguageParams>,
    config: RetagConfig,
}

impl ClientSink {
    /// Create the sink and spawn its forwarding task on the current runtime.
    /// The task ends once the sink is dropped.
    pub fn spawn(client: Client, config: RetagConfig) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SetLanguageParams>();
        tokio::spawn(async move {
            while let Some(params) = rx.recv().await {
                client.send_notification::<SetLanguage>(params).await;
            }
        });
        Self { tx, config }
    }
}

impl LanguageSink for ClientSink {
    fn set_language(&self, uri: &Url, tag: LanguageTag) {
        let params = SetLanguageParams {
            text_document: TextDocumentIdentifier::new(uri.clone()),
            language_id: self.config.language_id(tag).to_string(),
        };
        if self.tx.send(params).is_err() {
            log::debug!("retag forwarder stopped, dropping request for {}", uri);
        }
    }
}

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    config: OnceLock<RetagConfig>,
    retagger: OnceLock<Retagger<ClientSink>>,
    preferences_path: OnceLock<Option<PathBuf>>,
    advisory_shown: AtomicBool,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            config: OnceLock::new(),
            retagger: OnceLock::new(),
            preferences_path: OnceLock::new(),
            advisory_shown: AtomicBool::new(false),
        }
    }

    fn config(&self) -> &RetagConfig {
        self.config.get_or_init(RetagConfig::default)
    }

    fn retagger(&self) -> &Retagger<ClientSink> {
        self.retagger.get_or_init(|| {
            let config = self.config();
            let cache = RegionCache::with_extractor(config.scanner_or_default())
                .with_capacity(config.max_documents);
            let sink = ClientSink::spawn(self.client.clone(), config.clone());
            Retagger::with_cache(cache, sink)
        })
    }

    /// Store a hybrid document. Other documents are ignored.
    fn on_document_change(&self, uri: Url, text: String, version: i32) -> bool {
        if !self.config().matches(&uri) {
            return false;
        }
        self.documents.open(uri, text, version);
        true
    }

    /// Show the advisory once per process unless it was dismissed for good.
    fn maybe_show_advisory(&self) {
        if !self.config().advisory || self.advisory_shown.swap(true, Ordering::SeqCst) {
            return;
        }

        let path = self.preferences_path.get().cloned().flatten();
        if let Some(path) = &path {
            if settings::load_preferences(path).advisory_dismissed {
                return;
            }
        }

        let message = lsp::advisory::advisory_message(self.config());
        tokio::spawn(lsp::advisory::show_advisory(
            self.client.clone(),
            message,
            path,
        ));
    }

    async fn selection_changed(&self, params: SelectionChangedParams) {
        let uri = params.text_document.uri;
        let Some(doc) = self.documents.get(&uri) else {
            log::debug!("selection change for untracked document {}", uri);
            return;
        };
        let Some(cursor) = doc.line_index.position_to_offset(params.position) else {
            log::debug!("cursor {:?} outside {}", params.position, uri);
            return;
        };

        self.retagger().selection_changed(&doc, cursor);
    }

    async fn visible_ranges_changed(&self, params: VisibleRangesChangedParams) {
        let uri = params.text_document.uri;
        let Some(doc) = self.documents.get(&uri) else {
            log::debug!("viewport change for untracked document {}", uri);
            return;
        };

        let visible: Option<Vec<_>> = params
            .visible_ranges
            .into_iter()
            .map(|range| doc.line_index.range_to_offsets(range))
            .collect();
        let Some(visible) = visible else {
            log::debug!("viewport outside {}", uri);
            return;
        };
        // only needed when the viewport is mixed
        let cursor = doc.line_index.position_to_offset(params.position);

        self.retagger().viewport_changed(&doc, &visible, cursor);
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        if let Some(root) = workspace_root {
            let (settings, settings_dir) = settings::discover_settings(&root);
            log::info!("using settings from {}", settings_dir.display());
            let _ = self.config.set(RetagConfig::from_settings(&settings));
        }
        let _ = self.preferences_path.set(settings::preferences_path());

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "retag language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.retagger().dispose();
        log::info!("shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        if self.on_document_change(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        ) {
            self.maybe_show_advisory();
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so there's exactly one change with the full text
        if let Some(change) = params.content_changes.into_iter().next() {
            self.on_document_change(
                params.text_document.uri,
                change.text,
                params.text_document.version,
            );
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if !self.config().matches(&uri) {
            return;
        }
        self.documents.close(&uri);
        self.retagger().document_closed(&uri);
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::build(Backend::new)
        .custom_method(SelectionChanged::METHOD, Backend::selection_changed)
        .custom_method(VisibleRangesChanged::METHOD, Backend::visible_ranges_changed)
        .finish()
}
