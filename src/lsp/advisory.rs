//! One-time advisory prompt shown when the first hybrid document opens.

use std::path::PathBuf;

use tower_lsp::lsp_types::{MessageActionItem, MessageType};
use tower_lsp::Client;

use crate::settings::{load_preferences, save_preferences, RetagConfig};

const ACKNOWLEDGE: &str = "OK";
const DISMISS: &str = "Don't show again";

pub(crate) fn advisory_message(config: &RetagConfig) -> String {
    format!(
        "The language of {} files now follows the cursor and viewport: \
         {}...{} blocks are treated as {}, everything else as {}.",
        config.file_suffix,
        config.open_delimiter,
        config.close_delimiter,
        config.script_language,
        config.template_language
    )
}

pub(crate) fn advisory_actions() -> Vec<MessageActionItem> {
    [ACKNOWLEDGE, DISMISS]
        .into_iter()
        .map(|title| MessageActionItem {
            title: title.to_string(),
            properties: Default::default(),
        })
        .collect()
}

pub(crate) fn is_dismissal(action: Option<&MessageActionItem>) -> bool {
    action.is_some_and(|a| a.title == DISMISS)
}

/// Ask the client to show the advisory and persist a dismissal.
pub(crate) async fn show_advisory(client: Client, message: String, preferences: Option<PathBuf>) {
    let response = client
        .show_message_request(MessageType::INFO, message, Some(advisory_actions()))
        .await;

    let action = match response {
        Ok(action) => action,
        Err(e) => {
            log::debug!("advisory prompt failed: {}", e);
            return;
        }
    };
    if !is_dismissal(action.as_ref()) {
        return;
    }

    let Some(path) = preferences else {
        return;
    };
    let mut prefs = load_preferences(&path);
    prefs.advisory_dismissed = true;
    if let Err(e) = save_preferences(&path, &prefs) {
        log::warn!("failed to persist advisory dismissal: {}", e);
    }
}
