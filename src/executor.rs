//! Result execution module - determines what action to take for each selected item

use crate::core::item::{ElementHandle, ItemKind, SearchableItem};
use crate::platform::BrowserHost;

/// The action to perform when a result is executed
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionAction {
    /// Scroll the originating page node into view, then highlight it
    ScrollToElement { handle: ElementHandle },

    /// Activate an open tab and focus its window
    SwitchTab { tab_id: i64, window_id: i64 },

    /// Already on the selected page; just close
    Dismiss,

    /// Open a URL in a new tab
    OpenUrl { url: String },

    /// Copy text to clipboard with notification
    CopyToClipboard {
        content: String,
        notification: String,
    },
}

impl ExecutionAction {
    /// Route a selected item. An element handle wins over the item type.
    pub fn for_item(item: &SearchableItem, current_url: &str) -> Self {
        if let Some(handle) = item.element {
            return ExecutionAction::ScrollToElement { handle };
        }
        if let Some((tab_id, window_id)) = item.tab_target() {
            return ExecutionAction::SwitchTab { tab_id, window_id };
        }
        if item.kind() == ItemKind::Page && item.url == current_url {
            return ExecutionAction::Dismiss;
        }
        ExecutionAction::OpenUrl {
            url: item.url.clone(),
        }
    }

    /// Copy the item's URL.
    pub fn copy_url(item: &SearchableItem, notification: &str) -> Self {
        ExecutionAction::CopyToClipboard {
            content: item.url.clone(),
            notification: notification.to_string(),
        }
    }

    /// Whether the overlay closes when this action runs.
    pub fn closes_overlay(&self) -> bool {
        !matches!(self, ExecutionAction::CopyToClipboard { .. })
    }
}

/// Run the host side of an action. Failures are logged, never retried.
///
/// Returns whether the host accepted the request. Page-local actions
/// (scroll, dismiss) have no host side and always succeed here.
pub async fn execute(action: &ExecutionAction, host: &dyn BrowserHost) -> bool {
    let result = match action {
        ExecutionAction::ScrollToElement { .. } | ExecutionAction::Dismiss => return true,
        ExecutionAction::SwitchTab { tab_id, window_id } => {
            host.activate_tab(*tab_id, *window_id).await
        }
        ExecutionAction::OpenUrl { url } => host.open_url(url).await,
        ExecutionAction::CopyToClipboard { content, .. } => host.copy_text(content).await,
    };

    match result {
        Ok(()) => {
            tracing::debug!("Executed {:?}", action);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to execute {:?}: {}", action, e);
            false
        }
    }
}
