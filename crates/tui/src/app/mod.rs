use crate::keybinds::Keybinds;
use crate::onboarding::{Field, OAuthFlow, WizardStep};
use crate::ui::layout::LayoutState;
use crate::ui::panel::PanelType;
use crate::Config;
use anyhow::Result;
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;
use regex::Regex;
use shopify_token_oauth::auth::OAuthClient;
use shopify_token_oauth::callback::CallbackListener;
use shopify_token_oauth::store::ConfigStore;
use shopify_token_oauth::OAuthConfig;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

mod effects;
mod input;
mod render;
mod state;
mod types;

pub use state::App;
pub use types::AppAsyncEvent;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(shp(?:at|ca|ss|ua)_)[A-Za-z0-9_-]+").expect("TOKEN_PATTERN should compile")
});

static CLIENT_SECRET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(client_secret"?\s*[:=]\s*"?)[^"&\s,}]+"#)
        .expect("CLIENT_SECRET_PATTERN should compile")
});

impl App {
    pub(super) fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!("{context}: {}", Self::redact_sensitive(&error.to_string()));
        self.last_error = Some(message.clone());
        tracing::warn!("{message}");
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
        self.show_error_details = false;
    }

    /// Masks the value after a Shopify token prefix or a `client_secret` key.
    fn redact_sensitive(input: &str) -> String {
        let masked = TOKEN_PATTERN.replace_all(input, "${1}[REDACTED]");
        CLIENT_SECRET_PATTERN
            .replace_all(&masked, "${1}[REDACTED]")
            .into_owned()
    }

    pub(super) fn spawn_app_task<F>(&self, future: F)
    where
        F: Future<Output = AppAsyncEvent> + Send + 'static,
    {
        if let Some(tx) = self.app_async_tx.clone() {
            tokio::spawn(async move {
                let event = future.await;
                let _ = tx.send(event);
            });
        }
    }

    fn saved_config(&self) -> Option<OAuthConfig> {
        let store = self.store.as_ref()?;
        match store.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to restore saved OAuth config: {}", e);
                None
            }
        }
    }
}
