//! Overlay controller.
//!
//! Owns everything that outlives a single session (config, settings,
//! localized chrome labels, the highlighter) and at most one
//! [`SearchSession`]. Opening is two-step: [`Overlay::begin_open`] extracts
//! the page and enters `Loading`; [`Overlay::apply_sources`] finishes the
//! session once the host fetch resolves. A fetch result for an older
//! session is dropped.

use serde_json::Value;
use tokio::time::Instant;

use crate::config::{Config, Profile};
use crate::core::aggregate;
use crate::core::extract::PageExtractor;
use crate::core::item::{SearchableItem, SessionId};
use crate::core::rank::TypePriority;
use crate::error::SpotlightResult;
use crate::events::{self, Command, UiEvent};
use crate::executor::{self, ExecutionAction};
use crate::highlight::Highlighter;
use crate::platform::{BrowserHost, HostResult, PageDocument};
use crate::services::browser::{now_ms, SearchSources};
use crate::services::i18n::{ChromeLabels, Localizer, MessageSource, SystemResolver};
use crate::session::SearchSession;
use crate::settings::{SettingKey, UserSettings};

/// Lifecycle of the overlay.
pub enum OverlayState {
    Closed,
    /// Page extracted, waiting for host sources
    Loading {
        session: SessionId,
        page_items: Vec<SearchableItem>,
        priority: TypePriority,
        query: String,
    },
    Ready(SearchSession),
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Nothing applied (no route, no selection, stale target)
    Ignored,
    /// Query, outcome or cursor changed
    Updated,
    Closed,
    /// An action ran; `ok` is false when the host rejected it
    Executed { action: ExecutionAction, ok: bool },
}

pub struct Overlay {
    config: Config,
    settings: UserSettings,
    messages: Box<dyn MessageSource + Send + Sync>,
    system: Option<SystemResolver>,
    localizer: Localizer,
    labels: ChromeLabels,
    highlighter: Highlighter,
    last_session: SessionId,
    state: OverlayState,
    current_url: String,
    hostname: String,
    notification: Option<String>,
}

impl Overlay {
    pub fn new(
        config: Config,
        settings: UserSettings,
        messages: Box<dyn MessageSource + Send + Sync>,
    ) -> Self {
        let localizer = Localizer::new(settings.language(), messages.as_ref());
        let labels = ChromeLabels::build(&localizer);
        let highlighter = Highlighter::new(config.scroll_settle(), config.highlight_duration());

        Self {
            config,
            settings,
            messages,
            system: None,
            localizer,
            labels,
            highlighter,
            last_session: SessionId(0),
            state: OverlayState::Closed,
            current_url: String::new(),
            hostname: String::new(),
            notification: None,
        }
    }

    /// Consult the host's own message lookup before the built-in English
    /// table.
    pub fn with_system_resolver(mut self, resolver: SystemResolver) -> Self {
        self.system = Some(resolver);
        self.rebuild_labels();
        self
    }

    fn rebuild_labels(&mut self) {
        let mut localizer = Localizer::new(self.settings.language(), self.messages.as_ref());
        if let Some(resolver) = &self.system {
            localizer = localizer.with_system_resolver(resolver.clone());
        }
        self.labels = ChromeLabels::build(&localizer);
        self.localizer = localizer;
    }

    pub fn profile(&self) -> Profile {
        self.config.general.profile
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, OverlayState::Closed)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, OverlayState::Loading { .. })
    }

    pub fn session(&self) -> Option<&SearchSession> {
        match &self.state {
            OverlayState::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Id of the most recently opened session.
    pub fn current_session(&self) -> SessionId {
        self.last_session
    }

    pub fn labels(&self) -> &ChromeLabels {
        &self.labels
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Pending toast message, if any.
    pub fn take_notification(&mut self) -> Option<String> {
        self.notification.take()
    }

    /// Start a session: extract the page and wait for host sources.
    pub fn begin_open(&mut self, doc: &dyn PageDocument) -> SessionId {
        self.highlighter.clear(doc);
        self.last_session = SessionId(self.last_session.0 + 1);
        let session = self.last_session;

        let location = doc.location();
        self.current_url = location.url.clone();
        self.hostname = location.hostname.clone();

        let page_items = PageExtractor::new(doc, session)
            .with_options(self.config.extract_options())
            .with_labels(self.localizer.page_labels())
            .extract();
        tracing::info!("Opened session {:?} with {} page items", session, page_items.len());

        self.state = OverlayState::Loading {
            session,
            page_items,
            priority: self.settings.priority(),
            query: String::new(),
        };
        session
    }

    /// Finish the session opened as `session`. A failed fetch leaves page
    /// items only. Returns false if `session` is no longer loading.
    pub fn apply_sources(&mut self, session: SessionId, sources: HostResult<SearchSources>) -> bool {
        let loading = std::mem::replace(&mut self.state, OverlayState::Closed);
        let (page_items, priority, query) = match loading {
            OverlayState::Loading {
                session: id,
                page_items,
                priority,
                query,
            } if id == session => (page_items, priority, query),
            other => {
                self.state = other;
                tracing::debug!("Dropping sources for stale session {:?}", session);
                return false;
            }
        };

        let recent = match &sources {
            Ok(sources) => aggregate::recent_items(
                &sources.history,
                now_ms(),
                self.config.sources.recent_days,
                self.config.sources.recent_items,
                &self.hostname,
            ),
            Err(_) => Vec::new(),
        };
        let items = aggregate::merge_result(page_items, &sources, &self.hostname);

        let mut ready = SearchSession::new(
            session,
            items,
            self.config.matcher_config(),
            self.config.ranker(priority),
            self.config.min_query_gate(),
        )
        .with_recent(recent);
        if !query.is_empty() {
            ready.set_query(&query);
        }

        tracing::debug!("Session {:?} ready with {} items", session, ready.items().len());
        self.state = OverlayState::Ready(ready);
        true
    }

    /// Open and load in one go.
    pub async fn open(&mut self, doc: &dyn PageDocument, host: &dyn BrowserHost) -> SessionId {
        let session = self.begin_open(doc);
        let sources = host.fetch_search_sources().await;
        self.apply_sources(session, sources);
        session
    }

    /// Discard the session. A running highlight is left to finish.
    pub fn close(&mut self) {
        if self.is_open() {
            tracing::debug!("Closed session {:?}", self.last_session);
        }
        self.state = OverlayState::Closed;
    }

    pub fn set_query(&mut self, value: &str) -> Reaction {
        match &mut self.state {
            OverlayState::Ready(session) => {
                session.set_query(value);
                Reaction::Updated
            }
            OverlayState::Loading { query, .. } => {
                *query = value.to_string();
                Reaction::Updated
            }
            OverlayState::Closed => Reaction::Ignored,
        }
    }

    fn query(&self) -> &str {
        match &self.state {
            OverlayState::Ready(session) => session.query(),
            OverlayState::Loading { query, .. } => query,
            OverlayState::Closed => "",
        }
    }

    /// Route an event and run the resulting command.
    pub async fn handle_event(
        &mut self,
        event: &UiEvent,
        doc: &dyn PageDocument,
        host: &dyn BrowserHost,
    ) -> Reaction {
        if !self.is_open() {
            return Reaction::Ignored;
        }
        let Some(command) = events::route(event, self.profile()) else {
            return Reaction::Ignored;
        };
        self.run(command, doc, host).await
    }

    pub async fn run(
        &mut self,
        command: Command,
        doc: &dyn PageDocument,
        host: &dyn BrowserHost,
    ) -> Reaction {
        match command {
            Command::SetQuery(value) => self.set_query(&value),
            Command::ClearQuery => self.set_query(""),
            Command::ClearOrClose => {
                if self.query().trim().is_empty() {
                    self.close();
                    Reaction::Closed
                } else {
                    self.set_query("")
                }
            }
            Command::Close => {
                self.close();
                Reaction::Closed
            }
            Command::SelectNext => self.with_session(SearchSession::select_next),
            Command::SelectPrevious => self.with_session(SearchSession::select_previous),
            Command::SelectAt(index) => match &mut self.state {
                OverlayState::Ready(session) => {
                    if session.select_at(index) {
                        Reaction::Updated
                    } else {
                        Reaction::Ignored
                    }
                }
                _ => Reaction::Ignored,
            },
            Command::Activate => self.activate(None, doc, host).await,
            Command::ActivateAt(index) => self.activate(Some(index), doc, host).await,
            Command::OpenRecent(index) => self.open_recent(index, host).await,
            Command::CopyUrl => self.copy_url(host).await,
        }
    }

    fn with_session(&mut self, f: fn(&mut SearchSession)) -> Reaction {
        match &mut self.state {
            OverlayState::Ready(session) => {
                f(session);
                Reaction::Updated
            }
            _ => Reaction::Ignored,
        }
    }

    /// Execute the selected result (or the one at `index`).
    ///
    /// The overlay closes before the action runs; failures are logged and
    /// do not reopen it.
    pub async fn activate(
        &mut self,
        index: Option<usize>,
        doc: &dyn PageDocument,
        host: &dyn BrowserHost,
    ) -> Reaction {
        let action = {
            let OverlayState::Ready(session) = &mut self.state else {
                return Reaction::Ignored;
            };
            if let Some(index) = index {
                if !session.select_at(index) {
                    return Reaction::Ignored;
                }
            }
            let Some(item) = session.selected() else {
                return Reaction::Ignored;
            };
            ExecutionAction::for_item(item, &self.current_url)
        };

        self.close();
        let ok = self.execute(&action, doc, host).await;
        Reaction::Executed { action, ok }
    }

    async fn open_recent(&mut self, index: usize, host: &dyn BrowserHost) -> Reaction {
        let url = match &self.state {
            OverlayState::Ready(session) => match session.recent().get(index) {
                Some(item) => item.url.clone(),
                None => return Reaction::Ignored,
            },
            _ => return Reaction::Ignored,
        };

        self.close();
        let action = ExecutionAction::OpenUrl { url };
        let ok = executor::execute(&action, host).await;
        Reaction::Executed { action, ok }
    }

    async fn copy_url(&mut self, host: &dyn BrowserHost) -> Reaction {
        let action = match self.session().and_then(|s| s.selected()) {
            Some(item) if !item.url.is_empty() => {
                ExecutionAction::copy_url(item, &self.labels.url_copied)
            }
            _ => return Reaction::Ignored,
        };

        let ok = executor::execute(&action, host).await;
        if ok {
            if let ExecutionAction::CopyToClipboard { notification, .. } = &action {
                self.notification = Some(notification.clone());
            }
        }
        Reaction::Executed { action, ok }
    }

    async fn execute(
        &mut self,
        action: &ExecutionAction,
        doc: &dyn PageDocument,
        host: &dyn BrowserHost,
    ) -> bool {
        match action {
            ExecutionAction::ScrollToElement { handle } => {
                if handle.session != self.last_session {
                    tracing::warn!(
                        "Ignoring element from session {:?}, current is {:?}",
                        handle.session,
                        self.last_session
                    );
                    return false;
                }
                self.highlighter.begin(doc, *handle, Instant::now())
            }
            _ => executor::execute(action, host).await,
        }
    }

    /// Drive the highlighter until it finishes.
    pub async fn run_highlight(&mut self, doc: &dyn PageDocument) {
        while let Some(deadline) = self.highlighter.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            self.highlighter.poll(doc, Instant::now());
        }
    }

    /// Apply a pushed settings change.
    ///
    /// Language changes rebuild the chrome labels right away; type priority
    /// takes effect from the next session.
    pub fn on_setting_changed(&mut self, key: SettingKey, value: &Value) -> SpotlightResult<()> {
        self.settings.apply(key, value)?;
        match key {
            SettingKey::Language => {
                self.rebuild_labels();
                tracing::debug!("Rebuilt labels for language {}", self.settings.language);
            }
            SettingKey::TypePriority => {
                tracing::debug!("Type priority changed: {:?}", self.settings.type_priority);
            }
        }
        Ok(())
    }
}
