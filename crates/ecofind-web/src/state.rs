//! Application state management
//!
//! The composition root: configuration, the backend client, the persisted
//! session, cached list pages and live chat conversations all live here and
//! reach handlers through `State<Arc<AppState>>`.

use crate::{
    api_client::BackendClient,
    error::{ApiError, ApiResult},
    lead_sink::HttpLeadSink,
};
use axum::http::StatusCode;
use dashmap::DashMap;
use ecofind_core::{
    dialog::{DialogEngine, LeadSink, MemorySink, Script, SubmissionOutcome},
    list_page::ListPage,
    loader::{LoadOutcome, Loader},
    presets,
    session::{Session, SessionStore},
    types::{Product, User},
    Config, Record,
};
use parking_lot::RwLock;
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shared handle to one chat conversation
pub type ChatHandle = Arc<Mutex<DialogEngine>>;

/// Registered conversation plus the last time a request reached it
#[derive(Debug)]
pub struct ChatEntry {
    handle: ChatHandle,
    touched: Instant,
}

impl ChatEntry {
    fn new(engine: DialogEngine) -> Self {
        Self {
            handle: Arc::new(Mutex::new(engine)),
            touched: Instant::now(),
        }
    }

    /// Whether nothing reached the conversation for `idle`
    ///
    /// A conversation with a request in progress is never idle.
    fn is_idle(&self, idle: Duration) -> bool {
        self.touched.elapsed() >= idle && self.handle.try_lock().is_ok()
    }
}

/// Application state holding configuration, clients and caches
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Marketplace backend client
    pub backend: BackendClient,
    /// Persisted session storage
    pub sessions: SessionStore,
    /// KYC user listing
    pub users: Mutex<ListPage<User>>,
    /// Pending product listing
    pub pending: Mutex<ListPage<Product>>,
    /// Live chat conversations
    pub chats: DashMap<Uuid, ChatEntry>,
    /// Conversation definition shared by every chat
    pub script: Arc<Script>,
    /// Where chat conversations deliver leads
    pub lead_sink: Arc<dyn LeadSink>,
    /// Most recent leads received on the chat-lead endpoint
    pub leads: MemorySink,
    /// Process start, for uptime reporting
    pub started_at: Instant,
    session: RwLock<Option<Session>>,
    loader: RwLock<Loader>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend.base_url())
            .field("sessions", &self.sessions.path())
            .field("chats", &self.chats.len())
            .field("logged_in", &self.session.read().is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state and restore any persisted admin session
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built or the dialog
    /// script is invalid.
    pub fn new(config: Config) -> ecofind_core::Result<Self> {
        let sink = HttpLeadSink::new(
            config.lead_url(),
            Duration::from_secs(config.backend.request_timeout),
        );
        Self::with_lead_sink(config, Arc::new(sink))
    }

    /// Build the state with an explicit lead sink
    ///
    /// # Errors
    ///
    /// Same as [`AppState::new`].
    pub fn with_lead_sink(
        config: Config,
        lead_sink: Arc<dyn LeadSink>,
    ) -> ecofind_core::Result<Self> {
        let backend = BackendClient::new(&config.backend)?;
        let script = Arc::new(Script::trade_in());
        script
            .validate()
            .map_err(|e| ecofind_core::Error::Configuration {
                message: e.to_string(),
            })?;

        let sessions = SessionStore::from_config(&config.session);
        let restored = sessions.load().unwrap_or_else(|e| {
            warn!(error = %e, path = %sessions.path().display(), "Could not read persisted session");
            None
        });
        if let Some(session) = &restored {
            info!(user = %session.user.email, "Resumed admin session");
        }

        let page_size = config.console.page_size;
        Ok(Self {
            users: Mutex::new(ListPage::new(
                presets::kyc_users(page_size),
                presets::kyc_state(),
            )),
            pending: Mutex::new(ListPage::new(
                presets::pending_products(page_size),
                presets::pending_products_state(),
            )),
            chats: DashMap::new(),
            script,
            lead_sink,
            leads: MemorySink::with_capacity(SubmissionOutcome::Accepted, config.chat.lead_buffer),
            started_at: Instant::now(),
            session: RwLock::new(restored),
            loader: RwLock::new(Loader::new()),
            config,
            backend,
            sessions,
        })
    }

    /// Live admin session, if any
    pub fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Live admin session for the caller presenting `console_token`
    ///
    /// # Errors
    ///
    /// Returns an unauthorized error when nobody is logged in or the token is
    /// not the live session's.
    pub fn require_admin(&self, console_token: &str) -> ApiResult<Session> {
        self.current_session()
            .filter(|session| session.accepts(console_token))
            .ok_or_else(ApiError::unauthorized)
    }

    /// Install a freshly logged-in session and persist it
    pub fn set_session(&self, session: Session) {
        if let Err(e) = self.sessions.save(&session) {
            warn!(error = %e, "Session is live but could not be persisted");
        }
        *self.session.write() = Some(session);
    }

    /// Log out: forget the session, cancel in-flight loads, drop cached lists
    pub async fn clear_session(&self) {
        *self.session.write() = None;
        if let Err(e) = self.sessions.clear() {
            warn!(error = %e, "Could not remove persisted session");
        }

        let previous = std::mem::take(&mut *self.loader.write());
        previous.cancel();

        self.users.lock().await.clear();
        self.pending.lock().await.clear();
        info!("Session ended");
    }

    /// Cancellation scope for loads started now
    pub fn loader(&self) -> Loader {
        self.loader.read().clone()
    }

    /// Register a new conversation
    ///
    /// Idle conversations are swept first when the registry is full.
    ///
    /// # Errors
    ///
    /// Returns 503 when the registry is still full after sweeping.
    pub fn open_chat(&self, engine: DialogEngine) -> ApiResult<Uuid> {
        let limit = self.config.chat.max_conversations;
        if self.chats.len() >= limit {
            self.sweep_idle_chats();
        }
        if self.chats.len() >= limit {
            warn!(limit, "Chat capacity reached, refusing new conversation");
            return Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable",
                "CHAT_CAPACITY",
                "Too many open chat conversations, try again later",
            ));
        }

        let id = Uuid::new_v4();
        self.chats.insert(id, ChatEntry::new(engine));
        Ok(id)
    }

    /// Look up a chat conversation and mark it as used
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn chat(&self, id: Uuid) -> ApiResult<ChatHandle> {
        self.chats
            .get_mut(&id)
            .map(|mut entry| {
                entry.touched = Instant::now();
                Arc::clone(&entry.handle)
            })
            .ok_or_else(|| ApiError::not_found(format!("chat session {id}")))
    }

    /// Drop conversations idle longer than `chat.idle_timeout`
    ///
    /// Returns how many were dropped.
    pub fn sweep_idle_chats(&self) -> usize {
        let idle = Duration::from_secs(self.config.chat.idle_timeout);
        let before = self.chats.len();
        self.chats.retain(|_, entry| !entry.is_idle(idle));
        let swept = before.saturating_sub(self.chats.len());
        if swept > 0 {
            debug!(swept, remaining = self.chats.len(), "Expired idle chat conversations");
        }
        swept
    }
}

/// Fill `page` through `fetch` unless it already holds data
///
/// The page lock is held across the fetch so concurrent requests wait for a
/// single load. A load cancelled by logout reports 401.
///
/// # Errors
///
/// Returns the fetch error, or unauthorized when the load was cancelled.
pub async fn ensure_loaded<R, F>(
    page: &Mutex<ListPage<R>>,
    loader: &Loader,
    force: bool,
    fetch: F,
) -> ApiResult<()>
where
    R: Record,
    F: Future<Output = ecofind_core::Result<Vec<R>>>,
{
    let mut page = page.lock().await;
    if page.is_ready() && !force {
        return Ok(());
    }

    page.begin_loading();
    match loader.run(fetch).await {
        LoadOutcome::Loaded(Err(err)) => {
            page.apply::<String>(LoadOutcome::Loaded(Err(err.to_string())));
            Err(err.into())
        }
        LoadOutcome::Cancelled => {
            page.clear();
            Err(ApiError::unauthorized())
        }
        loaded @ LoadOutcome::Loaded(Ok(_)) => {
            page.apply(loaded);
            Ok(())
        }
    }
}
