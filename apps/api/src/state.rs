use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::assist::agent::AssistAgent;
use crate::assist::tasks::TaskBoard;
use crate::config::Config;
use crate::document::session::ViewSessions;
use crate::document::store::{DocumentStore, Storage};
use crate::export::raster::PreviewCapture;
use crate::notices::NoticeBoard;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// `store` and `views` are never locked at the same time; handlers copy what
/// they need out of one before taking the other.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<RwLock<DocumentStore>>,
    /// Inline editing sessions keyed by view name.
    pub views: Arc<Mutex<ViewSessions>>,
    /// Pluggable text generator. Default: `LlmAssistAgent`, which short-circuits
    /// when no API key is configured.
    pub assist: Arc<dyn AssistAgent>,
    pub tasks: Arc<TaskBoard>,
    pub notices: Arc<NoticeBoard>,
    /// Preview screenshotter for raster exports.
    pub capture: Arc<dyn PreviewCapture>,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        assist: Arc<dyn AssistAgent>,
        capture: Arc<dyn PreviewCapture>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(RwLock::new(DocumentStore::open(storage))),
            views: Arc::new(Mutex::new(ViewSessions::default())),
            assist,
            tasks: Arc::new(TaskBoard::default()),
            notices: Arc::new(NoticeBoard::default()),
            capture,
        }
    }
}
