use std::sync::Arc;

use tokio::sync::Mutex;

use crate::annotation::workspace::Workspace;
use crate::config::Config;
use crate::feed::JobFeed;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one workspace of this single-user service. Never held across an await
    /// on the feed.
    pub workspace: Arc<Mutex<Workspace>>,
    /// Pluggable feed. Default: `HttpJobFeed`.
    pub feed: Arc<dyn JobFeed>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, feed: Arc<dyn JobFeed>) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(Workspace::new(config.undo_history_limit))),
            feed,
            config,
        }
    }
}
