use std::sync::Arc;

use crate::config::Config;
use crate::matching::Matcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pipeline plus the loaded classifier. Read-only, shared by every request.
    pub matcher: Arc<Matcher>,
}
