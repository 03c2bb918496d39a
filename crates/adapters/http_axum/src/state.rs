//! Shared application state for axum handlers.

use std::sync::Arc;

use webthing_app::context::ThingContext;
use webthing_app::runtime::Runtime;
use webthing_domain::error::NotFoundError;

/// Application state shared across all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<Runtime>,
}

impl AppState {
    #[must_use]
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    /// Look up Thing `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no Thing has that name.
    pub fn thing(&self, name: &str) -> Result<ThingContext, NotFoundError> {
        self.runtime.get(name)
    }
}
