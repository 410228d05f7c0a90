//! MotoMinder HTTP API
//!
//! JSON boundary over the core library. Every response is wrapped in the
//! `{success, data?, message?, meta?}` envelope.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use routes::build_router;

use motominder_core::storage::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Send internal error detail to clients instead of a generic message
    pub expose_internal_errors: bool,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            expose_internal_errors: false,
        }
    }

    pub fn with_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }
}
