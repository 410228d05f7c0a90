//! API Module
//!
//! Boundary types shared by the HTTP server and the CLI's JSON output: the
//! response envelope, the search request/response mapping, detail views and
//! health diagnostics. Everything takes an explicit [`Database`] handle.
//!
//! [`Database`]: crate::storage::Database

pub mod details;
pub mod health;
pub mod search;

use crate::error::Error;
use serde::{Deserialize, Serialize};

pub use details::{BikeDetail, GarageDetail, PartDetail, SectionDetail};
pub use health::{HealthCheck, HealthReport, HealthStatus};
pub use search::{SearchMeta, SearchParams};

/// Response envelope: `{success, data?, message?, meta?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T, M = ()> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<M>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: None,
        }
    }
}

impl<T, M> ApiResponse<T, M> {
    /// Successful response carrying `data` and `meta`
    pub fn ok_with_meta(data: T, meta: M) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(meta),
        }
    }

    /// Attach a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            meta: None,
        }
    }

    /// Failed response with a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            meta: None,
        }
    }

    /// Failed response for `error`, hiding internal detail unless `expose_internal`
    pub fn from_error(error: &Error, expose_internal: bool) -> Self {
        Self::failure(error.public_message(expose_internal))
    }
}
