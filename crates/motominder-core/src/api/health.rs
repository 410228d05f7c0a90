//! Health API
//!
//! System health checks and diagnostics for `motominder doctor` and the
//! server's `/health` route.

use crate::storage::Database;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: Some(message.into()),
        }
    }
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Warning,
    Error,
}

/// Overall system health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: String,
    pub version: String,
}

impl HealthReport {
    fn from_checks(checks: Vec<HealthCheck>) -> Self {
        let overall_status = checks
            .iter()
            .map(|check| check.status)
            .max()
            .unwrap_or(HealthStatus::Ok);

        Self {
            overall_status,
            checks,
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status != HealthStatus::Error
    }
}

/// Liveness checks only: database connectivity and schema version
pub async fn health(db: &Database) -> HealthReport {
    HealthReport::from_checks(vec![check_database(db).await, check_schema(db).await])
}

/// Run all health checks (doctor command)
pub async fn doctor(db: &Database, config_path: Option<&Path>) -> HealthReport {
    let checks = vec![
        check_database(db).await,
        check_schema(db).await,
        check_config(config_path),
        check_data_directory(db).await,
    ];
    HealthReport::from_checks(checks)
}

async fn check_database(db: &Database) -> HealthCheck {
    match db.health_check().await {
        Ok(()) => HealthCheck::new(
            "Database",
            HealthStatus::Ok,
            format!("Connected to {}", db.path().display()),
        ),
        Err(e) => HealthCheck::new("Database", HealthStatus::Error, format!("{:#}", e)),
    }
}

async fn check_schema(db: &Database) -> HealthCheck {
    match db.migration_status().await {
        Ok(status) if status.needs_migration => HealthCheck::new(
            "Schema",
            HealthStatus::Warning,
            format!(
                "Version {} of {} (migrations pending)",
                status.current_version, status.target_version
            ),
        ),
        Ok(status) => HealthCheck::new(
            "Schema",
            HealthStatus::Ok,
            format!("Version {} (up to date)", status.current_version),
        ),
        Err(e) => HealthCheck::new("Schema", HealthStatus::Error, format!("{:#}", e)),
    }
}

fn check_config(config_path: Option<&Path>) -> HealthCheck {
    match config_path {
        Some(path) if path.exists() => HealthCheck::new(
            "Configuration",
            HealthStatus::Ok,
            format!("Found at {}", path.display()),
        ),
        Some(path) => HealthCheck::new(
            "Configuration",
            HealthStatus::Warning,
            format!("Not found at {} (using defaults)", path.display()),
        ),
        None => HealthCheck::new(
            "Configuration",
            HealthStatus::Warning,
            "Could not determine config directory",
        ),
    }
}

async fn check_data_directory(db: &Database) -> HealthCheck {
    if db.config().is_memory() {
        return HealthCheck::new("Data Directory", HealthStatus::Ok, "In-memory database");
    }

    let Some(dir) = db.path().parent().filter(|p| !p.as_os_str().is_empty()) else {
        return HealthCheck::new("Data Directory", HealthStatus::Ok, "Current directory");
    };

    let probe = dir.join(".motominder_health_check");
    match tokio::fs::write(&probe, "ok").await {
        Ok(()) => {
            let _ = tokio::fs::remove_file(&probe).await;
            HealthCheck::new(
                "Data Directory",
                HealthStatus::Ok,
                format!("Writable at {}", dir.display()),
            )
        }
        Err(e) => HealthCheck::new(
            "Data Directory",
            HealthStatus::Error,
            format!("Not writable: {}", e),
        ),
    }
}
