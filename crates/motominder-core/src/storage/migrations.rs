//! Database migrations
//!
//! This module manages SQLite schema migrations for motominder.
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 3;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Initial schema
const MIGRATION_V1: &str = r#"
    -- Garages own bikes
    CREATE TABLE IF NOT EXISTS garages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        location TEXT,
        notes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Bikes own sections and maintenance records
    CREATE TABLE IF NOT EXISTS bikes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        garage_id INTEGER NOT NULL REFERENCES garages(id) ON DELETE CASCADE,
        make TEXT NOT NULL,
        model TEXT NOT NULL,
        year INTEGER,
        vin TEXT,
        purchase_date TEXT,
        current_mileage INTEGER NOT NULL DEFAULT 0,
        notes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Sections group parts on a bike (engine, brakes, ...)
    CREATE TABLE IF NOT EXISTS sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bike_id INTEGER NOT NULL REFERENCES bikes(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT,
        notes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS parts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        section_id INTEGER NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT,
        part_number TEXT,
        supplier_info TEXT,
        replacement_url TEXT,
        purchase_date TEXT,
        installation_date TEXT,
        cost REAL,
        notes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Tags are independent of the ownership chain
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL DEFAULT '#3498db',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Polymorphic (item_type, item_id) reference, checked by the application
    CREATE TABLE IF NOT EXISTS tagged_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        item_type TEXT NOT NULL CHECK (item_type IN ('garage', 'bike', 'section', 'part')),
        item_id INTEGER NOT NULL,
        notes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS maintenance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bike_id INTEGER NOT NULL REFERENCES bikes(id) ON DELETE CASCADE,
        part_id INTEGER REFERENCES parts(id) ON DELETE SET NULL,
        date TEXT NOT NULL,
        mileage INTEGER,
        description TEXT NOT NULL,
        cost REAL,
        notes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 2: Maintenance scheduling
const MIGRATION_V2: &str = r#"
    ALTER TABLE maintenance ADD COLUMN due_date TEXT;
    ALTER TABLE maintenance ADD COLUMN status TEXT NOT NULL DEFAULT 'completed' CHECK (status IN ('scheduled', 'completed'));

    CREATE INDEX IF NOT EXISTS idx_maintenance_status_due ON maintenance(status, due_date);
"#;

/// Migration 3: Tag assignment uniqueness and lookup indexes
const MIGRATION_V3: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_tagged_items_unique ON tagged_items(tag_id, item_type, item_id);
    CREATE INDEX IF NOT EXISTS idx_tagged_items_item ON tagged_items(item_type, item_id);

    CREATE INDEX IF NOT EXISTS idx_bikes_garage_id ON bikes(garage_id);
    CREATE INDEX IF NOT EXISTS idx_sections_bike_id ON sections(bike_id);
    CREATE INDEX IF NOT EXISTS idx_parts_section_id ON parts(section_id);
    CREATE INDEX IF NOT EXISTS idx_maintenance_bike_id ON maintenance(bike_id);
    CREATE INDEX IF NOT EXISTS idx_maintenance_part_id ON maintenance(part_id);
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    // Ensure migrations table exists
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    // MAX() over an empty table yields a single NULL row
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_one(pool)
        .await?;

    Ok(row.0.unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    // Apply migrations in order
    if current_version < 1 {
        tracing::info!("Applying migration v1: Initial schema");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Maintenance scheduling");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    if current_version < 3 {
        tracing::info!("Applying migration v3: Tag assignment uniqueness");
        sqlx::raw_sql(MIGRATION_V3).execute(pool).await?;
        record_migration(pool, 3).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Check if the database needs migrations
pub async fn needs_migration(pool: &SqlitePool) -> anyhow::Result<bool> {
    let current_version = get_current_version(pool).await?;
    Ok(current_version < CURRENT_VERSION)
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone, serde::Serialize)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
