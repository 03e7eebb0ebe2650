//! SQLite access to the Toolbox database.
//!
//! The schema is owned by the Toolbox application; this crate only reads
//! and mutates its `TradeTemplate`, `ScheduleMaster`, `TradeCondition`,
//! and `TradeConditionDetail` tables.

pub mod conditions;
pub mod schedules;
pub mod templates;

use crate::domain::error::{AppError, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub use conditions::{ConditionIds, TradeConditionRepository};
pub use schedules::ScheduleMasterRepository;
pub use templates::TradeTemplateRepository;

/// Open the Toolbox database. The file must already exist; this tool never
/// creates the schema.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.is_file() {
        return Err(AppError::NotFound(format!(
            "Database file not found: {}",
            db_path.display()
        )));
    }

    let db_url = db_path_to_url(db_path)?;
    let options = SqliteConnectOptions::from_str(&db_url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse DB URL: {e}")))?
        .create_if_missing(false)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))
}

fn db_path_to_url(db_path: &Path) -> Result<String> {
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| AppError::DatabaseError("Database path is not valid UTF-8".to_string()))?;
    Ok(format!("sqlite://{}", db_path_str.replace('\\', "/")))
}

#[cfg(test)]
pub(crate) mod testutil {
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    /// Shared in-memory database. A single connection keeps the database
    /// alive for the whole test.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        create_toolbox_schema(&pool).await;
        pool
    }

    /// The subset of the Toolbox schema this crate touches.
    pub async fn create_toolbox_schema(pool: &SqlitePool) {
        let statements = [
            "CREATE TABLE TradeCondition (
                TradeConditionID INTEGER PRIMARY KEY AUTOINCREMENT,
                Name TEXT,
                RetryUntilExpiration INTEGER
            )",
            "CREATE TABLE TradeConditionDetail (
                TradeConditionDetailID INTEGER PRIMARY KEY AUTOINCREMENT,
                TradeConditionID INTEGER,
                [Group] INTEGER,
                Input TEXT,
                Operator TEXT,
                Comparison TEXT,
                ComparisonType TEXT
            )",
            "CREATE TABLE TradeTemplate (
                TradeTemplateID INTEGER PRIMARY KEY AUTOINCREMENT,
                Name TEXT,
                IsDeleted INTEGER,
                TargetMax REAL,
                TargetMaxCall REAL,
                StopMultiple REAL,
                LongWidth TEXT,
                LongMinPremium REAL,
                ProfitTarget REAL,
                OrderIDProfitTarget TEXT
            )",
            "CREATE TABLE ScheduleMaster (
                ScheduleMasterID INTEGER PRIMARY KEY AUTOINCREMENT,
                Account TEXT,
                TradeTemplateID INTEGER,
                ScheduleType TEXT,
                QtyOverride INTEGER,
                Hour INTEGER,
                Minute INTEGER,
                Second INTEGER,
                IsActive INTEGER,
                Condition TEXT,
                Strategy TEXT,
                TradeConditionID INTEGER,
                DisplayCondition TEXT,
                DayMonday INTEGER,
                DayTuesday INTEGER,
                DayWednesday INTEGER,
                DayThursday INTEGER,
                DayFriday INTEGER,
                DaySunday INTEGER
            )",
        ];
        for sql in statements {
            sqlx::query(sql).execute(pool).await.expect("schema");
        }
    }
}
