use crate::domain::error::{AppError, Result};
use crate::domain::plan::SlotTime;
use sqlx::sqlite::SqlitePool;

pub struct ScheduleMasterRepository {
    pool: SqlitePool,
}

impl ScheduleMasterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Point the schedules of one template at the row's strategy: condition
    /// strings, condition id, strategy label, and quantity override.
    pub async fn apply_plan_row(
        &self,
        template_id: i64,
        condition: &str,
        strategy: &str,
        condition_id: Option<i64>,
        qty: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE ScheduleMaster
             SET Condition = ?, DisplayCondition = ?, Strategy = ?, TradeConditionID = ?,
                 QtyOverride = ?
             WHERE TradeTemplateID = ?",
        )
        .bind(condition)
        .bind(condition)
        .bind(strategy)
        .bind(condition_id)
        .bind(qty)
        .bind(template_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to update schedules for template {template_id}: {e}"
            ))
        })?;
        Ok(result.rows_affected())
    }

    /// The activation pass: everything off, then the touched templates on.
    pub async fn deactivate_all(&self) -> Result<u64> {
        let result = sqlx::query("UPDATE ScheduleMaster SET IsActive = 0")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to deactivate schedules: {e}")))?;
        Ok(result.rows_affected())
    }

    pub async fn activate(&self, template_ids: &[i64]) -> Result<u64> {
        let mut activated = 0;
        for template_id in template_ids {
            let result =
                sqlx::query("UPDATE ScheduleMaster SET IsActive = 1 WHERE TradeTemplateID = ?")
                    .bind(template_id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!(
                            "Failed to activate schedules for template {template_id}: {e}"
                        ))
                    })?;
            activated += result.rows_affected();
        }
        Ok(activated)
    }

    pub async fn exists(&self, template_id: i64, account: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ScheduleMaster WHERE TradeTemplateID = ? AND Account = ?",
        )
        .bind(template_id)
        .bind(account)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to check schedule: {e}")))?;
        Ok(count > 0)
    }

    /// Insert a schedule slot for one template and account. New schedules
    /// start inactive and trade Monday through Friday.
    pub async fn insert(
        &self,
        account: &str,
        template_id: i64,
        slot: SlotTime,
        condition: &str,
        strategy: &str,
        condition_id: Option<i64>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO ScheduleMaster
                 (Account, TradeTemplateID, ScheduleType, Hour, Minute, Second, IsActive,
                  Condition, DisplayCondition, Strategy, TradeConditionID,
                  DayMonday, DayTuesday, DayWednesday, DayThursday, DayFriday, DaySunday)
             VALUES (?, ?, 'Time', ?, ?, 0, 0, ?, ?, ?, ?, 1, 1, 1, 1, 1, 0)",
        )
        .bind(account)
        .bind(template_id)
        .bind(slot.hour as i64)
        .bind(slot.minute as i64)
        .bind(condition)
        .bind(condition)
        .bind(strategy)
        .bind(condition_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert schedule: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM ScheduleMaster")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear schedules: {e}")))?;
        Ok(result.rows_affected())
    }
}
