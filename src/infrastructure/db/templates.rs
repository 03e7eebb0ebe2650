use crate::domain::error::{AppError, Result};
use crate::domain::plan::{OptionSide, PlanRow};
use sqlx::sqlite::SqlitePool;

/// Value stored in `OrderIDProfitTarget` when a profit target is set.
const PROFIT_TARGET_ORDER: &str = "Order";
/// Literal the Toolbox expects when no profit target applies.
const PROFIT_TARGET_NONE: &str = "None";

pub struct TradeTemplateRepository {
    pool: SqlitePool,
}

impl TradeTemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply one plan row to the template named by the convention for the
    /// given side. Returns the ids of the templates that matched; an empty
    /// result means the naming lookup found nothing.
    pub async fn apply_plan_row(
        &self,
        name: &str,
        row: &PlanRow,
        side: OptionSide,
    ) -> Result<Vec<i64>> {
        let target_column = match side {
            OptionSide::Put => "TargetMax",
            OptionSide::Call => "TargetMaxCall",
        };

        let mut sql = format!(
            "UPDATE TradeTemplate SET {} = ?, StopMultiple = ?, LongWidth = ?",
            target_column
        );
        if row.min_premium.is_some() {
            sql.push_str(", LongMinPremium = ?");
        }
        sql.push_str(", ProfitTarget = ?, OrderIDProfitTarget = ?");
        sql.push_str(" WHERE Name = ? RETURNING TradeTemplateID");

        let order_id_profit_target = if row.profit_target.is_some() {
            PROFIT_TARGET_ORDER
        } else {
            PROFIT_TARGET_NONE
        };

        let mut query = sqlx::query_scalar::<_, i64>(&sql)
            .bind(row.premium)
            .bind(row.stop_multiple)
            .bind(&row.spread);
        if let Some(min_premium) = row.min_premium {
            query = query.bind(min_premium);
        }
        query = query
            .bind(row.profit_target)
            .bind(order_id_profit_target)
            .bind(name);

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update template '{name}': {e}")))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT TradeTemplateID FROM TradeTemplate WHERE Name = ? AND IFNULL(IsDeleted, 0) = 0",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to look up template '{name}': {e}")))
    }

    /// Insert a bare template shell. The Toolbox UI (or a later sync run)
    /// fills in the trade parameters.
    pub async fn insert(&self, name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO TradeTemplate (Name, IsDeleted) VALUES (?, 0)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to insert template '{name}': {e}"))
            })?;
        Ok(result.last_insert_rowid())
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM TradeTemplate")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear templates: {e}")))?;
        Ok(result.rows_affected())
    }
}
