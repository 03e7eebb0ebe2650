use crate::domain::error::{AppError, Result};
use crate::domain::plan::{OptionSide, Strategy};
use sqlx::sqlite::SqlitePool;
use std::collections::HashMap;

/// Lookup of `TradeConditionID` per (strategy, side) pair.
#[derive(Debug, Default, Clone)]
pub struct ConditionIds {
    ids: HashMap<(Strategy, OptionSide), i64>,
}

impl ConditionIds {
    pub fn get(&self, strategy: Strategy, side: OptionSide) -> Option<i64> {
        self.ids.get(&(strategy, side)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub struct TradeConditionRepository {
    pool: SqlitePool,
}

impl TradeConditionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Make sure one `TradeCondition` (plus its detail row) exists per
    /// (strategy, side) pair, named by its comparison string. Existing
    /// conditions are reused, so repeated runs are idempotent.
    pub async fn ensure_all(&self) -> Result<ConditionIds> {
        let mut ids = HashMap::new();
        for strategy in Strategy::ALL {
            for side in OptionSide::BOTH {
                let condition = strategy.condition(side);
                let id = match self.find_by_name(&condition).await? {
                    Some(id) => id,
                    None => self.insert(strategy, side, &condition).await?,
                };
                ids.insert((strategy, side), id);
            }
        }
        Ok(ConditionIds { ids })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT TradeConditionID FROM TradeCondition WHERE Name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to look up condition '{name}': {e}"))
            })
    }

    async fn insert(&self, strategy: Strategy, side: OptionSide, condition: &str) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO TradeCondition (Name, RetryUntilExpiration) VALUES (?, 1)")
                .bind(condition)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to insert condition '{condition}': {e}"))
                })?;
        let condition_id = result.last_insert_rowid();

        let (fast, slow) = strategy.operands();
        let operator = match side {
            OptionSide::Put => ">",
            OptionSide::Call => "<",
        };
        sqlx::query(
            "INSERT INTO TradeConditionDetail
                 (TradeConditionID, [Group], Input, Operator, Comparison, ComparisonType)
             VALUES (?, 1, ?, ?, ?, 'Study')",
        )
        .bind(condition_id)
        .bind(fast)
        .bind(operator)
        .bind(slow)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to insert condition detail: {e}"))
        })?;

        Ok(condition_id)
    }

    pub async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM TradeConditionDetail")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to clear condition details: {e}"))
            })?;
        sqlx::query("DELETE FROM TradeCondition")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear conditions: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::testutil::memory_pool;

    #[tokio::test]
    async fn ensure_all_creates_six_conditions() {
        let pool = memory_pool().await;
        let repo = TradeConditionRepository::new(pool.clone());

        let ids = repo.ensure_all().await.unwrap();
        assert_eq!(ids.len(), 6);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM TradeCondition")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 6);
        let detail_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM TradeConditionDetail")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(detail_count, 6);
    }

    #[tokio::test]
    async fn ensure_all_is_idempotent() {
        let pool = memory_pool().await;
        let repo = TradeConditionRepository::new(pool.clone());

        let first = repo.ensure_all().await.unwrap();
        let second = repo.ensure_all().await.unwrap();
        assert_eq!(
            first.get(Strategy::Ema520, OptionSide::Put),
            second.get(Strategy::Ema520, OptionSide::Put)
        );

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM TradeCondition")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 6);
    }

    #[tokio::test]
    async fn condition_names_follow_comparison_strings() {
        let pool = memory_pool().await;
        let repo = TradeConditionRepository::new(pool.clone());
        let ids = repo.ensure_all().await.unwrap();

        let id = ids.get(Strategy::Ema540, OptionSide::Call).unwrap();
        let name: String =
            sqlx::query_scalar("SELECT Name FROM TradeCondition WHERE TradeConditionID = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(name, "EMA5 < EMA40");
    }
}
