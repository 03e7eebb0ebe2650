use crate::domain::error::{AppError, Result};
use crate::domain::plan::{template_name, OptionSide, Strategy};
use crate::domain::schedule::{plan_labels, schedule_times};
use crate::infrastructure::db::{
    ScheduleMasterRepository, TradeConditionRepository, TradeTemplateRepository,
};
use sqlx::sqlite::SqlitePool;
use tracing::info;

#[derive(Debug, Default)]
pub struct InitReport {
    pub templates_created: usize,
    pub schedules_created: usize,
}

/// Builds the template/schedule/condition grid: one template per
/// plan x slot x side, one schedule row per template and account.
pub struct InitializeUseCase {
    templates: TradeTemplateRepository,
    schedules: ScheduleMasterRepository,
    conditions: TradeConditionRepository,
}

impl InitializeUseCase {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            templates: TradeTemplateRepository::new(pool.clone()),
            schedules: ScheduleMasterRepository::new(pool.clone()),
            conditions: TradeConditionRepository::new(pool),
        }
    }

    /// Initialize the database grid. With `force` the three table families
    /// are wiped first; otherwise existing rows are kept and only missing
    /// ones are added.
    pub async fn run(&self, plan_count: u32, force: bool, accounts: &[String]) -> Result<InitReport> {
        if accounts.is_empty() {
            return Err(AppError::ValidationError(
                "At least one account is required for initialization".to_string(),
            ));
        }
        if plan_count == 0 {
            return Err(AppError::ValidationError(
                "Plan count must be at least 1".to_string(),
            ));
        }

        if force {
            self.schedules.delete_all().await?;
            self.templates.delete_all().await?;
            self.conditions.delete_all().await?;
            info!("Cleared existing templates, schedules, and conditions");
        }

        let condition_ids = self.conditions.ensure_all().await?;
        let mut report = InitReport::default();

        // New schedules start on the default strategy until a sync run
        // re-points them.
        let default_strategy = Strategy::Ema520;

        for plan in plan_labels(plan_count) {
            for slot in schedule_times() {
                for side in OptionSide::BOTH {
                    let name = template_name(side, slot, &plan);
                    let template_id = match self.templates.find_by_name(&name).await? {
                        Some(id) => id,
                        None => {
                            report.templates_created += 1;
                            self.templates.insert(&name).await?
                        }
                    };

                    let condition = default_strategy.condition(side);
                    let condition_id = condition_ids.get(default_strategy, side);
                    for account in accounts {
                        if self.schedules.exists(template_id, account).await? {
                            continue;
                        }
                        self.schedules
                            .insert(
                                account,
                                template_id,
                                slot,
                                &condition,
                                default_strategy.as_str(),
                                condition_id,
                            )
                            .await?;
                        report.schedules_created += 1;
                    }
                }
            }
        }

        info!(
            plans = plan_count,
            accounts = accounts.len(),
            templates = report.templates_created,
            schedules = report.schedules_created,
            force,
            "Database initialized"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::testutil::memory_pool;

    const SLOTS: usize = 51;

    async fn template_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM TradeTemplate")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn schedule_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM ScheduleMaster")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn force_wipes_and_rebuilds_the_grid() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO TradeTemplate (Name) VALUES ('DUMMY_TEMPLATE')")
            .execute(&pool)
            .await
            .unwrap();

        let accounts = vec!["IB:U1234567".to_string()];
        let report = InitializeUseCase::new(pool.clone())
            .run(2, true, &accounts)
            .await
            .unwrap();

        let dummies: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM TradeTemplate WHERE Name = 'DUMMY_TEMPLATE'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(dummies, 0);

        // 2 plans x 51 slots x 2 sides
        assert_eq!(report.templates_created, 2 * SLOTS * 2);
        assert_eq!(template_count(&pool).await, (2 * SLOTS * 2) as i64);
        assert_eq!(schedule_count(&pool).await, (2 * SLOTS * 2) as i64);
    }

    #[tokio::test]
    async fn additive_init_keeps_existing_rows() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO TradeTemplate (Name) VALUES ('DUMMY_TEMPLATE')")
            .execute(&pool)
            .await
            .unwrap();

        let accounts = vec!["IB:U1234567".to_string()];
        InitializeUseCase::new(pool.clone())
            .run(1, false, &accounts)
            .await
            .unwrap();

        let dummies: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM TradeTemplate WHERE Name = 'DUMMY_TEMPLATE'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(dummies, 1);
        assert_eq!(template_count(&pool).await, (SLOTS * 2 + 1) as i64);
    }

    #[tokio::test]
    async fn rerun_adds_nothing_new() {
        let pool = memory_pool().await;
        let accounts = vec!["IB:U1234567".to_string()];
        let use_case = InitializeUseCase::new(pool.clone());

        use_case.run(1, true, &accounts).await.unwrap();
        let report = use_case.run(1, false, &accounts).await.unwrap();

        assert_eq!(report.templates_created, 0);
        assert_eq!(report.schedules_created, 0);
        assert_eq!(template_count(&pool).await, (SLOTS * 2) as i64);
    }

    #[tokio::test]
    async fn new_account_gets_its_own_schedules() {
        let pool = memory_pool().await;
        let use_case = InitializeUseCase::new(pool.clone());

        use_case
            .run(1, true, &["IB:U1234567".to_string()])
            .await
            .unwrap();
        let report = use_case
            .run(
                1,
                false,
                &["IB:U1234567".to_string(), "IB:U7654321".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(report.templates_created, 0);
        assert_eq!(report.schedules_created, SLOTS * 2);
        assert_eq!(schedule_count(&pool).await, (SLOTS * 2 * 2) as i64);
    }

    #[tokio::test]
    async fn requires_accounts_and_plans() {
        let pool = memory_pool().await;
        let use_case = InitializeUseCase::new(pool);
        assert!(use_case.run(1, false, &[]).await.is_err());
        assert!(use_case
            .run(0, false, &["IB:U1234567".to_string()])
            .await
            .is_err());
    }
}
