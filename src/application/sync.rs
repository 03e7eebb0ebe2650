use crate::domain::error::Result;
use crate::domain::plan::{OptionSide, PlanRow};
use crate::infrastructure::db::{
    ConditionIds, ScheduleMasterRepository, TradeConditionRepository, TradeTemplateRepository,
};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct SyncReport {
    pub rows_processed: usize,
    pub templates_updated: usize,
    pub schedules_activated: u64,
    /// Template names that matched no database row (naming mismatches).
    pub unmatched: Vec<String>,
}

/// Applies parsed plan rows to the Toolbox tables: update templates by
/// name, re-point their schedules, then run the activation pass.
pub struct SyncUseCase {
    templates: TradeTemplateRepository,
    schedules: ScheduleMasterRepository,
    conditions: TradeConditionRepository,
}

impl SyncUseCase {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            templates: TradeTemplateRepository::new(pool.clone()),
            schedules: ScheduleMasterRepository::new(pool.clone()),
            conditions: TradeConditionRepository::new(pool),
        }
    }

    pub async fn run(&self, rows: &[PlanRow]) -> Result<SyncReport> {
        let condition_ids = self.conditions.ensure_all().await?;

        let mut report = SyncReport::default();
        let mut touched: Vec<i64> = Vec::new();

        for row in rows {
            for &side in row.sides() {
                let name = row.template_name(side);
                let ids = self.templates.apply_plan_row(&name, row, side).await?;
                if ids.is_empty() {
                    warn!(template = %name, "No template matched; row skipped");
                    report.unmatched.push(name);
                    continue;
                }

                self.apply_schedules(&ids, row, side, &condition_ids).await?;
                debug!(template = %name, matched = ids.len(), qty = row.qty, "Template updated");
                report.templates_updated += ids.len();
                touched.extend(ids);
            }
            report.rows_processed += 1;
        }

        // Everything off, then the touched templates back on. A template
        // updated by any row ends active.
        self.schedules.deactivate_all().await?;
        report.schedules_activated = self.schedules.activate(&touched).await?;

        info!(
            rows = report.rows_processed,
            templates = report.templates_updated,
            activated = report.schedules_activated,
            unmatched = report.unmatched.len(),
            "Trade plan applied"
        );
        Ok(report)
    }

    async fn apply_schedules(
        &self,
        template_ids: &[i64],
        row: &PlanRow,
        side: OptionSide,
        condition_ids: &ConditionIds,
    ) -> Result<()> {
        let condition = row.strategy.condition(side);
        let condition_id = condition_ids.get(row.strategy, side);
        for &template_id in template_ids {
            self.schedules
                .apply_plan_row(
                    template_id,
                    &condition,
                    row.strategy.as_str(),
                    condition_id,
                    row.qty,
                )
                .await?;
        }
        Ok(())
    }
}
