//! Quantity redistribution by PnL rank.
//!
//! With `--distribution` the plan's quantities are tilted toward the
//! historically best slots: the two best ranks gain a contract, the two
//! worst ranks lose one (never below one). Plans with fewer than five
//! rows only apply the best-rank bonus.

use crate::domain::error::{AppError, Result};
use crate::domain::plan::PlanRow;
use std::collections::HashSet;
use tracing::debug;

const BONUS_RANKS: usize = 2;
const PENALTY_RANKS: usize = 2;
const MIN_ROWS_FOR_PENALTY: usize = 5;

pub fn apply_distribution(rows: &mut [PlanRow]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut ranked: Vec<(usize, i64)> = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();
    for (idx, row) in rows.iter().enumerate() {
        let rank = row.pnl_rank.ok_or_else(|| {
            AppError::ValidationError(
                "--distribution requires a 'PnL Rank' value on every row".to_string(),
            )
        })?;
        if !seen.insert(rank) {
            return Err(AppError::ValidationError(format!(
                "Duplicate PnL Rank {} in CSV",
                rank
            )));
        }
        ranked.push((idx, rank));
    }

    // Rank 1 is the best performer.
    ranked.sort_by_key(|&(_, rank)| rank);

    let bonus = if rows.len() >= MIN_ROWS_FOR_PENALTY {
        BONUS_RANKS
    } else {
        1
    };
    let penalty = if rows.len() >= MIN_ROWS_FOR_PENALTY {
        PENALTY_RANKS
    } else {
        0
    };

    let total = ranked.len();
    for (position, &(idx, rank)) in ranked.iter().enumerate() {
        let base = rows[idx].qty;
        let qty = if position < bonus {
            base + 1
        } else if position >= total - penalty {
            (base - 1).max(1)
        } else {
            base
        };
        if qty != base {
            debug!(rank, base, qty, "Redistributed quantity");
        }
        rows[idx].qty = qty;
    }

    Ok(())
}
