// ============================================================
// TRADE PLAN READER
// ============================================================
// Parse the tradeplan CSV into domain rows

use crate::domain::error::{AppError, Result};
use crate::domain::plan::{parse_stop_multiple, OptionSide, PlanRow, SlotTime, Strategy};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_PLAN: &str = "P1";
const DEFAULT_QTY: i64 = 1;

/// A profit target of 100 means "let the spread expire" and is stored as
/// no target at all.
const NO_PROFIT_TARGET: f64 = 100.0;

pub struct PlanReader {
    delimiter: u8,
}

impl Default for PlanReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl PlanReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a trade plan CSV file.
    pub fn read_file(&self, path: &Path) -> Result<Vec<PlanRow>> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        // Tolerate non-UTF-8 exports from spreadsheet tools.
        let content = String::from_utf8_lossy(&bytes);
        self.read_content(&content)
    }

    /// Parse trade plan rows from CSV text.
    pub fn read_content(&self, content: &str) -> Result<Vec<PlanRow>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();
        let columns = column_index(&headers);

        for required in ["hour:minute", "premium", "spread", "stop"] {
            if !columns.contains_key(required) {
                return Err(AppError::ParseError(format!(
                    "CSV is missing required column '{}'",
                    required
                )));
            }
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row_number = index + 1;
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", row_number, e))
            })?;
            rows.push(self.parse_row(row_number, &columns, &record)?);
        }

        Ok(rows)
    }

    fn parse_row(
        &self,
        row_number: usize,
        columns: &HashMap<String, usize>,
        record: &StringRecord,
    ) -> Result<PlanRow> {
        let cell = |name: &str| cell_value(columns, record, name);

        let time: SlotTime = cell("hour:minute").parse().map_err(|e| {
            AppError::ParseError(format!("Row {}: {}", row_number, e))
        })?;
        let premium = parse_required_f64(cell("premium"), "Premium", row_number)?;
        let min_premium = parse_optional_f64(cell("minpremium"), "MinPremium", row_number)?;
        let spread = cell("spread").to_string();
        if spread.is_empty() {
            return Err(AppError::ParseError(format!(
                "Row {}: Spread must not be empty",
                row_number
            )));
        }
        let stop_multiple = parse_stop_multiple(cell("stop"))
            .map_err(|e| AppError::ParseError(format!("Row {}: {}", row_number, e)))?;
        let strategy = Strategy::parse(cell("strategy"))?;

        let plan = match cell("plan") {
            "" => DEFAULT_PLAN.to_string(),
            value => value.to_string(),
        };

        let qty = match cell("qty") {
            "" => DEFAULT_QTY,
            value => value.parse::<i64>().map_err(|_| {
                AppError::ParseError(format!("Row {}: Invalid Qty '{}'", row_number, value))
            })?,
        };

        let profit_target = parse_optional_f64(cell("profittarget"), "profittarget", row_number)?
            .filter(|&pt| pt != NO_PROFIT_TARGET);

        let side = OptionSide::parse(cell("optiontype"))
            .map_err(|e| AppError::ParseError(format!("Row {}: {}", row_number, e)))?;

        let pnl_rank = match cell("pnl rank") {
            "" => None,
            value => Some(value.parse::<i64>().map_err(|_| {
                AppError::ParseError(format!("Row {}: Invalid PnL Rank '{}'", row_number, value))
            })?),
        };

        Ok(PlanRow {
            time,
            premium,
            min_premium,
            spread,
            stop_multiple,
            strategy,
            plan,
            qty,
            profit_target,
            side,
            pnl_rank,
        })
    }
}

fn cell_value<'r>(
    columns: &HashMap<String, usize>,
    record: &'r StringRecord,
    name: &str,
) -> &'r str {
    columns
        .get(name)
        .and_then(|&idx| record.get(idx))
        .unwrap_or("")
        .trim()
}

/// Map lowercased header names to their column index.
fn column_index(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_ascii_lowercase(), idx))
        .collect()
}

fn parse_required_f64(value: &str, column: &str, row_number: usize) -> Result<f64> {
    if value.is_empty() {
        return Err(AppError::ParseError(format!(
            "Row {}: {} must not be empty",
            row_number, column
        )));
    }
    value.parse::<f64>().map_err(|_| {
        AppError::ParseError(format!(
            "Row {}: Invalid {} '{}'",
            row_number, column, value
        ))
    })
}

fn parse_optional_f64(value: &str, column: &str, row_number: usize) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_required_f64(value, column, row_number).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CSV: &str = "\
Hour:Minute,Premium,MinPremium,Spread,Stop,Strategy,Plan,Qty,profittarget,OptionType,PnL Rank
09:33,2.5,1.0,10-15,1.5x,EMA520,P1,2,50,P,1
10:00,3.0,1.5,20-25,2x,EMA540,P2,4,70,C,2
";

    #[test]
    fn parses_all_columns() {
        let rows = PlanReader::new().read_content(FULL_CSV).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.time.to_string(), "09:33");
        assert_eq!(first.premium, 2.5);
        assert_eq!(first.min_premium, Some(1.0));
        assert_eq!(first.spread, "10-15");
        assert_eq!(first.stop_multiple, 1.5);
        assert_eq!(first.strategy, Strategy::Ema520);
        assert_eq!(first.plan, "P1");
        assert_eq!(first.qty, 2);
        assert_eq!(first.profit_target, Some(50.0));
        assert_eq!(first.side, Some(OptionSide::Put));
        assert_eq!(first.pnl_rank, Some(1));

        assert_eq!(rows[1].side, Some(OptionSide::Call));
        assert_eq!(rows[1].strategy, Strategy::Ema540);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let content = "\
Hour:Minute,Premium,Spread,Stop,Strategy,Qty,profittarget
10:00,3.0,20-25,2x,EMA540,4,70
";
        let rows = PlanReader::new().read_content(content).unwrap();
        let row = &rows[0];
        assert_eq!(row.plan, "P1");
        assert_eq!(row.min_premium, None);
        assert_eq!(row.side, None);
        assert_eq!(row.pnl_rank, None);
    }

    #[test]
    fn profit_target_100_means_none() {
        let content = "\
Hour:Minute,Premium,Spread,Stop,Strategy,Qty,profittarget
09:33,2.5,10-15,1.5x,EMA520,2,100
";
        let rows = PlanReader::new().read_content(content).unwrap();
        assert_eq!(rows[0].profit_target, None);
    }

    #[test]
    fn headers_match_case_insensitively() {
        let content = "\
HOUR:MINUTE,PREMIUM,SPREAD,STOP,strategy,qty
09:33,2.5,10-15,x,,2
";
        let rows = PlanReader::new().read_content(content).unwrap();
        assert_eq!(rows[0].stop_multiple, 1.0);
        assert_eq!(rows[0].strategy, Strategy::Ema520);
    }

    #[test]
    fn invalid_strategy_is_an_error() {
        let content = "\
Hour:Minute,Premium,Spread,Stop,Strategy,Qty
09:33,2.5,10-15,1.5x,INVALID,2
";
        let err = PlanReader::new().read_content(content).unwrap_err();
        assert!(err.to_string().contains("Unsupported Strategy 'INVALID'"));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let content = "Premium,Spread,Stop\n2.5,10-15,1.5x\n";
        let err = PlanReader::new().read_content(content).unwrap_err();
        assert!(err.to_string().contains("hour:minute"));
    }

    #[test]
    fn bad_cells_name_the_row() {
        let content = "\
Hour:Minute,Premium,Spread,Stop
09:33,2.5,10-15,1.5x
26:00,2.5,10-15,1.5x
";
        let err = PlanReader::new().read_content(content).unwrap_err();
        assert!(err.to_string().contains("Row 2"), "got: {err}");
    }
}
