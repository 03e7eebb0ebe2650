use crate::domain::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EMA crossover strategies the Toolbox schedules understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Ema520,
    Ema540,
    Ema2040,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Ema520, Strategy::Ema540, Strategy::Ema2040];

    /// Parse the CSV `Strategy` cell. An empty cell falls back to EMA520,
    /// anything else unknown is a hard error.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" => Ok(Strategy::Ema520),
            "EMA520" => Ok(Strategy::Ema520),
            "EMA540" => Ok(Strategy::Ema540),
            "EMA2040" => Ok(Strategy::Ema2040),
            other => Err(AppError::ValidationError(format!(
                "Unsupported Strategy '{}' in CSV.",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Ema520 => "EMA520",
            Strategy::Ema540 => "EMA540",
            Strategy::Ema2040 => "EMA2040",
        }
    }

    /// The fast/slow EMA pair this strategy compares.
    pub fn operands(&self) -> (&'static str, &'static str) {
        match self {
            Strategy::Ema520 => ("EMA5", "EMA20"),
            Strategy::Ema540 => ("EMA5", "EMA40"),
            Strategy::Ema2040 => ("EMA20", "EMA40"),
        }
    }

    /// Condition string for the given side. Puts trade with the trend
    /// (`fast > slow`), calls against it (`fast < slow`).
    pub fn condition(&self, side: OptionSide) -> String {
        let (fast, slow) = self.operands();
        let op = match side {
            OptionSide::Put => ">",
            OptionSide::Call => "<",
        };
        format!("{} {} {}", fast, op, slow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionSide {
    Put,
    Call,
}

impl OptionSide {
    pub const BOTH: [OptionSide; 2] = [OptionSide::Put, OptionSide::Call];

    pub fn label(&self) -> &'static str {
        match self {
            OptionSide::Put => "PUT",
            OptionSide::Call => "CALL",
        }
    }

    /// Parse the CSV `OptionType` cell. Empty means both sides.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" => Ok(None),
            "P" => Ok(Some(OptionSide::Put)),
            "C" => Ok(Some(OptionSide::Call)),
            other => Err(AppError::ParseError(format!(
                "Unknown OptionType '{}' (expected 'P' or 'C')",
                other
            ))),
        }
    }
}

static SLOT_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("slot time regex"));

/// An entry time slot (`HH:MM`) on the Toolbox schedule grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotTime {
    pub hour: u8,
    pub minute: u8,
}

impl SlotTime {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl FromStr for SlotTime {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = SLOT_TIME_RE.captures(s.trim()).ok_or_else(|| {
            AppError::ParseError(format!("Invalid Hour:Minute value '{}'", s))
        })?;
        let hour: u8 = caps[1]
            .parse()
            .map_err(|_| AppError::ParseError(format!("Invalid hour in '{}'", s)))?;
        let minute: u8 = caps[2]
            .parse()
            .map_err(|_| AppError::ParseError(format!("Invalid minute in '{}'", s)))?;
        if hour > 23 || minute > 59 {
            return Err(AppError::ParseError(format!(
                "Hour:Minute '{}' out of range",
                s
            )));
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse a CSV `Stop` cell: `1.5x` -> 1.5, bare `x` -> 1.0, plain numbers
/// pass through. The trailing multiplier suffix is case-insensitive.
pub fn parse_stop_multiple(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_suffix('x')
        .or_else(|| trimmed.strip_suffix('X'))
        .unwrap_or(trimmed);
    if stripped.is_empty() {
        return Ok(1.0);
    }
    stripped.parse::<f64>().map_err(|_| {
        AppError::ParseError(format!("Invalid Stop value '{}'", raw))
    })
}

/// Template name the Toolbox derives from the naming convention,
/// e.g. `PUT SPREAD (09:33) P1`.
pub fn template_name(side: OptionSide, time: SlotTime, plan: &str) -> String {
    format!("{} SPREAD ({}) {}", side.label(), time, plan)
}

/// One parsed row of the trade plan CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub time: SlotTime,
    pub premium: f64,
    pub min_premium: Option<f64>,
    pub spread: String,
    pub stop_multiple: f64,
    pub strategy: Strategy,
    pub plan: String,
    pub qty: i64,
    /// `None` means "no profit target" (a CSV value of 100 maps here too).
    pub profit_target: Option<f64>,
    pub side: Option<OptionSide>,
    pub pnl_rank: Option<i64>,
}

impl PlanRow {
    /// Template name for this row on the given side.
    pub fn template_name(&self, side: OptionSide) -> String {
        template_name(side, self.time, &self.plan)
    }

    /// Sides this row applies to (`OptionType` filter, default both).
    pub fn sides(&self) -> &'static [OptionSide] {
        match self.side {
            Some(OptionSide::Put) => &[OptionSide::Put],
            Some(OptionSide::Call) => &[OptionSide::Call],
            None => &OptionSide::BOTH,
        }
    }
}
