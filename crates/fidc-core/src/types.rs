use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g. 3.2x expected loss)
pub type Multiple = Decimal;

/// Business days in a year; every daily rate in the fund is quoted on this basis.
pub const BUSINESS_DAYS_PER_YEAR: Decimal = dec!(252);

/// Business days in a month (252 / 12).
pub const BUSINESS_DAYS_PER_MONTH: Decimal = dec!(21);

pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Accrual horizon for a waterfall evaluation, in business days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Day,
    Month,
    Year,
    BusinessDays(u32),
}

impl Period {
    /// Linear scaling factor applied to every daily line.
    pub fn business_days(&self) -> Decimal {
        match self {
            Period::Day => Decimal::ONE,
            Period::Month => BUSINESS_DAYS_PER_MONTH,
            Period::Year => BUSINESS_DAYS_PER_YEAR,
            Period::BusinessDays(n) => Decimal::from(*n),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Month => write!(f, "month"),
            Period::Year => write!(f, "year"),
            Period::BusinessDays(n) => write!(f, "{n} business days"),
        }
    }
}

/// A configuration value that was moved to the nearest valid boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub field: String,
    pub original: Decimal,
    pub applied: Decimal,
    pub reason: String,
}

impl Adjustment {
    pub fn new(
        field: impl Into<String>,
        original: Decimal,
        applied: Decimal,
        reason: &str,
    ) -> Self {
        Adjustment {
            field: field.into(),
            original,
            applied,
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for Adjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} adjusted from {} to {}: {}",
            self.field, self.original, self.applied, self.reason
        )
    }
}

/// Clamp `value` into `[lower, upper]`, recording the move when one happens.
pub(crate) fn clamp_recorded(
    field: &str,
    value: Decimal,
    lower: Decimal,
    upper: Option<Decimal>,
    adjustments: &mut Vec<Adjustment>,
) -> Decimal {
    if value < lower {
        adjustments.push(Adjustment::new(field, value, lower, "below lower bound"));
        return lower;
    }
    if let Some(upper) = upper {
        if value > upper {
            adjustments.push(Adjustment::new(field, value, upper, "above upper bound"));
            return upper;
        }
    }
    value
}

/// Division returning zero when the denominator is zero.
pub(crate) fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: Decimal, end: Decimal, n: usize) -> Vec<Decimal> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / Decimal::from(n as u64 - 1);
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        start + step * Decimal::from(i as u64)
                    }
                })
                .collect()
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
