//! Aggregates shown in the summary block of each report, plus the number
//! formatting they share with the record lines.

use crate::model::{TransactionType, TrustRecord, WellnessRecord};

/// Placeholder printed wherever a value is missing.
pub const MISSING: &str = "N/A";

/// Mean over every row, with missing or non-finite values counted as `0.0`.
/// An empty input averages to `0.0`.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .map(|value| value.filter(|value| value.is_finite()).unwrap_or(0.0))
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Averages over a wellness record set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WellnessSummary {
    pub average_mood: f64,
    pub average_sleep: f64,
    pub average_exercise: f64,
}

impl WellnessSummary {
    pub fn from_records(records: &[WellnessRecord]) -> Self {
        Self {
            average_mood: mean(records.iter().map(|r| r.mood_level.map(|v| v as f64))),
            average_sleep: mean(records.iter().map(|r| r.sleep_hours)),
            average_exercise: mean(records.iter().map(|r| r.exercise_minutes.map(|v| v as f64))),
        }
    }

    /// Summary lines in display order.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Average Mood: {}", fixed2(self.average_mood)),
            format!("Average Sleep: {} hours", fixed2(self.average_sleep)),
            format!("Average Exercise: {} minutes", fixed2(self.average_exercise)),
        ]
    }
}

/// Totals and averages over a trust record set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrustSummary {
    pub total_distributed: f64,
    pub total_expenses: f64,
    pub average_distribution: f64,
}

impl TrustSummary {
    pub fn from_records(records: &[TrustRecord]) -> Self {
        let amounts = |kind: TransactionType| {
            records
                .iter()
                .filter(move |record| record.kind == kind)
                .map(|record| record.amount)
        };

        Self {
            total_distributed: amounts(TransactionType::Distribution).flatten().sum(),
            total_expenses: amounts(TransactionType::Expense).flatten().sum(),
            average_distribution: mean(amounts(TransactionType::Distribution)),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Total Distributed: {}", currency(self.total_distributed)),
            format!("Total Expenses: {}", currency(self.total_expenses)),
            format!("Average Distribution: {}", currency(self.average_distribution)),
        ]
    }
}

/// Fixed two-decimal rendering; non-finite input prints as `0.00`.
pub fn fixed2(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.2}", value)
}

/// US-dollar amount rounded to whole units with thousands separators.
pub fn currency(value: f64) -> String {
    let rounded = if value.is_finite() { value.round() } else { 0.0 };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Displays an optional value or the missing-value placeholder.
pub fn or_missing<T: ToString>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| MISSING.to_owned())
}
