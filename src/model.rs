//! Data structures describing the rows that feed a report.
//!
//! The types mirror the columns selected from the hosted database.  Every
//! column except `created_at` (and the transaction type) is nullable upstream,
//! so the corresponding fields are `Option`s and the layout code decides how a
//! missing value is displayed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The report templates served by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Mood, sleep and exercise entries.
    Wellness,
    /// Trust-fund distributions and expenses.
    Trust,
}

impl ReportKind {
    /// Table queried for this report.
    pub fn table(self) -> &'static str {
        match self {
            ReportKind::Wellness => "wellness",
            ReportKind::Trust => "transactions",
        }
    }

    /// Fixed column list selected for this report.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            ReportKind::Wellness => &[
                "created_at",
                "mood_level",
                "sleep_hours",
                "exercise_minutes",
                "journal_entry",
            ],
            ReportKind::Trust => &["created_at", "amount", "type", "note"],
        }
    }

    /// File name suggested to the browser.
    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::Wellness => "wellness_report.pdf",
            ReportKind::Trust => "trust_report.pdf",
        }
    }

    /// Centered title of the rendered document.
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Wellness => "Wellness Progress Report",
            ReportKind::Trust => "Trust Summary Report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportKind::Wellness => "wellness",
            ReportKind::Trust => "trust",
        })
    }
}

/// One row of the `wellness` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellnessRecord {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub mood_level: Option<i64>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub exercise_minutes: Option<i64>,
    #[serde(default)]
    pub journal_entry: Option<String>,
}

/// Direction of a trust transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Distribution,
    Expense,
}

impl TransactionType {
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Distribution => "Distribution",
            TransactionType::Expense => "Expense",
        }
    }
}

/// One row of the `transactions` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustRecord {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub note: Option<String>,
}

/// The typed result of a row fetch, tagged by report kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportRecords {
    Wellness(Vec<WellnessRecord>),
    Trust(Vec<TrustRecord>),
}

impl ReportRecords {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRecords::Wellness(_) => ReportKind::Wellness,
            ReportRecords::Trust(_) => ReportKind::Trust,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReportRecords::Wellness(records) => records.len(),
            ReportRecords::Trust(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
