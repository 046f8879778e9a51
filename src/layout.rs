//! Renderer-independent description of a report.
//!
//! A [`ReportLayout`] is the fixed top-to-bottom structure of a report
//! (title, generation stamp, summary, section heading, one block per record)
//! expressed as plain strings.  Both PDF backends consume the same layout, so
//! every formatting decision (dates, `N/A` placeholders, currency) lives here
//! and can be tested without producing a document.

use chrono::{DateTime, Local, Utc};

use crate::model::{ReportRecords, TrustRecord, WellnessRecord};
use crate::summary::{self, currency, or_missing, TrustSummary, WellnessSummary};

/// Individual content blocks, in drawing order.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Large centered title.
    Title(String),
    /// Regular body line.
    Line(String),
    /// Smaller gray line, used for journal entries and notes.
    Muted(String),
    /// Underlined section heading.
    Heading(String),
    /// Vertical gap measured in body lines.
    Gap(f64),
}

impl Block {
    /// Text carried by the block, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Title(text) | Block::Line(text) | Block::Muted(text) | Block::Heading(text) => {
                Some(text)
            }
            Block::Gap(_) => None,
        }
    }
}

/// The complete content of one report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    title: String,
    blocks: Vec<Block>,
}

impl ReportLayout {
    /// Lays out `records` with `generated_at` as the generation stamp.
    pub fn build(records: &ReportRecords, generated_at: DateTime<Local>) -> Self {
        let kind = records.kind();
        let mut blocks = vec![
            Block::Title(kind.title().to_owned()),
            Block::Gap(1.0),
            Block::Line(generated_line(generated_at)),
            Block::Gap(1.0),
        ];

        match records {
            ReportRecords::Wellness(records) => {
                blocks.extend(WellnessSummary::from_records(records).lines().into_iter().map(Block::Line));
                blocks.push(Block::Gap(1.0));
                blocks.push(Block::Heading("Entries".to_owned()));
                blocks.push(Block::Gap(0.5));
                for record in records {
                    blocks.push(Block::Line(wellness_line(record)));
                    if let Some(note) = quoted(record.journal_entry.as_deref()) {
                        blocks.push(Block::Muted(note));
                    }
                    blocks.push(Block::Gap(0.5));
                }
            }
            ReportRecords::Trust(records) => {
                blocks.extend(TrustSummary::from_records(records).lines().into_iter().map(Block::Line));
                blocks.push(Block::Gap(1.0));
                blocks.push(Block::Heading("Transactions".to_owned()));
                blocks.push(Block::Gap(0.5));
                for record in records {
                    blocks.push(Block::Line(trust_line(record)));
                    if let Some(note) = quoted(record.note.as_deref()) {
                        blocks.push(Block::Muted(note));
                    }
                    blocks.push(Block::Gap(0.3));
                }
            }
        }

        Self {
            title: kind.title().to_owned(),
            blocks,
        }
    }

    /// Document title stored in the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// All text lines in drawing order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(Block::text)
    }
}

/// Prefix of the generation stamp line.
pub const GENERATED_PREFIX: &str = "Generated: ";

fn generated_line(generated_at: DateTime<Local>) -> String {
    format!(
        "{}{}",
        GENERATED_PREFIX,
        generated_at.format("%-m/%-d/%Y, %-I:%M:%S %p")
    )
}

fn record_date(created_at: &DateTime<Utc>) -> String {
    created_at.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

fn wellness_line(record: &WellnessRecord) -> String {
    format!(
        "{} - Mood: {}, Sleep: {}, Exercise: {}",
        record_date(&record.created_at),
        or_missing(record.mood_level),
        with_unit(record.sleep_hours, "h"),
        with_unit(record.exercise_minutes, "m"),
    )
}

fn trust_line(record: &TrustRecord) -> String {
    let amount = record
        .amount
        .map(currency)
        .unwrap_or_else(|| summary::MISSING.to_owned());
    format!(
        "{} - {}: {}",
        record_date(&record.created_at),
        record.kind.label(),
        amount
    )
}

fn with_unit<T: ToString>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(value) => format!("{}{}", value.to_string(), unit),
        None => summary::MISSING.to_owned(),
    }
}

fn quoted(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| format!("\"{}\"", text))
}
