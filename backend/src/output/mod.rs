//! Rendering of derived tables for the command line.
//!
//! Every table can be written as pretty JSON, CSV, or an aligned text table.
//! The combined [`Report`] is JSON only.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{OutputError, OutputResult};
use crate::models::{AgeDivisionRecord, FamilyGroupRow, SurvivalDemographicsRow};
use crate::transform::{LastNameCount, LastNameCounts};

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values with a header row
    Csv,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

// =============================================================================
// Row Rendering
// =============================================================================

/// A row that can be laid out as flat text cells.
pub trait TabularRow {
    fn header() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl TabularRow for SurvivalDemographicsRow {
    fn header() -> &'static [&'static str] {
        &[
            "passenger_class",
            "sex",
            "age_group",
            "n_passengers",
            "n_survivors",
            "survival_rate",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.passenger_class.to_string(),
            self.sex.to_string(),
            self.age_group.to_string(),
            self.n_passengers.to_string(),
            self.n_survivors.to_string(),
            self.survival_rate.to_string(),
        ]
    }
}

impl TabularRow for FamilyGroupRow {
    fn header() -> &'static [&'static str] {
        &[
            "family_size",
            "passenger_class",
            "n_passengers",
            "avg_fare",
            "min_fare",
            "max_fare",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.family_size.to_string(),
            self.passenger_class.to_string(),
            self.n_passengers.to_string(),
            self.avg_fare.to_string(),
            self.min_fare.to_string(),
            self.max_fare.to_string(),
        ]
    }
}

impl TabularRow for LastNameCount<'_> {
    fn header() -> &'static [&'static str] {
        &["last_name", "count"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.last_name.to_string(), self.count.to_string()]
    }
}

impl TabularRow for AgeDivisionRecord {
    fn header() -> &'static [&'static str] {
        &[
            "passenger_id",
            "passenger_class",
            "name",
            "sex",
            "age",
            "siblings_spouses_aboard",
            "parents_children_aboard",
            "ticket",
            "fare",
            "cabin",
            "embarked",
            "survived",
            "older_passenger",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let r = &self.record;
        vec![
            opt(&r.passenger_id),
            r.passenger_class.to_string(),
            r.name.clone(),
            r.sex.to_string(),
            opt(&r.age),
            opt(&r.siblings_spouses_aboard),
            opt(&r.parents_children_aboard),
            opt(&r.ticket),
            opt(&r.fare),
            opt(&r.cabin),
            opt(&r.embarked),
            r.survived.to_string(),
            self.older_passenger.to_string(),
        ]
    }
}

/// Render rows in the requested format.
pub fn render_rows<T>(rows: &[T], format: OutputFormat) -> OutputResult<String>
where
    T: TabularRow + Serialize,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => render_csv(rows),
        OutputFormat::Table => Ok(render_table(rows)),
    }
}

/// Render surname counts, optionally keeping only the `top` most frequent.
pub fn render_last_names(
    counts: &LastNameCounts,
    top: Option<usize>,
    format: OutputFormat,
) -> OutputResult<String> {
    let mut entries = counts.by_count();
    if let Some(top) = top {
        entries.truncate(top);
    }
    render_rows(&entries, format)
}

fn render_csv<T: TabularRow>(rows: &[T]) -> OutputResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::header())?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn render_table<T: TabularRow>(rows: &[T]) -> String {
    let header = T::header();
    let body: Vec<Vec<String>> = rows.iter().map(T::cells).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, header.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for cells in &body {
        push_line(&mut out, cells.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}

// =============================================================================
// Report
// =============================================================================

/// Every derived table for one load of the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub source: String,
    pub n_records: usize,
    pub survival_demographics: Vec<SurvivalDemographicsRow>,
    pub family_groups: Vec<FamilyGroupRow>,
    pub last_names: &'a LastNameCounts,
    pub age_division: Vec<AgeDivisionRecord>,
}

impl Report<'_> {
    pub fn render(&self, format: OutputFormat) -> OutputResult<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            other => Err(OutputError::UnsupportedFormat {
                format: other.as_str().to_string(),
                what: "the combined report",
            }),
        }
    }
}

/// Write to `path`, or to stdout when `None`.
pub fn write_output(content: &str, path: Option<&Path>) -> OutputResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            info!(path = %p.display(), "output written");
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
