//! Output formatting and persistence for validation results.
//!
//! Supports pretty-printing and JSON rendering of rule groups, and CSV
//! append of per-run summaries.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::stats::ValidationStats;
use crate::validation::{RuleGroup, Severity, ValidationRule};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

#[derive(Serialize)]
struct GroupView<'a> {
    rule: ValidationRule,
    severity: Severity,
    title: &'static str,
    count: usize,
    occurrences: Vec<&'a str>,
}

impl<'a> From<&'a RuleGroup> for GroupView<'a> {
    fn from(group: &'a RuleGroup) -> Self {
        GroupView {
            rule: group.rule,
            severity: group.rule.severity(),
            title: group.rule.title(),
            count: group.occurrences.len(),
            occurrences: group
                .occurrences
                .iter()
                .map(|o| o.prefix.as_str())
                .collect(),
        }
    }
}

/// Renders rule groups as pretty JSON, annotated with each rule's title.
pub fn render_json(groups: &[RuleGroup]) -> Result<String> {
    let views: Vec<GroupView<'_>> = groups.iter().map(GroupView::from).collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

/// Logs rule groups using Rust's debug pretty-print format.
pub fn print_pretty(groups: &[RuleGroup]) {
    debug!("{:#?}", groups);
}

/// Logs one summary line per rule group, then the full report as JSON.
pub fn print_json(groups: &[RuleGroup]) -> Result<()> {
    if groups.is_empty() {
        info!("No rule violations found");
        return Ok(());
    }
    for group in groups {
        warn!(
            rule = %group.rule,
            occurrences = group.occurrences.len(),
            "{}",
            group.rule.title()
        );
    }
    info!("{}", render_json(groups)?);
    Ok(())
}

/// Appends a [`ValidationStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &ValidationStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}
