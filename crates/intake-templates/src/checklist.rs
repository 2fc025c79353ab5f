//! Checklist template parsing
//!
//! A checklist line has the shape `- [ ] <description>` with an optional
//! trailing `(due: YYYY-MM-DD)`. Anything else is ignored.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static CHECKLIST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*-\s*\[\s*\]\s+(.*?)(?:\s*\(due:\s*(\d{4}-\d{2}-\d{2})\))?\s*$")
        .unwrap_or_else(|e| unreachable!("checklist pattern is valid: {e}"))
});

/// A task to create, parsed from a checklist line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSeed {
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

impl TaskSeed {
    /// Create seed
    #[inline]
    #[must_use]
    pub fn new(description: impl Into<String>, due_date: Option<NaiveDate>) -> Self {
        Self {
            description: description.into(),
            due_date,
        }
    }
}

/// Parse checklist text into task seeds
///
/// Never fails: non-matching lines are skipped, empty descriptions are
/// dropped and an impossible calendar date becomes `None`.
#[must_use]
pub fn parse_checklist(text: &str) -> Vec<TaskSeed> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TaskSeed> {
    let captures = CHECKLIST_LINE.captures(line.trim())?;
    let description = captures.get(1)?.as_str().trim();
    if description.is_empty() {
        tracing::debug!(line, "skipping checklist line without description");
        return None;
    }

    let due_date = captures.get(2).and_then(|raw| {
        NaiveDate::parse_from_str(raw.as_str(), "%Y-%m-%d")
            .map_err(|e| {
                tracing::warn!(
                    description,
                    due = raw.as_str(),
                    error = %e,
                    "invalid due date in checklist, leaving task undated"
                );
            })
            .ok()
    });

    Some(TaskSeed::new(description, due_date))
}

/// Drop seeds whose description repeats an earlier one, ignoring case
#[must_use]
pub fn dedup_seeds(seeds: impl IntoIterator<Item = TaskSeed>) -> Vec<TaskSeed> {
    let mut seen = HashSet::new();
    seeds
        .into_iter()
        .filter(|seed| seen.insert(seed.description.to_lowercase()))
        .collect()
}
