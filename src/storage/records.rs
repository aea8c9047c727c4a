use super::StorageError;
use crate::models::{Collectible, HistoryEntry, HistoryStatus, Priority, Task};
use chrono::NaiveDate;

/// A record type that is stored as one row of a named table.
pub trait TableRecord: Sized {
    const TABLE: &'static str;
    const HEADER: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;

    /// `row` holds one cell per [`TableRecord::HEADER`] column, in order.
    fn from_row(row: &[String]) -> Result<Self, StorageError>;
}

impl TableRecord for Task {
    const TABLE: &'static str = "tasks";
    const HEADER: &'static [&'static str] = &["name", "done"];

    fn to_row(&self) -> Vec<String> {
        vec![self.name.clone(), self.done.to_string()]
    }

    fn from_row(row: &[String]) -> Result<Self, StorageError> {
        Ok(Task {
            name: row[0].trim().to_string(),
            done: parse_bool(Self::TABLE, "done", &row[1])?,
        })
    }
}

impl TableRecord for Collectible {
    const TABLE: &'static str = "kokoro";
    const HEADER: &'static [&'static str] =
        &["name", "priority", "target_count", "held_count", "completed"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.priority.to_string(),
            self.target_count.to_string(),
            self.held_count.to_string(),
            self.completed.to_string(),
        ]
    }

    /// The stored `completed` cell is ignored and recomputed.
    fn from_row(row: &[String]) -> Result<Self, StorageError> {
        let priority = if row[1].trim().is_empty() {
            Priority::default()
        } else {
            row[1].parse().map_err(|_| invalid(Self::TABLE, "priority", &row[1]))?
        };
        Ok(Collectible::new(
            row[0].trim(),
            priority,
            parse_count(Self::TABLE, "target_count", &row[2])?,
            parse_count(Self::TABLE, "held_count", &row[3])?,
        ))
    }
}

impl TableRecord for HistoryEntry {
    const TABLE: &'static str = "history";
    const HEADER: &'static [&'static str] = &["date", "task_name", "status"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.task_name.clone(),
            self.status.as_str().to_string(),
        ]
    }

    fn from_row(row: &[String]) -> Result<Self, StorageError> {
        let date = NaiveDate::parse_from_str(row[0].trim(), "%Y-%m-%d")
            .map_err(|_| invalid(Self::TABLE, "date", &row[0]))?;
        let status: HistoryStatus = row[2]
            .parse()
            .map_err(|_| invalid(Self::TABLE, "status", &row[2]))?;
        Ok(HistoryEntry {
            date,
            task_name: row[1].trim().to_string(),
            status,
        })
    }
}

fn parse_bool(table: &'static str, column: &'static str, value: &str) -> Result<bool, StorageError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(invalid(table, column, value)),
    }
}

/// Counts are read leniently: blank is zero and spreadsheet-style `2.0` is
/// accepted.
fn parse_count(table: &'static str, column: &'static str, value: &str) -> Result<u32, StorageError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if let Ok(count) = trimmed.parse::<u32>() {
        return Ok(count);
    }
    match trimmed.parse::<f64>() {
        Ok(float) if float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX) => {
            Ok(float as u32)
        }
        _ => Err(invalid(table, column, value)),
    }
}

fn invalid(table: &'static str, column: &'static str, value: &str) -> StorageError {
    StorageError::InvalidValue {
        table,
        column,
        value: value.to_string(),
    }
}
