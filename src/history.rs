use crate::models::{DailyCount, HistoryEntry, HistoryStatus};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Per-day task completion log. Holds at most one entry per
/// `(date, task_name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Builds a log from stored rows. Later duplicates of a `(date, task)`
    /// pair overwrite earlier ones.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut history = Self::default();
        for entry in entries {
            history.upsert(entry.date, &entry.task_name, entry.status);
        }
        history
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn upsert(&mut self, date: NaiveDate, task_name: &str, status: HistoryStatus) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.date == date && entry.task_name == task_name)
        {
            Some(entry) => entry.status = status,
            None => self.entries.push(HistoryEntry {
                date,
                task_name: task_name.to_string(),
                status,
            }),
        }
    }

    /// Number of done entries per date, oldest first. Dates without any done
    /// entry are absent.
    pub fn daily_done_counts(&self) -> Vec<DailyCount> {
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for entry in self.done() {
            *counts.entry(entry.date).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect()
    }

    /// The `limit` most recent done entries, newest date first.
    pub fn recent_done(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut done: Vec<HistoryEntry> = self.done().cloned().collect();
        done.sort_by(|a, b| b.date.cmp(&a.date));
        done.truncate(limit);
        done
    }

    fn done(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == HistoryStatus::Done)
    }
}
