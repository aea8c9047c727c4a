use crate::errors::DomainError;
use crate::models::{Collectible, CollectiblePatch, CollectibleRow};
use std::collections::HashSet;

/// Kokoro tracker. Names are unique (exact, case-sensitive) and every row's
/// `completed` flag equals `held_count >= target_count` after each operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectibleTracker {
    rows: Vec<Collectible>,
}

impl CollectibleTracker {
    /// Builds a tracker from stored rows, recomputing `completed`. Rows whose
    /// name repeats an earlier row are dropped.
    pub fn new(rows: Vec<Collectible>) -> Self {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|row| seen.insert(row.name.clone()))
            .map(|mut row| {
                row.recompute();
                row
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Collectible] {
        &self.rows
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rows.iter().any(|row| row.name == name)
    }

    pub fn add(&mut self, mut item: Collectible) -> Result<&Collectible, DomainError> {
        item.name = item.name.trim().to_string();
        if item.name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        if self.contains(&item.name) {
            return Err(DomainError::DuplicateName(item.name));
        }
        item.recompute();
        self.rows.push(item);
        Ok(&self.rows[self.rows.len() - 1])
    }

    /// Applies the given fields to one row and recomputes only that row.
    pub fn update(&mut self, index: usize, patch: CollectiblePatch) -> Result<&Collectible, DomainError> {
        let len = self.rows.len();
        if index >= len {
            return Err(DomainError::IndexOutOfRange { index, len });
        }

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::EmptyName);
            }
            let taken = self
                .rows
                .iter()
                .enumerate()
                .any(|(other, row)| other != index && row.name == name);
            if taken {
                return Err(DomainError::DuplicateName(name.to_string()));
            }
        }

        let row = &mut self.rows[index];
        if let Some(name) = patch.name {
            row.name = name.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            row.priority = priority;
        }
        if let Some(target) = patch.target_count {
            row.target_count = target;
        }
        if let Some(held) = patch.held_count {
            row.held_count = held;
        }
        row.recompute();
        Ok(row)
    }

    pub fn remove(&mut self, index: usize) -> Result<Collectible, DomainError> {
        if index >= self.rows.len() {
            return Err(DomainError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Replaces the whole grid with an edited copy. Returns `false` and leaves
    /// the table untouched when the edit matches the current rows.
    pub fn apply_edit(&mut self, edited: Vec<CollectibleRow>) -> Result<bool, DomainError> {
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(edited.len());
        for row in edited {
            let name = row.name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::EmptyName);
            }
            if !seen.insert(name.clone()) {
                return Err(DomainError::DuplicateName(name));
            }
            rows.push(Collectible::new(name, row.priority, row.target_count, row.held_count));
        }

        if rows == self.rows {
            return Ok(false);
        }
        self.rows = rows;
        Ok(true)
    }

    /// Adds a default row for each name not yet tracked and returns how many
    /// were added. Blank names are skipped.
    pub fn bulk_import<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || self.contains(name) {
                continue;
            }
            self.rows.push(Collectible::imported(name));
            added += 1;
        }
        added
    }
}
