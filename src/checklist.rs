use crate::errors::DomainError;
use crate::history::History;
use crate::models::{HistoryStatus, Task};
use chrono::NaiveDate;

/// Daily task checklist. Rows are addressed by position; names carry no
/// identity and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checklist {
    tasks: Vec<Task>,
}

impl Checklist {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn add(&mut self, name: &str) -> Result<&Task, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        self.tasks.push(Task::new(name));
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Flips `done` for the row. With a history log, today's entry for the
    /// task is upserted to the new status.
    pub fn toggle(
        &mut self,
        index: usize,
        today: NaiveDate,
        history: Option<&mut History>,
    ) -> Result<&Task, DomainError> {
        let len = self.tasks.len();
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(DomainError::IndexOutOfRange { index, len })?;
        task.done = !task.done;
        if let Some(history) = history {
            history.upsert(today, &task.name, HistoryStatus::from_done(task.done));
        }
        Ok(task)
    }

    pub fn remove(&mut self, index: usize) -> Result<Task, DomainError> {
        if index >= self.tasks.len() {
            return Err(DomainError::IndexOutOfRange {
                index,
                len: self.tasks.len(),
            });
        }
        Ok(self.tasks.remove(index))
    }

    /// Clears every done flag. History is left alone.
    pub fn reset(&mut self) {
        for task in &mut self.tasks {
            task.done = false;
        }
    }
}
