use crate::pacing::PacingOutcome;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub done: bool,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" | "高" => Ok(Priority::High),
            "medium" | "中" => Ok(Priority::Medium),
            "low" | "低" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// A tracked kokoro. `completed` is derived from the counts and only ever
/// written through [`Collectible::recompute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collectible {
    pub name: String,
    pub priority: Priority,
    pub target_count: u32,
    pub held_count: u32,
    pub completed: bool,
}

impl Collectible {
    pub const DEFAULT_TARGET: u32 = 2;

    pub fn new(name: impl Into<String>, priority: Priority, target_count: u32, held_count: u32) -> Self {
        let mut item = Self {
            name: name.into(),
            priority,
            target_count,
            held_count,
            completed: false,
        };
        item.recompute();
        item
    }

    /// Row shape used by bulk import.
    pub fn imported(name: impl Into<String>) -> Self {
        Self::new(name, Priority::Medium, Self::DEFAULT_TARGET, 0)
    }

    pub fn recompute(&mut self) {
        self.completed = self.held_count >= self.target_count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Done,
    Todo,
}

impl HistoryStatus {
    pub fn from_done(done: bool) -> Self {
        if done { HistoryStatus::Done } else { HistoryStatus::Todo }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryStatus::Done => "done",
            HistoryStatus::Todo => "todo",
        }
    }
}

impl FromStr for HistoryStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "done" | "完了" => Ok(HistoryStatus::Done),
            "todo" | "未完了" => Ok(HistoryStatus::Todo),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub task_name: String,
    pub status: HistoryStatus,
}

pub fn default_tasks() -> Vec<Task> {
    [
        "デイリークエスト",
        "ウォーク 3000歩",
        "メタルの迷宮",
        "メガモンスター討伐",
        "マイホーム",
    ]
    .into_iter()
    .map(Task::new)
    .collect()
}

pub fn default_collectibles() -> Vec<Collectible> {
    ["キラーマジンガ", "ラプソーン", "ギュメイ将軍", "覚醒千里行（対象）"]
        .into_iter()
        .map(Collectible::imported)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct NewTaskRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCollectibleRequest {
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_target")]
    pub target_count: u32,
    #[serde(default)]
    pub held_count: u32,
}

fn default_target() -> u32 {
    Collectible::DEFAULT_TARGET
}

/// One row of a submitted collectible grid. `completed` may be sent back by
/// the client but is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectibleRow {
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    pub target_count: u32,
    pub held_count: u32,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CollectiblePatch {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub target_count: Option<u32>,
    pub held_count: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GridEditResponse {
    pub changed: bool,
    pub rows: Vec<Collectible>,
}

#[derive(Debug, Deserialize)]
pub struct PacingQuery {
    pub current: Option<i64>,
    pub target: Option<i64>,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PacingResponse {
    pub current: i64,
    pub target: i64,
    pub target_date: NaiveDate,
    #[serde(flatten)]
    pub outcome: PacingOutcome,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub recent: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub daily: Vec<DailyCount>,
    pub recent: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub table_index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub added: usize,
    pub rows: Vec<Collectible>,
}
