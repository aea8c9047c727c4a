//! Experience pacing: how much has to be earned per day to reach a target
//! amount by a target date.

use crate::errors::DomainError;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingInput {
    pub current: i64,
    pub target: i64,
    pub target_date: NaiveDate,
}

impl PacingInput {
    /// Experience amounts can't go below zero.
    pub fn new(current: i64, target: i64, target_date: NaiveDate) -> Result<Self, DomainError> {
        if current < 0 {
            return Err(DomainError::NegativeAmount("current"));
        }
        if target < 0 {
            return Err(DomainError::NegativeAmount("target"));
        }
        Ok(Self {
            current,
            target,
            target_date,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Advisory {
    Hard,
    Moderate,
    Easy,
}

impl Advisory {
    const HARD_ABOVE: f64 = 300.0;
    const MODERATE_ABOVE: f64 = 100.0;

    pub fn for_quota(per_day: f64) -> Self {
        if per_day > Self::HARD_ABOVE {
            Advisory::Hard
        } else if per_day > Self::MODERATE_ABOVE {
            Advisory::Moderate
        } else {
            Advisory::Easy
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Advisory::Hard => {
                "A tough target. Lean on metal campaigns or consider lowering the goal."
            }
            Advisory::Moderate => "Plan on farming the weekend metal dungeon.",
            Advisory::Easy => "A comfortable pace. Daily walking will get you there.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PacingOutcome {
    DeadlinePassed {
        days_remaining: i64,
    },
    GoalReached,
    OnTrack {
        days_remaining: i64,
        remaining: i64,
        per_day: f64,
        advisory: Advisory,
    },
}

impl PacingOutcome {
    /// One-line summary for the dashboard.
    pub fn message(&self) -> String {
        match self {
            PacingOutcome::DeadlinePassed { .. } => {
                "The target date has passed. Pick a new deadline.".to_string()
            }
            PacingOutcome::GoalReached => "Goal reached. Congratulations!".to_string(),
            PacingOutcome::OnTrack {
                days_remaining,
                remaining,
                per_day,
                advisory,
            } => format!(
                "{per_day:.1} per day for {days_remaining} days ({remaining} left). {}",
                advisory.hint()
            ),
        }
    }
}

pub fn calculate_at(today: NaiveDate, input: PacingInput) -> PacingOutcome {
    let days_remaining = (input.target_date - today).num_days();
    if days_remaining <= 0 {
        return PacingOutcome::DeadlinePassed { days_remaining };
    }

    let remaining = input.target.saturating_sub(input.current);
    if remaining <= 0 {
        return PacingOutcome::GoalReached;
    }

    // Tier from the exact quota; only the reported figure is rounded.
    let quota = remaining as f64 / days_remaining as f64;
    PacingOutcome::OnTrack {
        days_remaining,
        remaining,
        per_day: round_tenth(quota),
        advisory: Advisory::for_quota(quota),
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
