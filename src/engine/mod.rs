pub mod classify;
pub mod dates;
pub mod pipeline;
pub mod segments;
pub mod sort;
pub mod summary;

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Work policy in force during a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyState {
    Wfh,
    Hybrid,
    Rto,
    RemoteFirst,
}

impl PolicyState {
    pub const ALL: [PolicyState; 4] = [
        PolicyState::Wfh,
        PolicyState::Hybrid,
        PolicyState::Rto,
        PolicyState::RemoteFirst,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyState::Wfh => "wfh",
            PolicyState::Hybrid => "hybrid",
            PolicyState::Rto => "rto",
            PolicyState::RemoteFirst => "remote_first",
        }
    }
}

impl fmt::Display for PolicyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub state: PolicyState,
}

/// Contiguous segments for one employer, ending at the horizon.
pub type Timeline = Vec<Segment>;
