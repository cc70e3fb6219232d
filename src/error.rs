use chrono::NaiveDate;
use thiserror::Error;

use crate::engine::PolicyState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Record at `index` has no employer name; the whole run is refused.
    #[error("record #{index} has no employer name")]
    MissingIdentity { index: usize },

    #[error("{state} interval [{start}, {end}) is empty or inverted")]
    MalformedInterval {
        start: NaiveDate,
        end: NaiveDate,
        state: PolicyState,
    },
}
