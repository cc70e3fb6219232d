use chrono::NaiveDate;
use serde::Serialize;

use super::dates;
use super::pipeline::{Pipeline, RunOutput};

/// Headline counts over the charted employers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub as_of: NaiveDate,
    pub rto: usize,
    pub hybrid: usize,
    pub remote_first: usize,
}

impl Summary {
    /// `hybrid` is whatever is neither RTO by `as_of` nor remote-first.
    pub fn compute(pipeline: &Pipeline, output: &RunOutput, as_of: NaiveDate) -> Self {
        let records = output.entries.iter().map(|e| &e.record);
        let rto = records
            .clone()
            .filter(|r| dates::parse_opt(r.rto_date_text.as_deref()).is_some_and(|d| d <= as_of))
            .count();
        let remote_first = records
            .filter(|r| {
                pipeline
                    .classifier()
                    .is_remote_first(r.hybrid_transition_text.as_deref(), r.notes_text.as_deref())
            })
            .count();
        Summary {
            as_of,
            rto,
            hybrid: output.entries.len().saturating_sub(rto + remote_first),
            remote_first,
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "As of {}: {} companies at 5-day RTO | {} still hybrid | {} remote-first",
            self.as_of.format("%b %Y"),
            self.rto,
            self.hybrid,
            self.remote_first
        )
    }
}
