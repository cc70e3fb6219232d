use chrono::NaiveDate;

use super::{PolicyState, Segment, Timeline};
use crate::error::TimelineError;
use crate::settings::IntervalPolicy;

/// Everything known about one employer once its text fields are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyFacts {
    pub wfh_start: Option<NaiveDate>,
    pub hybrid: Option<NaiveDate>,
    pub rto: Option<NaiveDate>,
    pub remote_first: bool,
    pub skip_hybrid: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SegmentBuilder {
    pub default_wfh_start: NaiveDate,
    pub horizon_end: NaiveDate,
    pub policy: IntervalPolicy,
}

impl SegmentBuilder {
    pub fn build(&self, facts: &PolicyFacts) -> Result<Timeline, TimelineError> {
        let transitions = self.transitions(facts);
        match self.policy {
            IntervalPolicy::Clamp => Ok(self.close_clamped(&transitions)),
            IntervalPolicy::Reject => self.close_strict(&transitions),
        }
    }

    /// Each entry is the date a state begins; the last one runs to the horizon.
    ///
    /// First matching shape wins:
    /// remote-first, skip-hybrid with an RTO date, known hybrid date, fallback.
    fn transitions(&self, facts: &PolicyFacts) -> Vec<(NaiveDate, PolicyState)> {
        let wfh = facts.wfh_start.unwrap_or(self.default_wfh_start);

        if facts.remote_first {
            return vec![(wfh, PolicyState::RemoteFirst)];
        }

        match (facts.skip_hybrid, facts.hybrid, facts.rto) {
            (true, _, Some(rto)) => vec![(wfh, PolicyState::Wfh), (rto, PolicyState::Rto)],
            (_, Some(hybrid), Some(rto)) => vec![
                (wfh, PolicyState::Wfh),
                (hybrid, PolicyState::Hybrid),
                (rto, PolicyState::Rto),
            ],
            (_, Some(hybrid), None) => {
                vec![(wfh, PolicyState::Wfh), (hybrid, PolicyState::Hybrid)]
            }
            // not enough data: most likely current state is hybrid
            _ => vec![(wfh, PolicyState::Hybrid)],
        }
    }

    fn close_clamped(&self, transitions: &[(NaiveDate, PolicyState)]) -> Timeline {
        let mut segments = Vec::with_capacity(transitions.len());
        let mut cursor: Option<NaiveDate> = None;
        for (i, &(start, state)) in transitions.iter().enumerate() {
            let start = clamp(start, cursor, self.horizon_end);
            let end = transitions
                .get(i + 1)
                .map(|&(next, _)| clamp(next, Some(start), self.horizon_end))
                .unwrap_or(self.horizon_end);
            if start < end {
                segments.push(Segment { start, end, state });
            }
            cursor = Some(end);
        }
        segments
    }

    fn close_strict(
        &self,
        transitions: &[(NaiveDate, PolicyState)],
    ) -> Result<Timeline, TimelineError> {
        transitions
            .iter()
            .enumerate()
            .map(|(i, &(start, state))| {
                let end = transitions
                    .get(i + 1)
                    .map(|&(next, _)| next)
                    .unwrap_or(self.horizon_end);
                if start < end && end <= self.horizon_end {
                    Ok(Segment { start, end, state })
                } else {
                    Err(TimelineError::MalformedInterval { start, end, state })
                }
            })
            .collect()
    }
}

fn clamp(date: NaiveDate, floor: Option<NaiveDate>, ceiling: NaiveDate) -> NaiveDate {
    let date = match floor {
        Some(f) => date.max(f),
        None => date,
    };
    date.min(ceiling)
}
