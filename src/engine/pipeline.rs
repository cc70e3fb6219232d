use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::classify::Classifier;
use super::dates;
use super::segments::{PolicyFacts, SegmentBuilder};
use super::sort::{self, SortKey};
use super::Timeline;
use crate::db::RawRecord;
use crate::error::TimelineError;
use crate::settings::Settings;

/// Hybrid field marker for rows without enough data to chart.
const LIMITED_DATA: &str = "limited data";

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub record: RawRecord,
    pub timeline: Timeline,
    pub sort_key: SortKey,
}

/// A record dropped because its dates could not form a valid timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub record: RawRecord,
    pub error: TimelineError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    /// Display order: descending sort key.
    pub entries: Vec<TimelineEntry>,
    pub rejected: Vec<Rejection>,
    pub limited_data: usize,
}

/// Parse → classify → build segments for each record, then order for display.
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: Classifier,
    builder: SegmentBuilder,
    undated_tiebreak: NaiveDate,
}

impl Pipeline {
    pub fn new(settings: &Settings) -> Self {
        let classifier = Classifier::with_extra(
            &settings.extra_remote_first_keywords,
            &settings.extra_skip_hybrid_keywords,
        );
        debug!(keywords = classifier.rules().len(), "classifier ready");
        Pipeline {
            classifier,
            builder: SegmentBuilder {
                default_wfh_start: settings.default_wfh_start,
                horizon_end: settings.horizon_end,
                policy: settings.interval_policy,
            },
            undated_tiebreak: settings.undated_tiebreak,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn run(&self, records: &[RawRecord]) -> Result<RunOutput, TimelineError> {
        if let Some(index) = records.iter().position(|r| r.name().is_empty()) {
            return Err(TimelineError::MissingIdentity { index });
        }

        let kept: Vec<&RawRecord> = records.iter().filter(|r| !is_limited_data(r)).collect();
        let limited_data = records.len() - kept.len();

        let results: Vec<_> = kept
            .par_iter()
            .map(|r| (*r, self.timeline(r), self.sort_key(r)))
            .collect();

        let mut out = RunOutput {
            limited_data,
            ..Default::default()
        };
        for (record, timeline, sort_key) in results {
            match timeline {
                Ok(timeline) => out.entries.push(TimelineEntry {
                    record: record.clone(),
                    timeline,
                    sort_key,
                }),
                Err(error) => {
                    warn!(employer = record.name(), %error, "rejecting record");
                    out.rejected.push(Rejection {
                        record: record.clone(),
                        error,
                    });
                }
            }
        }
        sort::sort_for_display(&mut out.entries, |e| e.sort_key);

        info!(
            records = records.len(),
            charted = out.entries.len(),
            rejected = out.rejected.len(),
            limited_data,
            "timelines built"
        );
        Ok(out)
    }

    pub fn facts(&self, record: &RawRecord) -> PolicyFacts {
        let hybrid_text = record.hybrid_transition_text.as_deref();
        PolicyFacts {
            wfh_start: dates::parse_opt(record.wfh_start_text.as_deref()),
            hybrid: dates::parse_opt(hybrid_text),
            rto: dates::parse_opt(record.rto_date_text.as_deref()),
            remote_first: self
                .classifier
                .is_remote_first(hybrid_text, record.notes_text.as_deref()),
            skip_hybrid: self.classifier.is_skip_hybrid(hybrid_text),
        }
    }

    pub fn timeline(&self, record: &RawRecord) -> Result<Timeline, TimelineError> {
        let facts = self.facts(record);
        debug!(employer = record.name(), ?facts, "classified");
        self.builder.build(&facts)
    }

    /// Reparses the raw text; does not depend on `facts`.
    pub fn sort_key(&self, record: &RawRecord) -> SortKey {
        sort::key(
            dates::parse_opt(record.rto_date_text.as_deref()),
            dates::parse_opt(record.hybrid_transition_text.as_deref()),
            self.undated_tiebreak,
        )
    }
}

fn is_limited_data(record: &RawRecord) -> bool {
    record
        .hybrid_transition_text
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains(LIMITED_DATA))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::engine::PolicyState;
    use crate::settings::{ymd, IntervalPolicy};
    use std::path::Path;

    fn record(name: &str, wfh: &str, hybrid: &str, rto: &str, notes: &str) -> RawRecord {
        let field = |s: &str| (!s.is_empty()).then(|| s.to_string());
        RawRecord {
            employer: field(name),
            wfh_start_text: field(wfh),
            hybrid_transition_text: field(hybrid),
            rto_date_text: field(rto),
            notes_text: field(notes),
        }
    }

    fn names(out: &RunOutput) -> Vec<&str> {
        out.entries.iter().map(|e| e.record.name()).collect()
    }

    #[test]
    fn orders_undated_then_hybrid_then_rto() {
        let records = vec![
            record("RtoCo", "March 2020", "", "January 2, 2025", ""),
            record("UndatedCo", "", "Not announced", "Not announced", ""),
            record("HybridCo", "", "January 2023", "", ""),
        ];
        let out = Pipeline::new(&Settings::default()).run(&records).unwrap();
        assert_eq!(names(&out), vec!["UndatedCo", "HybridCo", "RtoCo"]);
    }

    #[test]
    fn limited_data_rows_are_excluded() {
        let records = vec![
            record("A", "", "Limited data", "", ""),
            record("B", "", "limited DATA available", "", ""),
            record("C", "", "June 2021", "", ""),
        ];
        let out = Pipeline::new(&Settings::default()).run(&records).unwrap();
        assert_eq!(names(&out), vec!["C"]);
        assert_eq!(out.limited_data, 2);
    }

    #[test]
    fn missing_employer_aborts_run() {
        let records = vec![
            record("A", "", "June 2021", "", ""),
            record("  ", "", "June 2021", "", ""),
        ];
        let err = Pipeline::new(&Settings::default()).run(&records).unwrap_err();
        assert_eq!(err, TimelineError::MissingIdentity { index: 1 });
    }

    #[test]
    fn remote_first_from_notes() {
        let records = vec![record("Shopify", "March 2020", "", "", "Went digital-first in 2020")];
        let out = Pipeline::new(&Settings::default()).run(&records).unwrap();
        let t = &out.entries[0].timeline;
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].state, PolicyState::RemoteFirst);
        assert_eq!(t[0].start, ymd(2020, 3, 1));
    }

    #[test]
    fn skipped_hybrid_goes_straight_to_rto() {
        let records = vec![record("Tesla", "March 2020", "N/A (skipped)", "June 2022", "")];
        let out = Pipeline::new(&Settings::default()).run(&records).unwrap();
        let states: Vec<_> = out.entries[0].timeline.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![PolicyState::Wfh, PolicyState::Rto]);
        assert_eq!(out.entries[0].timeline[1].start, ymd(2022, 6, 1));
    }

    #[test]
    fn reject_policy_reports_instead_of_aborting() {
        let settings = Settings {
            interval_policy: IntervalPolicy::Reject,
            ..Settings::default()
        };
        let records = vec![
            record("Backwards", "", "June 2023", "June 2021", ""),
            record("Fine", "", "June 2021", "", ""),
        ];
        let out = Pipeline::new(&settings).run(&records).unwrap();
        assert_eq!(names(&out), vec!["Fine"]);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].record.name(), "Backwards");
    }

    #[test]
    fn extra_keywords_come_from_settings() {
        let settings = Settings {
            extra_remote_first_keywords: vec!["Virtual First".into()],
            ..Settings::default()
        };
        let records = vec![record("Dropbox", "", "", "", "Virtual First since Oct 2020")];
        let out = Pipeline::new(&settings).run(&records).unwrap();
        assert_eq!(out.entries[0].timeline[0].state, PolicyState::RemoteFirst);
    }

    #[test]
    fn fixture_timelines_hold_invariants() {
        let records = db::load_json(Path::new("tests/fixtures/bay_area_rto.json")).unwrap();
        let pipeline = Pipeline::new(&Settings::default());
        let out = pipeline.run(&records).unwrap();
        assert!(out.rejected.is_empty());
        assert!(out.limited_data >= 1);
        for entry in &out.entries {
            let t = &entry.timeline;
            let facts = pipeline.facts(&entry.record);
            let wfh = facts.wfh_start.unwrap_or(ymd(2020, 3, 15));
            assert_eq!(t[0].start, wfh, "{}", entry.record.name());
            assert_eq!(t[t.len() - 1].end, ymd(2026, 1, 31));
            assert!(t.iter().all(|s| s.start < s.end));
            assert!(t.windows(2).all(|w| w[0].end == w[1].start));
        }
        // sort keys never increase down the list
        assert!(out.entries.windows(2).all(|w| w[0].sort_key >= w[1].sort_key));
    }

    #[test]
    fn runs_are_idempotent() {
        let records = db::load_json(Path::new("tests/fixtures/bay_area_rto.json")).unwrap();
        let pipeline = Pipeline::new(&Settings::default());
        let first = pipeline.run(&records).unwrap();
        let second = pipeline.run(&records).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.entries.iter().map(|e| &e.timeline).collect::<Vec<_>>())
                .unwrap(),
            serde_json::to_string(&second.entries.iter().map(|e| &e.timeline).collect::<Vec<_>>())
                .unwrap()
        );
    }
}
