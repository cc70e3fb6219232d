//! Engine settings.
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//! 1. built-in defaults (`Settings::default()`)
//! 2. `rto_timeline.toml` in the working directory, or the `--config` path
//! 3. `RTO_*` environment variables (e.g. `RTO_HORIZON_END=2026-06-30`)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::Config;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "rto_timeline";

/// What to do with an interval whose start is not before its end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalPolicy {
    /// Clamp boundaries into order and drop zero-width segments.
    #[default]
    Clamp,
    /// Refuse the record with `MalformedInterval`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Milestone {
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub horizon_end: NaiveDate,
    pub window_start: NaiveDate,
    pub default_wfh_start: NaiveDate,
    pub undated_tiebreak: NaiveDate,
    pub summary_as_of: NaiveDate,
    pub interval_policy: IntervalPolicy,
    pub extra_remote_first_keywords: Vec<String>,
    pub extra_skip_hybrid_keywords: Vec<String>,
    pub milestones: Vec<Milestone>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            horizon_end: ymd(2026, 1, 31),
            window_start: ymd(2020, 1, 1),
            default_wfh_start: ymd(2020, 3, 15),
            undated_tiebreak: ymd(2099, 1, 1),
            summary_as_of: ymd(2026, 1, 20),
            interval_policy: IntervalPolicy::Clamp,
            extra_remote_first_keywords: Vec::new(),
            extra_skip_hybrid_keywords: Vec::new(),
            milestones: vec![
                Milestone {
                    date: ymd(2020, 3, 15),
                    label: "COVID Lockdowns".into(),
                },
                Milestone {
                    date: ymd(2022, 6, 1),
                    label: "Tesla/Twitter RTO".into(),
                },
                Milestone {
                    date: ymd(2025, 1, 2),
                    label: "Amazon 5-Day".into(),
                },
            ],
        }
    }
}

impl Settings {
    /// Load settings; a missing default file is fine, a missing explicit one is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("RTO"))
            .build()
            .context("Failed to read settings")?;
        settings
            .try_deserialize()
            .context("Invalid settings")
    }
}

/// Calendar date from literal parts; falls back to the epoch for impossible dates.
pub(crate) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_dates() {
        let s = Settings::default();
        assert_eq!(s.horizon_end, ymd(2026, 1, 31));
        assert_eq!(s.default_wfh_start, ymd(2020, 3, 15));
        assert_eq!(s.undated_tiebreak, ymd(2099, 1, 1));
        assert_eq!(s.interval_policy, IntervalPolicy::Clamp);
        assert_eq!(s.milestones.len(), 3);
        assert_eq!(s.milestones[2].date, ymd(2025, 1, 2));
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("rto_settings_{}.toml", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "horizon_end = \"2026-06-30\"").unwrap();
        writeln!(f, "interval_policy = \"reject\"").unwrap();
        writeln!(f, "extra_remote_first_keywords = [\"distributed by design\"]").unwrap();
        drop(f);

        let s = Settings::load(Some(path.as_path())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(s.horizon_end, ymd(2026, 6, 30));
        assert_eq!(s.interval_policy, IntervalPolicy::Reject);
        assert_eq!(s.extra_remote_first_keywords, vec!["distributed by design"]);
        // untouched keys keep their defaults
        assert_eq!(s.default_wfh_start, ymd(2020, 3, 15));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = Path::new("/nonexistent/rto_timeline.toml");
        assert!(Settings::load(Some(path)).is_err());
    }
}
