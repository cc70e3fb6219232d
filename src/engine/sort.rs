use chrono::NaiveDate;

/// Display bucket; compared before the tiebreak date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Rto = 0,
    Hybrid = 1,
    Undated = 2,
}

/// Field order matters: the derived `Ord` compares priority, then date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub priority: Priority,
    pub tiebreak: NaiveDate,
}

pub fn key(rto: Option<NaiveDate>, hybrid: Option<NaiveDate>, undated: NaiveDate) -> SortKey {
    match (rto, hybrid) {
        (Some(date), _) => SortKey {
            priority: Priority::Rto,
            tiebreak: date,
        },
        (None, Some(date)) => SortKey {
            priority: Priority::Hybrid,
            tiebreak: date,
        },
        (None, None) => SortKey {
            priority: Priority::Undated,
            tiebreak: undated,
        },
    }
}

/// Sort descending by key. Equal keys keep their input order.
pub fn sort_for_display<T>(items: &mut [T], key_of: impl Fn(&T) -> SortKey) {
    items.sort_by(|a, b| key_of(b).cmp(&key_of(a)));
}
