use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Exact-match predicate over the appointment ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingFilter {
    pub counsellor_id: String,
    pub date: NaiveDate,
}

impl BookingFilter {
    pub fn new(counsellor_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            counsellor_id: counsellor_id.into(),
            date,
        }
    }

    pub fn matches(&self, change: &LedgerChange) -> bool {
        self.counsellor_id == change.counsellor_id && self.date == change.date
    }
}

/// Broadcast by the ledger whenever an appointment is created or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerChange {
    pub counsellor_id: String,
    pub date: NaiveDate,
}

/// One publication of the resolver: the full list of bookable slots for a
/// (counsellor, date) pair. Never a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub counsellor_id: String,
    pub date: Option<NaiveDate>,
    pub slots: Vec<String>,
    /// Set when a read failed and the slots come from the failure policy
    /// rather than from a successful read of both inputs.
    pub degraded: bool,
}

impl SlotSnapshot {
    pub fn empty(counsellor_id: &str, date: Option<NaiveDate>) -> Self {
        Self {
            counsellor_id: counsellor_id.to_string(),
            date,
            slots: Vec::new(),
            degraded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn filter_matches_exact_pair_only() {
        let filter = BookingFilter::new("c-1", day(1));
        assert!(filter.matches(&LedgerChange { counsellor_id: "c-1".into(), date: day(1) }));
        assert!(!filter.matches(&LedgerChange { counsellor_id: "c-1".into(), date: day(2) }));
        assert!(!filter.matches(&LedgerChange { counsellor_id: "c-2".into(), date: day(1) }));
    }

    #[test]
    fn snapshot_serializes_date_as_calendar_string() {
        let snapshot = SlotSnapshot {
            counsellor_id: "c-1".into(),
            date: Some(day(1)),
            slots: vec!["09:00 AM".into()],
            degraded: false,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["slots"][0], "09:00 AM");
    }
}
