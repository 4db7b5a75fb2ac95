//! Slot-label catalog and time-of-day helpers.
//!
//! Labels are plain strings ("09:00 AM"). The catalog fixes the editor's
//! choices and the sort order; labels outside it are still accepted.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::models::{DayOfWeek, WeeklyAvailability};

/// Every bookable slot label, in chronological order.
pub const SLOT_CATALOG: [&str; 6] = [
    "09:00 AM",
    "10:00 AM",
    "11:00 AM",
    "02:00 PM",
    "03:00 PM",
    "04:00 PM",
];

/// Parse a slot label into a time of day.
pub fn slot_time(label: &str) -> Option<NaiveTime> {
    let trimmed = label.trim();
    NaiveTime::parse_from_str(trimmed, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%I:%M%p"))
        .ok()
}

/// Chronological order; labels that do not parse sort last, by text.
pub fn compare_slots(a: &str, b: &str) -> Ordering {
    match (slot_time(a), slot_time(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn sort_slots(slots: &mut [String]) {
    slots.sort_by(|a, b| compare_slots(a, b));
}

pub fn weekday_of(date: NaiveDate) -> DayOfWeek {
    date.weekday().into()
}

/// Canonical English weekday name, as used for template keys.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    weekday_of(date).as_str()
}

/// Flip one slot on or off for a day, keeping the day sorted.
///
/// Returns `true` when the slot is now offered.
pub fn toggle_slot(template: &mut WeeklyAvailability, day: DayOfWeek, label: &str) -> bool {
    let mut slots = template.slots_for(day).to_vec();
    let now_offered = match slots.iter().position(|s| s == label) {
        Some(index) => {
            slots.remove(index);
            false
        }
        None => {
            slots.push(label.to_string());
            sort_slots(&mut slots);
            true
        }
    };
    template.set_day(day, slots);
    now_offered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn catalog_is_chronological() {
        let mut sorted = strings(&SLOT_CATALOG);
        sort_slots(&mut sorted);
        assert_eq!(sorted, strings(&SLOT_CATALOG));
    }

    #[test]
    fn parses_twelve_hour_labels() {
        assert_eq!(slot_time("09:00 AM"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(slot_time("02:00 PM"), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(slot_time("12:00 PM"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(slot_time("12:00 AM"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(slot_time(" 04:00PM "), NaiveTime::from_hms_opt(16, 0, 0));
        assert_eq!(slot_time("lunch"), None);
    }

    #[test]
    fn afternoon_sorts_after_morning_despite_text_order() {
        // "02:00 PM" < "09:00 AM" as text.
        let mut slots = strings(&["02:00 PM", "11:00 AM", "09:00 AM"]);
        sort_slots(&mut slots);
        assert_eq!(slots, strings(&["09:00 AM", "11:00 AM", "02:00 PM"]));
    }

    #[test]
    fn unparseable_labels_sort_last() {
        let mut slots = strings(&["evening", "10:00 AM", "anytime", "09:00 AM"]);
        sort_slots(&mut slots);
        assert_eq!(slots, strings(&["09:00 AM", "10:00 AM", "anytime", "evening"]));
    }

    #[test]
    fn weekday_names() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(weekday_name(monday), "Monday");
        assert_eq!(weekday_name(monday.succ_opt().unwrap()), "Tuesday");
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(weekday_of(sunday), DayOfWeek::Sunday);
    }

    #[test]
    fn toggle_adds_sorted_then_removes() {
        let mut template = WeeklyAvailability::new();
        assert!(toggle_slot(&mut template, DayOfWeek::Monday, "02:00 PM"));
        assert!(toggle_slot(&mut template, DayOfWeek::Monday, "09:00 AM"));
        assert_eq!(
            template.slots_for(DayOfWeek::Monday),
            ["09:00 AM", "02:00 PM"]
        );

        assert!(!toggle_slot(&mut template, DayOfWeek::Monday, "09:00 AM"));
        assert_eq!(template.slots_for(DayOfWeek::Monday), ["02:00 PM"]);

        assert!(!toggle_slot(&mut template, DayOfWeek::Monday, "02:00 PM"));
        assert!(template.is_empty());
    }

    #[test]
    fn toggle_accepts_labels_outside_catalog() {
        let mut template = WeeklyAvailability::new();
        assert!(toggle_slot(&mut template, DayOfWeek::Friday, "05:30 PM"));
        assert_eq!(template.slots_for(DayOfWeek::Friday), ["05:30 PM"]);
    }
}
