use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Variant order is the editor's display order (Sunday first).
str_enum!(DayOfWeek {
    Sunday => "Sunday",
    Monday => "Monday",
    Tuesday => "Tuesday",
    Wednesday => "Wednesday",
    Thursday => "Thursday",
    Friday => "Friday",
    Saturday => "Saturday",
});

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

// What the slot resolver publishes when the appointment ledger cannot be read.
str_enum!(ReadFailurePolicy {
    FailOpen => "fail_open",
    FailClosed => "fail_closed",
});

impl Default for ReadFailurePolicy {
    fn default() -> Self {
        ReadFailurePolicy::FailOpen
    }
}

impl ReadFailurePolicy {
    /// Slots to publish for a day when booked slots cannot be excluded.
    pub fn fallback(&self, day_slots: &[String]) -> Vec<String> {
        match self {
            ReadFailurePolicy::FailOpen => day_slots.to_vec(),
            ReadFailurePolicy::FailClosed => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn day_names_round_trip() {
        for day in DayOfWeek::ALL {
            assert_eq!(DayOfWeek::from_str(day.as_str()).unwrap(), day);
        }
    }

    #[test]
    fn day_parse_is_exact() {
        assert!(DayOfWeek::from_str("monday").is_err());
        assert!(DayOfWeek::from_str("Mon").is_err());
        assert!(DayOfWeek::from_str("").is_err());
    }

    #[test]
    fn chrono_weekday_maps_to_canonical_name() {
        assert_eq!(DayOfWeek::from(Weekday::Mon).as_str(), "Monday");
        assert_eq!(DayOfWeek::from(Weekday::Sun).as_str(), "Sunday");
    }

    #[test]
    fn days_order_sunday_first() {
        assert!(DayOfWeek::Sunday < DayOfWeek::Monday);
        assert!(DayOfWeek::Friday < DayOfWeek::Saturday);
    }

    #[test]
    fn day_serializes_as_canonical_name() {
        let json = serde_json::to_string(&DayOfWeek::Wednesday).unwrap();
        assert_eq!(json, "\"Wednesday\"");
    }

    #[test]
    fn policy_defaults_to_fail_open() {
        assert_eq!(ReadFailurePolicy::default(), ReadFailurePolicy::FailOpen);
        assert_eq!(
            ReadFailurePolicy::from_str("fail_closed").unwrap(),
            ReadFailurePolicy::FailClosed
        );
    }

    #[test]
    fn policy_fallback() {
        let slots = vec!["09:00 AM".to_string(), "10:00 AM".to_string()];
        assert_eq!(ReadFailurePolicy::FailOpen.fallback(&slots), slots);
        assert!(ReadFailurePolicy::FailClosed.fallback(&slots).is_empty());
    }
}
