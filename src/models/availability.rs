use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::enums::DayOfWeek;

/// A counsellor's recurring weekly template: weekday → ordered slot labels.
///
/// Every construction path goes through [`WeeklyAvailability::set_day`], so
/// slots within a day are unique and days without slots are absent.
/// Deserialization is lenient: unknown weekday keys, non-array day values
/// and non-string slot entries are dropped rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct WeeklyAvailability {
    days: BTreeMap<DayOfWeek, Vec<String>>,
}

impl WeeklyAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots configured for `day`, empty when the day was never populated.
    pub fn slots_for(&self, day: DayOfWeek) -> &[String] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the slots of one day. Duplicates keep their first position.
    pub fn set_day(&mut self, day: DayOfWeek, slots: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(slots.len());
        for slot in slots {
            if !unique.contains(&slot) {
                unique.push(slot);
            }
        }

        if unique.is_empty() {
            self.days.remove(&day);
        } else {
            self.days.insert(day, unique);
        }
    }

    pub fn with_day<I, S>(mut self, day: DayOfWeek, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_day(day, slots.into_iter().map(Into::into).collect());
        self
    }

    pub fn days(&self) -> impl Iterator<Item = (DayOfWeek, &[String])> {
        self.days.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of days with at least one slot.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Decode a stored document, keeping only well-formed days.
    pub fn from_document(doc: &Value) -> Self {
        let mut template = Self::new();
        let Some(map) = doc.as_object() else {
            return template;
        };

        for (key, value) in map {
            let Ok(day) = DayOfWeek::from_str(key) else {
                continue;
            };
            let Some(entries) = value.as_array() else {
                continue;
            };
            let slots = entries
                .iter()
                .filter_map(|entry| entry.as_str().map(str::to_string))
                .collect();
            template.set_day(day, slots);
        }

        template
    }

    pub fn to_document(&self) -> Value {
        let map = self
            .days
            .iter()
            .map(|(day, slots)| (day.as_str().to_string(), Value::from(slots.clone())))
            .collect::<serde_json::Map<String, Value>>();
        Value::Object(map)
    }
}

impl Serialize for WeeklyAvailability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.days.serialize(serializer)
    }
}

impl From<Value> for WeeklyAvailability {
    fn from(doc: Value) -> Self {
        Self::from_document(&doc)
    }
}
