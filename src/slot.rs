use serde::{Deserialize, Serialize};

/// Stored record for one bookable time window on a date.
///
/// This is the full wire schema: whole records are read and written in one
/// piece, never patched field by field. `attendees` keeps signup order;
/// `created_at` is informational and plays no part in ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub date: String,
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub created_at: i64,
}

impl SlotRecord {
    pub fn start_minutes(&self) -> u32 {
        total_minutes(self.start_hour, self.start_minute)
    }

    pub fn end_minutes(&self) -> u32 {
        total_minutes(self.end_hour, self.end_minute)
    }

    pub fn key(&self) -> String {
        slot_key(
            &self.date,
            self.start_hour,
            self.start_minute,
            self.end_hour,
            self.end_minute,
        )
    }
}

/// A record together with its derived key, as delivered in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub key: String,
    #[serde(flatten)]
    pub record: SlotRecord,
}

/// Derives the canonical key for a slot: the date followed by the start and
/// end times, zero-padded, 24-hour clock. Two calls with the same logical
/// times always produce the same key, so the key doubles as the uniqueness
/// constraint for the collection.
pub fn slot_key(date: &str, start_hour: u8, start_minute: u8, end_hour: u8, end_minute: u8) -> String {
    format!(
        "{}_{:02}{:02}-{:02}{:02}",
        date, start_hour, start_minute, end_hour, end_minute
    )
}

/// Minutes since midnight.
pub fn total_minutes(hour: u8, minute: u8) -> u32 {
    hour as u32 * 60 + minute as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_key_zero_padded() {
        assert_eq!(slot_key("2024-06-01", 9, 0, 11, 0), "2024-06-01_0900-1100");
        assert_eq!(slot_key("2024-06-01", 9, 5, 11, 30), "2024-06-01_0905-1130");
    }

    #[test]
    fn test_slot_key_deterministic_and_injective() {
        let a = slot_key("2024-06-01", 9, 0, 11, 0);
        let b = slot_key("2024-06-01", 9, 0, 11, 0);
        assert_eq!(a, b);

        // A five minute difference in any component yields a different key
        assert_ne!(
            slot_key("2024-06-01", 9, 0, 11, 0),
            slot_key("2024-06-01", 9, 5, 11, 0)
        );
        assert_ne!(
            slot_key("2024-06-01", 9, 0, 11, 0),
            slot_key("2024-06-01", 9, 0, 11, 5)
        );
        assert_ne!(
            slot_key("2024-06-01", 9, 0, 11, 0),
            slot_key("2024-06-02", 9, 0, 11, 0)
        );
    }

    #[test]
    fn test_total_minutes() {
        assert_eq!(total_minutes(0, 0), 0);
        assert_eq!(total_minutes(9, 30), 570);
        assert_eq!(total_minutes(23, 59), 1439);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = SlotRecord {
            date: "2024-06-01".to_string(),
            start_hour: 9,
            start_minute: 0,
            end_hour: 11,
            end_minute: 30,
            attendees: vec!["Mary".to_string()],
            created_at: 1717200000000,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["startHour"], 9);
        assert_eq!(json["endMinute"], 30);
        assert_eq!(json["createdAt"], 1717200000000i64);
        assert_eq!(json["attendees"][0], "Mary");
    }

    #[test]
    fn test_slot_serializes_flat() {
        let slot = Slot {
            key: "2024-06-01_0900-1130".to_string(),
            record: SlotRecord {
                date: "2024-06-01".to_string(),
                start_hour: 9,
                start_minute: 0,
                end_hour: 11,
                end_minute: 30,
                attendees: vec![],
                created_at: 0,
            },
        };

        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["key"], "2024-06-01_0900-1130");
        // Record fields sit beside the key, not nested under it
        assert_eq!(json["date"], "2024-06-01");
    }
}
