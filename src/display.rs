use chrono::NaiveDate;
use serde::Serialize;

use crate::registry::MySignups;
use crate::slot::Slot;

/// One attendee as the page shows it. `can_remove` is evaluated per device:
/// admins may remove anyone, everyone else only the names their own device
/// added.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeView {
    pub name: String,
    pub can_remove: bool,
}

/// One slot card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub key: String,
    pub time_label: String,
    pub attendees: Vec<AttendeeView>,
}

/// One date bucket, slots in chronological order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSection {
    pub date: String,
    pub day_name: String,
    pub date_label: String,
    pub slots: Vec<SlotView>,
}

/// Partitions an already-sorted snapshot into per-date buckets.
///
/// Relies on the snapshot ordering (date ascending, then start time), so a
/// single linear pass produces buckets that are themselves in ascending
/// date order with slots in chronological order.
pub fn group_by_date(slots: &[Slot]) -> Vec<(&str, Vec<&Slot>)> {
    let mut sections: Vec<(&str, Vec<&Slot>)> = Vec::new();
    for slot in slots {
        match sections.last_mut() {
            Some((date, bucket)) if *date == slot.record.date => bucket.push(slot),
            _ => sections.push((slot.record.date.as_str(), vec![slot])),
        }
    }
    sections
}

/// Builds the grouped schedule the page renders, with per-attendee
/// removability for the requesting device.
pub fn schedule_view(slots: &[Slot], is_admin: bool, mine: &MySignups) -> Vec<DateSection> {
    group_by_date(slots)
        .into_iter()
        .map(|(date, bucket)| DateSection {
            date: date.to_string(),
            day_name: day_name(date),
            date_label: date_label(date),
            slots: bucket
                .into_iter()
                .map(|slot| SlotView {
                    key: slot.key.clone(),
                    time_label: time_range_label(slot),
                    attendees: slot
                        .record
                        .attendees
                        .iter()
                        .map(|name| AttendeeView {
                            name: name.clone(),
                            can_remove: is_admin || mine.contains(&slot.key, name),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Formats a wall-clock time on a 12-hour clock, e.g. "9:05 AM".
pub fn format_time(hour: u8, minute: u8) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, minute, period)
}

pub fn time_range_label(slot: &Slot) -> String {
    format!(
        "{} to {}",
        format_time(slot.record.start_hour, slot.record.start_minute),
        format_time(slot.record.end_hour, slot.record.end_minute)
    )
}

/// Weekday name for a YYYY-MM-DD date. Dates are validated at slot creation,
/// so the fallback only shows up for records written by other clients.
pub fn day_name(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Short human date, e.g. "1 June".
pub fn date_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%-d %B").to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotRecord;

    fn slot(date: &str, start_hour: u8, start_minute: u8, attendees: &[&str]) -> Slot {
        let record = SlotRecord {
            date: date.to_string(),
            start_hour,
            start_minute,
            end_hour: 23,
            end_minute: 0,
            attendees: attendees.iter().map(|n| n.to_string()).collect(),
            created_at: 0,
        };
        Slot {
            key: record.key(),
            record,
        }
    }

    #[test]
    fn test_grouping_preserves_order() {
        let slots = vec![
            slot("2024-06-01", 9, 0, &[]),
            slot("2024-06-01", 14, 0, &[]),
            slot("2024-06-02", 9, 0, &[]),
        ];

        let sections = group_by_date(&slots);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "2024-06-01");
        assert_eq!(sections[0].1.len(), 2);
        assert_eq!(sections[0].1[0].record.start_hour, 9);
        assert_eq!(sections[0].1[1].record.start_hour, 14);
        assert_eq!(sections[1].0, "2024-06-02");
        assert_eq!(sections[1].1.len(), 1);
    }

    #[test]
    fn test_grouping_empty_input() {
        assert!(group_by_date(&[]).is_empty());
    }

    #[test]
    fn test_format_time_twelve_hour_clock() {
        assert_eq!(format_time(0, 5), "12:05 AM");
        assert_eq!(format_time(9, 0), "9:00 AM");
        assert_eq!(format_time(12, 0), "12:00 PM");
        assert_eq!(format_time(23, 55), "11:55 PM");
    }

    #[test]
    fn test_day_and_date_labels() {
        assert_eq!(day_name("2024-06-01"), "Saturday");
        assert_eq!(date_label("2024-06-01"), "1 June");
        // Unparseable dates fall through untouched
        assert_eq!(day_name("someday"), "someday");
    }

    #[test]
    fn test_schedule_view_permissions() {
        let slots = vec![slot("2024-06-01", 9, 0, &["Ali", "Mary"])];
        let mut mine = MySignups::default();
        mine.add(&slots[0].key, "Ali");

        let sections = schedule_view(&slots, false, &mine);
        let attendees = &sections[0].slots[0].attendees;
        assert!(attendees[0].can_remove, "own signup is removable");
        assert!(!attendees[1].can_remove, "foreign signup is not");

        // The admin flag overrides the device registry
        let sections = schedule_view(&slots, true, &MySignups::default());
        assert!(sections[0].slots[0].attendees.iter().all(|a| a.can_remove));
    }
}
