use csv::WriterBuilder;

use crate::display::{day_name, format_time};
use crate::slot::Slot;

/// Renders the full roster as CSV, one row per signup. Slots with no
/// signups still get a row so the printout shows every open window.
pub fn roster_csv(slots: &[Slot]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(["date", "day", "start", "end", "attendee"])?;

    for slot in slots {
        let date = slot.record.date.as_str();
        let day = day_name(date);
        let start = format_time(slot.record.start_hour, slot.record.start_minute);
        let end = format_time(slot.record.end_hour, slot.record.end_minute);

        if slot.record.attendees.is_empty() {
            wtr.write_record([date, day.as_str(), start.as_str(), end.as_str(), ""])?;
        } else {
            for name in &slot.record.attendees {
                wtr.write_record([date, day.as_str(), start.as_str(), end.as_str(), name.as_str()])?;
            }
        }
    }

    Ok(wtr.into_inner()?)
}
