use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::transaction::TransactionRecord;

const UNKNOWN_DATE: &str = "Unknown date";

/// Records sharing a calendar-day label, in first-seen order
#[derive(Debug, PartialEq)]
pub struct DayGroup<'a> {
    pub label: String,
    pub records: Vec<&'a TransactionRecord>,
}

/// Group records by calendar day relative to `now`: "Today", "Yesterday", otherwise `Jan 5, 2025`.
/// Display-only; the records are borrowed, not changed.
pub fn group_by_day<'a, Tz: TimeZone>(
    records: &'a [TransactionRecord],
    now: &DateTime<Tz>,
) -> Vec<DayGroup<'a>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let yesterday = today.pred_opt();

    let mut groups: Vec<DayGroup<'a>> = Vec::new();
    for record in records {
        let day = record
            .timestamp
            .as_deref()
            .and_then(parse_day_utc)
            .map(|utc| utc.with_timezone(&tz).date_naive());
        let label = day_label(day, today, yesterday);

        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.records.push(record),
            None => groups.push(DayGroup {
                label,
                records: vec![record],
            }),
        }
    }
    groups
}

/// [`group_by_day`] against the local clock
pub fn group_by_day_local(records: &[TransactionRecord]) -> Vec<DayGroup<'_>> {
    group_by_day(records, &Local::now())
}

fn day_label(day: Option<NaiveDate>, today: NaiveDate, yesterday: Option<NaiveDate>) -> String {
    match day {
        Some(d) if d == today => "Today".to_string(),
        Some(d) if Some(d) == yesterday => "Yesterday".to_string(),
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => UNKNOWN_DATE.to_string(),
    }
}

// RFC 3339 first, then a bare timestamp read as UTC
fn parse_day_utc(timestamp: &str) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(id: &str, timestamp: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            id: id.into(),
            timestamp: timestamp.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_labels() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let records = vec![
            at("a", Some("2025-03-10T08:00:00Z")),
            at("b", Some("2025-03-09T23:59:00Z")),
            at("c", Some("2025-01-05T10:00:00.000Z")),
            at("d", Some("2025-03-10T01:00:00Z")),
            at("e", Some("not a date")),
            at("f", None),
        ];

        let groups = group_by_day(&records, &now);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Today", "Yesterday", "Jan 5, 2025", "Unknown date"]);
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[3].records.len(), 2);
        // grouping borrows; the total is unchanged
        let total: usize = groups.iter().map(|g| g.records.len()).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn test_day_boundary_follows_clock_timezone() {
        // 23:30 UTC on the 9th is already the 10th at UTC+1
        let lagos = FixedOffset::east_opt(3600).unwrap();
        let now = lagos.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let records = vec![at("a", Some("2025-03-09T23:30:00Z"))];

        let groups = group_by_day(&records, &now);
        assert_eq!(groups[0].label, "Today");
    }

    #[test]
    fn test_naive_timestamps_read_as_utc() {
        assert!(parse_day_utc("2025-03-10T08:00:00.123").is_some());
        assert!(parse_day_utc("2025-03-10 08:00:00").is_some());
        assert!(parse_day_utc("").is_none());
    }
}
