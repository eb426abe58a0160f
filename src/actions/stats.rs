use std::collections::HashMap;

use time::{util::days_in_year, Date};

use super::{dto::ActionEntry, dto::CapacityPoint, repo::year_bounds, repo_types::DailyRecord};

fn as_f64(n: &serde_json::Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}

/// Weighted volume of a day divided by the number of logged actions.
/// `None` for a day with no actions.
pub fn day_capacity(entries: &[ActionEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let total: f64 = entries
        .iter()
        .flat_map(|e| e.values.iter())
        .map(|v| as_f64(&v.numbers) * as_f64(&v.weight))
        .sum();
    Some(total / entries.len() as f64)
}

fn month_day(date: Date) -> String {
    format!("{:02}-{:02}", date.month() as u8, date.day())
}

/// One point per calendar day of `year`, in order, zero where nothing was
/// logged. Records outside `year` are ignored.
pub fn yearly_capacity(year: i32, records: &[DailyRecord]) -> anyhow::Result<Vec<CapacityPoint>> {
    let mut by_day: HashMap<Date, f64> = HashMap::new();
    for record in records.iter().filter(|r| r.day.year() == year) {
        if let Some(capacity) = day_capacity(&record.entries()?) {
            by_day.insert(record.day, capacity);
        }
    }

    let (first, last) = year_bounds(year)?;
    let mut points = Vec::with_capacity(days_in_year(year) as usize);
    let mut day = first;
    loop {
        points.push(CapacityPoint {
            month_day: month_day(day),
            capacity: by_day.get(&day).copied().unwrap_or(0.0),
        });
        match day.next_day() {
            Some(next) if day < last => day = next,
            _ => break,
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};

    fn record(day: Date, data: &str) -> DailyRecord {
        DailyRecord {
            id: 1,
            user_id: 1,
            day,
            data: data.to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn parse(raw: &str) -> Vec<ActionEntry> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn single_entry_capacity() {
        let entries = parse(r#"[{"name":"a","values":[{"numbers":2,"weight":3}]}]"#);
        assert_eq!(day_capacity(&entries), Some(6.0));
    }

    #[test]
    fn capacity_divides_by_entry_count_not_value_count() {
        let entries = parse(
            r#"[{"values":[{"numbers":1,"weight":2}]},{"values":[{"numbers":3,"weight":1}]}]"#,
        );
        assert_eq!(day_capacity(&entries), Some(2.5));

        let entries = parse(
            r#"[{"values":[{"numbers":1,"weight":2},{"numbers":3,"weight":1},{"numbers":5,"weight":1}]}]"#,
        );
        assert_eq!(day_capacity(&entries), Some(10.0));
    }

    #[test]
    fn integer_and_fractional_values_mix() {
        let entries = parse(r#"[{"values":[{"numbers":3,"weight":2.5}]}]"#);
        assert_eq!(day_capacity(&entries), Some(7.5));
    }

    #[test]
    fn empty_day_has_no_capacity() {
        assert_eq!(day_capacity(&[]), None);
    }

    #[test]
    fn empty_year_is_all_zero_and_complete() {
        let points = yearly_capacity(2021, &[]).unwrap();
        assert_eq!(points.len(), 365);
        assert!(points.iter().all(|p| p.capacity == 0.0));
        assert_eq!(points.first().unwrap().month_day, "01-01");
        assert_eq!(points.last().unwrap().month_day, "12-31");

        let mut seen = std::collections::HashSet::new();
        assert!(points.iter().all(|p| seen.insert(p.month_day.clone())));
        let keys: Vec<&str> = points.iter().map(|p| p.month_day.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn leap_year_has_366_points() {
        let points = yearly_capacity(2024, &[]).unwrap();
        assert_eq!(points.len(), 366);
        assert_eq!(points[59].month_day, "02-29");
    }

    #[test]
    fn last_representable_year_is_complete() {
        let points = yearly_capacity(9999, &[]).unwrap();
        assert_eq!(points.len(), 365);
        assert_eq!(points.last().unwrap().month_day, "12-31");
    }

    #[test]
    fn logged_days_land_on_their_date() {
        let records = vec![
            record(date!(2021 - 03 - 04), r#"[{"name":"a","values":[{"numbers":2,"weight":3}]}]"#),
            record(date!(2021 - 03 - 05), "[]"),
        ];
        let points = yearly_capacity(2021, &records).unwrap();
        let mar4 = points.iter().find(|p| p.month_day == "03-04").unwrap();
        let mar5 = points.iter().find(|p| p.month_day == "03-05").unwrap();
        assert_eq!(mar4.capacity, 6.0);
        assert_eq!(mar5.capacity, 0.0);
    }

    #[test]
    fn records_from_other_years_do_not_collide() {
        let records = vec![record(
            date!(2020 - 03 - 04),
            r#"[{"values":[{"numbers":9,"weight":9}]}]"#,
        )];
        let points = yearly_capacity(2021, &records).unwrap();
        assert!(points.iter().all(|p| p.capacity == 0.0));
    }

    #[test]
    fn corrupt_payload_is_an_error() {
        let records = vec![record(date!(2021 - 01 - 01), "not json")];
        assert!(yearly_capacity(2021, &records).is_err());
    }
}
