use std::collections::BTreeSet;

use anyhow::Context;
use time::{macros::format_description, Date, Month};
use tracing::{debug, info};

use super::{
    catalog::ActionCatalog,
    dto::{ActionEntry, CapacityPoint},
    repo::{RecordStore, YearScope},
    stats::yearly_capacity,
};
use crate::error::{AppError, AppResult};

/// Years the calendar endpoints accept.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

pub fn parse_day(raw: &str) -> AppResult<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn parse_month(raw: &str) -> AppResult<Month> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| AppError::bad_request(format!("invalid month '{raw}'")))
}

pub fn check_year(year: i32) -> AppResult<i32> {
    if YEAR_RANGE.contains(&year) {
        Ok(year)
    } else {
        Err(AppError::bad_request(format!("invalid year {year}")))
    }
}

/// `None` means the caller's default year; `any` opts into every year.
pub fn parse_year_scope(raw: Option<&str>, default_year: i32) -> AppResult<YearScope> {
    match raw.map(str::trim) {
        None | Some("") => Ok(YearScope::Year(default_year)),
        Some(s) if s.eq_ignore_ascii_case("any") => Ok(YearScope::AnyYear),
        Some(s) => s
            .parse::<i32>()
            .map_err(|_| AppError::bad_request(format!("invalid year '{s}'")))
            .and_then(check_year)
            .map(YearScope::Year),
    }
}

/// The day's entries with catalog labels applied. A missing record is an error.
pub async fn get_record(
    records: &dyn RecordStore,
    catalog: &ActionCatalog,
    user_id: i64,
    day: Date,
) -> AppResult<Vec<ActionEntry>> {
    let record = records
        .find(user_id, day)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no actions logged on {day}")))?;
    let mut entries = record.entries()?;
    catalog.decorate(&mut entries);
    Ok(entries)
}

pub async fn upsert_record(
    records: &dyn RecordStore,
    user_id: i64,
    day: Date,
    entries: &[ActionEntry],
) -> anyhow::Result<()> {
    let data = serde_json::to_string(entries).context("encode action entries")?;
    let record = records.upsert(user_id, day, &data).await?;
    info!(user_id, %day, record_id = record.id, count = entries.len(), "daily record saved");
    Ok(())
}

/// Ascending days of `month` that have at least one logged action.
pub async fn days_with_actions(
    records: &dyn RecordStore,
    user_id: i64,
    month: Month,
    scope: YearScope,
) -> anyhow::Result<Vec<u8>> {
    let rows = records.list_month(user_id, month, scope).await?;
    let mut days = BTreeSet::new();
    for row in &rows {
        if !row.entries()?.is_empty() {
            days.insert(row.day.day());
        }
    }
    debug!(user_id, ?month, ?scope, scanned = rows.len(), found = days.len(), "days with actions");
    Ok(days.into_iter().collect())
}

pub async fn capacity_of_year(
    records: &dyn RecordStore,
    user_id: i64,
    year: i32,
) -> anyhow::Result<Vec<CapacityPoint>> {
    let rows = records.list_year(user_id, year).await?;
    yearly_capacity(year, &rows)
}
