use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::{Date, Month};

use super::repo_types::DailyRecord;

/// Which years a month filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearScope {
    Year(i32),
    AnyYear,
}

/// Persistence for per-day action logs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, user_id: i64, day: Date) -> anyhow::Result<Option<DailyRecord>>;

    /// Creates the record for `(user_id, day)` or replaces its payload.
    async fn upsert(&self, user_id: i64, day: Date, data: &str) -> anyhow::Result<DailyRecord>;

    async fn list_month(
        &self,
        user_id: i64,
        month: Month,
        scope: YearScope,
    ) -> anyhow::Result<Vec<DailyRecord>>;

    async fn list_year(&self, user_id: i64, year: i32) -> anyhow::Result<Vec<DailyRecord>>;
}

/// Inclusive `[first, last]` days of one month of one year.
pub fn month_bounds(year: i32, month: Month) -> anyhow::Result<(Date, Date)> {
    let first = Date::from_calendar_date(year, month, 1)
        .with_context(|| format!("invalid month {year}-{}", month as u8))?;
    let last = Date::from_calendar_date(year, month, month.length(year))
        .with_context(|| format!("invalid month {year}-{}", month as u8))?;
    Ok((first, last))
}

/// Inclusive `[first, last]` days of one calendar year.
pub fn year_bounds(year: i32) -> anyhow::Result<(Date, Date)> {
    let first = Date::from_calendar_date(year, Month::January, 1)
        .with_context(|| format!("invalid year {year}"))?;
    let last = Date::from_calendar_date(year, Month::December, 31)
        .with_context(|| format!("invalid year {year}"))?;
    Ok((first, last))
}

#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find(&self, user_id: i64, day: Date) -> anyhow::Result<Option<DailyRecord>> {
        let record = sqlx::query_as::<_, DailyRecord>(
            r#"
            SELECT id, user_id, day, data, created_at, updated_at
            FROM daily_records
            WHERE user_id = $1 AND day = $2
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.db)
        .await
        .context("find daily record")?;
        Ok(record)
    }

    async fn upsert(&self, user_id: i64, day: Date, data: &str) -> anyhow::Result<DailyRecord> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        // Last write wins: concurrent writers for the same day are not serialized.
        let record = sqlx::query_as::<_, DailyRecord>(
            r#"
            INSERT INTO daily_records (user_id, day, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, day)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            RETURNING id, user_id, day, data, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(day)
        .bind(data)
        .fetch_one(&mut *tx)
        .await
        .context("upsert daily record")?;
        tx.commit().await.context("commit tx")?;
        Ok(record)
    }

    async fn list_month(
        &self,
        user_id: i64,
        month: Month,
        scope: YearScope,
    ) -> anyhow::Result<Vec<DailyRecord>> {
        let rows = match scope {
            YearScope::Year(year) => {
                let (first, last) = month_bounds(year, month)?;
                sqlx::query_as::<_, DailyRecord>(
                    r#"
                    SELECT id, user_id, day, data, created_at, updated_at
                    FROM daily_records
                    WHERE user_id = $1 AND day BETWEEN $2 AND $3
                    ORDER BY day ASC
                    "#,
                )
                .bind(user_id)
                .bind(first)
                .bind(last)
                .fetch_all(&self.db)
                .await
            }
            YearScope::AnyYear => {
                sqlx::query_as::<_, DailyRecord>(
                    r#"
                    SELECT id, user_id, day, data, created_at, updated_at
                    FROM daily_records
                    WHERE user_id = $1 AND EXTRACT(MONTH FROM day)::INT = $2
                    ORDER BY day ASC
                    "#,
                )
                .bind(user_id)
                .bind(month as u8 as i32)
                .fetch_all(&self.db)
                .await
            }
        }
        .context("list daily records by month")?;
        Ok(rows)
    }

    async fn list_year(&self, user_id: i64, year: i32) -> anyhow::Result<Vec<DailyRecord>> {
        let (first, last) = year_bounds(year)?;
        let rows = sqlx::query_as::<_, DailyRecord>(
            r#"
            SELECT id, user_id, day, data, created_at, updated_at
            FROM daily_records
            WHERE user_id = $1 AND day BETWEEN $2 AND $3
            ORDER BY day ASC
            "#,
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(&self.db)
        .await
        .context("list daily records by year")?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn month_bounds_cover_whole_month() {
        assert_eq!(
            month_bounds(2024, Month::February).unwrap(),
            (date!(2024 - 02 - 01), date!(2024 - 02 - 29))
        );
        assert_eq!(
            month_bounds(2021, Month::December).unwrap(),
            (date!(2021 - 12 - 01), date!(2021 - 12 - 31))
        );
    }

    #[test]
    fn year_bounds_cover_whole_year() {
        assert_eq!(
            year_bounds(2021).unwrap(),
            (date!(2021 - 01 - 01), date!(2021 - 12 - 31))
        );
        assert_eq!(year_bounds(9999).unwrap().1, date!(9999 - 12 - 31));
    }

    #[test]
    fn out_of_range_year_is_an_error() {
        assert!(year_bounds(i32::MAX - 1).is_err());
    }
}
