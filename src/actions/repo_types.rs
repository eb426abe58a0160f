use anyhow::Context;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use super::dto::ActionEntry;

/// One user's log for one calendar day.
#[derive(Debug, Clone, FromRow)]
pub struct DailyRecord {
    pub id: i64,
    pub user_id: i64,
    pub day: Date,
    pub data: String, // JSON array of ActionEntry
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl DailyRecord {
    pub fn entries(&self) -> anyhow::Result<Vec<ActionEntry>> {
        serde_json::from_str(&self.data)
            .with_context(|| format!("decode daily record {} ({})", self.id, self.day))
    }
}
