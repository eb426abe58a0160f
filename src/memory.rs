//! In-process stores backed by ordered maps, used by the test suites in
//! place of Postgres.

use std::collections::BTreeMap;

use async_trait::async_trait;
use time::{Date, Month, OffsetDateTime};
use tokio::sync::RwLock;

use crate::{
    actions::{
        repo::{RecordStore, YearScope},
        repo_types::DailyRecord,
    },
    auth::{
        repo::{CreateUserError, UserStore},
        repo_types::User,
    },
};

#[derive(Default)]
struct UserTable {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    table: RwLock<UserTable>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, CreateUserError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.username == username) {
            return Err(CreateUserError::UsernameTaken);
        }
        table.last_id += 1;
        let user = User {
            id: table.last_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }
}

#[derive(Default)]
struct RecordTable {
    last_id: i64,
    rows: BTreeMap<(i64, Date), DailyRecord>,
}

impl RecordTable {
    fn for_user(&self, user_id: i64) -> impl Iterator<Item = &DailyRecord> + '_ {
        self.rows
            .iter()
            .filter(move |((owner, _), _)| *owner == user_id)
            .map(|(_, r)| r)
    }
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    table: RwLock<RecordTable>,
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find(&self, user_id: i64, day: Date) -> anyhow::Result<Option<DailyRecord>> {
        Ok(self.table.read().await.rows.get(&(user_id, day)).cloned())
    }

    async fn upsert(&self, user_id: i64, day: Date, data: &str) -> anyhow::Result<DailyRecord> {
        let mut table = self.table.write().await;
        let now = OffsetDateTime::now_utc();
        let next_id = table.last_id + 1;
        let record = table
            .rows
            .entry((user_id, day))
            .and_modify(|r| {
                r.data = data.to_string();
                r.updated_at = now;
            })
            .or_insert_with(|| DailyRecord {
                id: next_id,
                user_id,
                day,
                data: data.to_string(),
                created_at: now,
                updated_at: now,
            })
            .clone();
        if record.id == next_id {
            table.last_id = next_id;
        }
        Ok(record)
    }

    async fn list_month(
        &self,
        user_id: i64,
        month: Month,
        scope: YearScope,
    ) -> anyhow::Result<Vec<DailyRecord>> {
        let table = self.table.read().await;
        Ok(table
            .for_user(user_id)
            .filter(|r| r.day.month() == month)
            .filter(|r| match scope {
                YearScope::Year(year) => r.day.year() == year,
                YearScope::AnyYear => true,
            })
            .cloned()
            .collect())
    }

    async fn list_year(&self, user_id: i64, year: i32) -> anyhow::Result<Vec<DailyRecord>> {
        let table = self.table.read().await;
        Ok(table
            .for_user(user_id)
            .filter(|r| r.day.year() == year)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[tokio::test]
    async fn user_ids_are_sequential_and_usernames_unique() {
        let store = InMemoryUserStore::default();
        let a = store.create("a", "h").await.unwrap();
        let b = store.create("b", "h").await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert!(matches!(
            store.create("a", "h2").await.unwrap_err(),
            CreateUserError::UsernameTaken
        ));
        assert_eq!(store.find_by_username("b").await.unwrap().unwrap().id, 2);
        assert!(store.find_by_id(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_keeps_identity_and_replaces_payload() {
        let store = InMemoryRecordStore::default();
        let day = date!(2021 - 06 - 01);
        let first = store.upsert(1, day, "[1]").await.unwrap();
        let second = store.upsert(1, day, "[2]").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.find(1, day).await.unwrap().unwrap().data, "[2]");

        let other = store.upsert(1, date!(2021 - 06 - 02), "[]").await.unwrap();
        assert_eq!(other.id, first.id + 1);
    }

    #[tokio::test]
    async fn listings_are_ordered_by_day() {
        let store = InMemoryRecordStore::default();
        store.upsert(1, date!(2021 - 06 - 09), "[]").await.unwrap();
        store.upsert(1, date!(2021 - 06 - 01), "[]").await.unwrap();
        store.upsert(2, date!(2021 - 06 - 05), "[]").await.unwrap();
        let days: Vec<u8> = store
            .list_month(1, Month::June, YearScope::Year(2021))
            .await
            .unwrap()
            .iter()
            .map(|r| r.day.day())
            .collect();
        assert_eq!(days, vec![1, 9]);
        assert_eq!(store.list_year(2, 2021).await.unwrap().len(), 1);
    }
}
