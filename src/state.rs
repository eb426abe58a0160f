use crate::actions::{
    catalog::ActionCatalog,
    repo::{PgRecordStore, RecordStore},
};
use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::db;
use crate::memory::{InMemoryRecordStore, InMemoryUserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub records: Arc<dyn RecordStore>,
    pub catalog: Arc<ActionCatalog>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to Postgres, applies migrations and loads the action catalog.
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;
        let catalog = ActionCatalog::load(config.catalog_path.as_deref())?;

        Ok(Self::from_parts(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgRecordStore::new(pool)),
            Arc::new(catalog),
            Arc::new(config),
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        records: Arc<dyn RecordStore>,
        catalog: Arc<ActionCatalog>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            records,
            catalog,
            config,
        }
    }

    /// Empty in-process stores with the built-in catalog.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            Arc::new(InMemoryUserStore::default()),
            Arc::new(InMemoryRecordStore::default()),
            Arc::new(ActionCatalog::builtin()),
            Arc::new(config),
        )
    }
}
