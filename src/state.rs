use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::{AppConfig, JwtConfig, StoreBackend};
use crate::memory::MemoryStore;
use crate::profile::repo::{PgProfileStore, ProfileStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    /// Present only for the postgres backend; used to run migrations.
    pub db: Option<PgPool>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        match config.store_backend {
            StoreBackend::Postgres => {
                let db = crate::db::connect(&config.database_url).await?;
                Ok(Self {
                    users: Arc::new(PgUserStore::new(db.clone())),
                    profiles: Arc::new(PgProfileStore::new(db.clone())),
                    db: Some(db),
                    config,
                })
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Ok(Self::with_memory(config, MemoryStore::new()))
            }
        }
    }

    pub fn with_memory(config: Arc<AppConfig>, store: MemoryStore) -> Self {
        Self {
            config,
            users: Arc::new(store.clone()),
            profiles: Arc::new(store),
            db: None,
        }
    }

    /// In-memory state with a fixed test signing key.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: String::new(),
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
            host: "127.0.0.1".into(),
            port: 0,
            store_backend: StoreBackend::Memory,
        });
        Self::with_memory(config, MemoryStore::new())
    }
}
