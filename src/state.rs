use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{AdminAuth, TokenSigner},
    config::Config,
    db::create_pool,
    store::{MemoryStore, PgStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// `None` leaves write routes open.
    pub admin: Option<Arc<AdminAuth>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, admin: Option<AdminAuth>) -> Self {
        Self {
            store,
            admin: admin.map(Arc::new),
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                info!("Connecting to database...");
                let store = PgStore::new(create_pool(url, config.max_connections).await?);
                if config.run_migrations {
                    info!("Running migrations...");
                    store.migrate().await?;
                }
                Arc::new(store)
            }
            None => {
                warn!("DATABASE_URL not set, data lives in memory and is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::new(store, admin_auth(config)?))
    }
}

fn admin_auth(config: &Config) -> anyhow::Result<Option<AdminAuth>> {
    let Some(password) = &config.admin_password else {
        warn!("ADMIN_PASSWORD not set, write routes are open to everyone");
        return Ok(None);
    };

    let secret = config.token_secret.clone().unwrap_or_else(|| {
        info!("TOKEN_SECRET not set, admin tokens will not survive a restart");
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    });

    let signer = TokenSigner::new(secret, config.token_ttl_secs)
        .map_err(|e| anyhow::anyhow!("Invalid TOKEN_SECRET: {e}"))?;

    Ok(Some(AdminAuth::new(password, signer)))
}
