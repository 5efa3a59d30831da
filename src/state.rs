use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::google::{GoogleVerifier, IdentityVerifier};
use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{PgUserStore, UserStore};
use crate::auth::services::AuthService;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        // The Google client is built once here and injected; tests construct
        // an AuthService directly with a fake verifier.
        let verifier: Arc<dyn IdentityVerifier> =
            Arc::new(GoogleVerifier::new(config.google_client_id.clone()));

        Ok(Self::from_parts(db, config, verifier))
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.clone()));
        let auth = Arc::new(AuthService::new(
            store.clone(),
            verifier,
            JwtKeys::from_config(&config.jwt),
            config.trainer_invitation_code.clone(),
        ));
        Self {
            db,
            config,
            store,
            auth,
        }
    }
}
