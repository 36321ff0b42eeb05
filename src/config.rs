// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{BookingRepository, KitchenRepository, PropertyRepository, SessionRepository, UserRepository, VenueRepository},
    services::{
        DashboardService, IdentityProvider, ListingService, LocalDiskStorage, LocalIdentityProvider, ObjectStorage,
        SessionNotifier, UploadService,
    },
    wizard::WizardStore,
};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// Settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub public_upload_url: String,
    pub max_upload_bytes: usize,
    pub session_ttl_days: i64,
    pub db_max_connections: u32,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            upload_dir: optional("UPLOAD_DIR", PathBuf::from("./uploads"))?,
            public_upload_url: optional("PUBLIC_UPLOAD_URL", "/uploads".to_string())?,
            max_upload_bytes: optional("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_ttl_days: optional("SESSION_TTL_DAYS", 7)?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: SessionNotifier,
    pub listing_service: ListingService,
    pub dashboard_service: DashboardService,
    pub upload_service: UploadService,
    pub wizard_store: WizardStore,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("connecting to the database")?;

        tracing::info!(max_connections = config.db_max_connections, "database pool ready");

        let notifier = SessionNotifier::default();
        let identity = LocalIdentityProvider::new(
            db_pool.clone(),
            UserRepository::new(db_pool.clone()),
            SessionRepository::new(db_pool.clone()),
            config.jwt_secret.clone(),
            chrono::Duration::days(config.session_ttl_days),
            notifier.clone(),
        );
        let storage = LocalDiskStorage::new(config.upload_dir.clone(), config.public_upload_url.clone());

        Ok(Self::assemble(db_pool, config, Arc::new(identity), notifier, Arc::new(storage)))
    }

    /// Wires repositories and services around an already-built pool and
    /// identity provider.
    pub fn assemble(
        db_pool: PgPool,
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        notifier: SessionNotifier,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let users = UserRepository::new(db_pool.clone());
        let properties = PropertyRepository::new(db_pool.clone());
        let venues = VenueRepository::new(db_pool.clone());
        let kitchens = KitchenRepository::new(db_pool.clone());
        let bookings = BookingRepository::new(db_pool.clone());

        let listing_service =
            ListingService::new(db_pool.clone(), properties.clone(), venues.clone(), kitchens.clone());
        let dashboard_service = DashboardService::new(users, properties, venues, kitchens, bookings);
        let upload_service = UploadService::new(storage, config.max_upload_bytes);

        Self {
            db_pool,
            config: Arc::new(config),
            identity,
            notifier,
            listing_service,
            dashboard_service,
            upload_service,
            wizard_store: WizardStore::default(),
        }
    }
}
