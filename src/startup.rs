//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use crate::application::services::{
    ClubServiceImpl, EventServiceImpl, ListingServiceImpl, PostServiceImpl, UploadServiceImpl,
    UserServiceImpl,
};
use crate::config::{Settings, StorageBackend};
use crate::infrastructure::database;
use crate::infrastructure::repositories::Repositories;
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};
use crate::shared::error;
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub settings: Arc<Settings>,
    /// Present for the postgres backend; used by the readiness probe
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn new(repos: Repositories, settings: Settings, db: Option<PgPool>) -> Self {
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            settings.snowflake.epoch,
        ));
        Self {
            repos,
            snowflake,
            settings: Arc::new(settings),
            db,
        }
    }

    /// State over fresh in-memory repositories
    pub fn in_memory(settings: Settings) -> Self {
        Self::new(Repositories::in_memory(), settings, None)
    }

    pub fn user_service(&self) -> UserServiceImpl {
        UserServiceImpl::new(
            self.repos.users.clone(),
            self.repos.events.clone(),
            self.repos.clubs.clone(),
            self.repos.listings.clone(),
            self.repos.posts.clone(),
            self.snowflake.clone(),
        )
    }

    pub fn event_service(&self) -> EventServiceImpl {
        EventServiceImpl::new(
            self.repos.events.clone(),
            self.repos.users.clone(),
            self.snowflake.clone(),
        )
    }

    pub fn club_service(&self) -> ClubServiceImpl {
        ClubServiceImpl::new(
            self.repos.clubs.clone(),
            self.repos.users.clone(),
            self.snowflake.clone(),
        )
    }

    pub fn listing_service(&self) -> ListingServiceImpl {
        ListingServiceImpl::new(
            self.repos.listings.clone(),
            self.repos.users.clone(),
            self.snowflake.clone(),
        )
    }

    pub fn post_service(&self) -> PostServiceImpl {
        PostServiceImpl::new(
            self.repos.posts.clone(),
            self.repos.users.clone(),
            self.snowflake.clone(),
        )
    }

    pub fn upload_service(&self) -> UploadServiceImpl {
        UploadServiceImpl::new(self.settings.uploads.clone())
    }
}

/// Router with every middleware layer applied
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(logging::create_trace_layer())
            .layer(cors)
            .layer(CompressionLayer::new()),
    )
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        error::expose_internal_errors(settings.is_development());
        handlers::health::init_server_start();

        let (repos, db) = match settings.storage.backend {
            StorageBackend::Postgres => {
                let pool = database::create_pool(&settings.database)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&pool).await?;
                    tracing::info!("Database migrations applied");
                }

                (Repositories::postgres(pool.clone()), Some(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                (Repositories::in_memory(), None)
            }
        };

        let addr = settings.server_addr();
        let state = AppState::new(repos, settings, db);
        let router = build_router(state);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
