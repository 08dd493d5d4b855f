use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod jwt;
mod middleware;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod session;
mod validation;

use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::{
    config::AppConfig,
    jwt::TokenService,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{RoleRepository, UserRepository},
    session::CookieSettings,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_service: TokenService,
    pub user_repository: UserRepository,
    pub role_repository: RoleRepository,
    pub rate_limiter: RateLimiter,
    pub cookies: CookieSettings,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting authentication service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let pool = config::init_pool(&config.database).await?;

    if config::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Token service holds the process-wide signing secret; it is injected
    // here once and never rotated at runtime.
    let token_service = TokenService::new(&config.token);

    let user_repository = UserRepository::new(pool.clone());
    let role_repository = RoleRepository::new(pool.clone());
    let rate_limiter = RateLimiter::new(RateLimiterConfig::default());

    let cookies = CookieSettings {
        environment: config.environment,
        max_age_seconds: token_service.ttl_seconds(),
    };

    let app_state = AppState {
        db_pool: pool,
        token_service,
        user_repository,
        role_repository,
        rate_limiter,
        cookies,
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Authentication service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
