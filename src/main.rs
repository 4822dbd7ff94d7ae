use assessment_backend::{
    config::{get_config, init_config, LogFormat},
    database::{
        pool::{create_pool, run_migrations},
        MemoryStore, PgStore,
    },
    routes,
    services::auth_service::AuthSettings,
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let auth = AuthSettings {
        jwt_secret: config.jwt_secret.clone(),
        expiry_hours: config.jwt_expiry_hours,
    };

    let app_state = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("Connected to PostgreSQL, migrations applied");
            AppState::new(Arc::new(PgStore::new(pool)), auth)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data will not survive a restart");
            AppState::new(Arc::new(MemoryStore::new()), auth)
        }
    };

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if app_state.auth_service.bootstrap_admin(email, password).await? {
            info!(email = %email, "Created bootstrap admin");
        }
    }

    let app = routes::build_router(app_state, config.api_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
