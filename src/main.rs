//! Friend Chat server binary.
//!
//! Loads configuration, wires adapters to ports, and serves the HTTP API
//! until Ctrl-C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use friend_chat::adapters::ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
use friend_chat::adapters::auth::{JwtConfig, JwtSessionValidator};
use friend_chat::adapters::http::{app_router, AppState, RouterOptions};
use friend_chat::adapters::memory::InMemoryStore;
use friend_chat::adapters::postgres::{
    PostgresFriendRepository, PostgresMessageRepository, PostgresUnitOfWork,
    PostgresUserRepository,
};
use friend_chat::config::{AppConfig, LogFormat, ServerConfig};
use friend_chat::ports::{
    AIProvider, FriendRepository, MessageRepository, UnitOfWork, UserRepository,
};

/// Signing secret used outside production when none is configured.
const DEV_JWT_SECRET: &str = "friend-chat-development-secret";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

struct Storage {
    friends: Arc<dyn FriendRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let storage = connect_storage(&config).await?;
    let ai_provider = build_ai_provider(&config)?;
    let session_validator = Arc::new(JwtSessionValidator::new(jwt_config(&config)));

    let state = AppState::new(
        storage.friends,
        storage.messages,
        storage.users,
        storage.unit_of_work,
        ai_provider,
        session_validator,
    )
    .with_policy(config.limits.quota_policy())
    .with_context_window(config.limits.context_window)
    .with_params(config.ai.generation_params());

    let options = RouterOptions {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = app_router(state, &options);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}

async fn connect_storage(config: &AppConfig) -> Result<Storage, BoxError> {
    let Some(database) = &config.database else {
        warn!("No database configured, using the in-memory store");
        let store = Arc::new(InMemoryStore::new());
        return Ok(Storage {
            friends: store.clone(),
            messages: store.clone(),
            users: store.clone(),
            unit_of_work: store,
        });
    };

    let pool = database.pool_options().connect(&database.url).await?;
    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations applied");
    }

    Ok(Storage {
        friends: Arc::new(PostgresFriendRepository::new(pool.clone())),
        messages: Arc::new(PostgresMessageRepository::new(pool.clone())),
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        unit_of_work: Arc::new(PostgresUnitOfWork::new(pool)),
    })
}

fn build_ai_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, BoxError> {
    let ai = &config.ai;
    match &ai.api_key {
        Some(key) if !ai.use_mock => {
            let provider_config = OpenAIConfig::new(key.expose_secret().clone())
                .with_model(ai.model.clone())
                .with_base_url(ai.base_url.clone())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            info!(model = %ai.model, base_url = %ai.base_url, "Using completion backend");
            Ok(Arc::new(OpenAIProvider::new(provider_config)?))
        }
        _ => {
            warn!("Using the mock completion provider");
            Ok(Arc::new(
                MockAIProvider::new().with_delay(Duration::from_millis(40)),
            ))
        }
    }
}

fn jwt_config(config: &AppConfig) -> JwtConfig {
    let auth = &config.auth;
    let mut jwt = match &auth.jwt_secret {
        Some(secret) => JwtConfig::new(secret.expose_secret().clone()),
        None => {
            warn!("No JWT secret configured, using the development secret");
            JwtConfig::new(DEV_JWT_SECRET)
        }
    };
    if let Some(issuer) = &auth.issuer {
        jwt = jwt.with_issuer(issuer.clone());
    }
    if let Some(audience) = &auth.audience {
        jwt = jwt.with_audience(audience.clone());
    }
    jwt
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
