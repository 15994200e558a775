/*
 * Responsibility
 * - cold start: tracing → Config 読み込み → Postgres / Valkey 接続 → getter/setter 生成
 * - Router 組み立て + Middleware の適用
 * - Lambda 上なら lambda_http::run()、それ以外は axum::serve() で起動
 * - 接続できなければ起動失敗 (degraded では動かさない)
 */
use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::{panic, process, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{AppEnv, Config};
use crate::error::StartupError;
use crate::middleware;
use crate::services::cache::{CacheClient, ValkeyClient, ttl_seconds};
use crate::services::module::{CacheKeys, ModuleGetterLib, ModuleSetterLib};
use crate::state::AppState;

fn running_in_lambda() -> bool {
    std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some()
}

fn init_tracing(app_env: AppEnv) {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,anymodule=debug,tower_http=debug cargo run
    let default_filter = if app_env.is_production() {
        "info,tower_http=info"
    } else {
        "info,anymodule=debug,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);

    // Production logs are shipped as JSON lines.
    if app_env.is_production() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(!running_in_lambda()))
            .init();
    }
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panic via tracing so they don't get "lost"
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    init_tracing(AppEnv::parse(std::env::var("APP_ENV").ok().as_deref()));

    tracing::info!("cold start");
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    let state = build_state(&config).await?;
    let app = build_router(state);

    if running_in_lambda() {
        tracing::info!("serving through the Lambda runtime in {:?} mode", config.app_env);

        let service = ServiceBuilder::new()
            .map_request(middleware::proxy::rewrite_proxy_path)
            .service(app);
        lambda_http::run(service)
            .await
            .map_err(|e| StartupError::Serve(e.to_string()))?;
    } else {
        tracing::info!("starting API in {:?} mode on {}", config.app_env, config.addr);

        let listener = tokio::net::TcpListener::bind(config.addr)
            .await
            .map_err(|e| StartupError::Serve(e.to_string()))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| StartupError::Serve(e.to_string()))?;
    }

    Ok(())
}

async fn connect_postgres(config: &Config) -> Result<PgPool, StartupError> {
    let db = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&db).await?;
    tracing::info!("connected to postgres");

    Ok(db)
}

async fn connect_cache(config: &Config) -> Result<ValkeyClient, StartupError> {
    // Production runs against a cluster, development against a single node.
    let cache = if config.app_env.is_production() {
        ValkeyClient::cluster(&config.redis_host, &config.redis_pass).await?
    } else {
        ValkeyClient::single(&config.redis_host, &config.redis_pass).await?
    };

    cache.ping().await?;
    tracing::info!(backend = cache.backend_name(), ?cache, "connected to cache");

    Ok(cache)
}

async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    // Build process-level clients once and inject them into the shared application state.
    let db = connect_postgres(config).await?;
    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&db).await?;
        tracing::info!("migrations applied");
    }

    let cache = Arc::new(connect_cache(config).await?);
    let keys = CacheKeys::new(config.cache_prefix.clone());

    let getter = ModuleGetterLib::new(cache.clone(), keys.clone());
    let setter = ModuleSetterLib::new(
        db,
        cache,
        keys,
        ttl_seconds(config.cache_ttl_seconds),
        config.seed_page_size,
    );

    Ok(AppState::new(Arc::new(getter), Arc::new(setter), config))
}

fn build_router(state: AppState) -> Router {
    middleware::http::apply(api::routes().with_state(state))
}
