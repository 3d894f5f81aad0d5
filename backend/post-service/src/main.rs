use actix_web::{web, App, HttpServer};
use cache_store::{CacheStore, CounterStore, RedisStore};
use post_service::config::LogFormat;
use post_service::db::{self, PgPostRepository, PostRepository};
use post_service::handlers::{self, HealthState, PostgresProbe, ReadinessProbe, RedisProbe};
use post_service::ratelimit::{CounterRateLimiter, RateLimiter};
use post_service::services::PostServices;
use post_service::Config;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,post_service=debug,sqlx=warn";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    tracing::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

/// Post Service
///
/// # Routes
///
/// - `POST /api/v1/posts` - Create a post (rate limited per client)
/// - `GET /api/v1/posts` - List posts, optionally by city
/// - `GET /api/v1/posts/search` - Keyword search
/// - `GET /api/v1/posts/{id}` - Fetch one post
/// - `GET /api/v1/health[/ready|/live]`, `GET /metrics`
#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

    if config.database.run_migrations {
        db::run_migrations(&pool)
            .await
            .map_err(|e| startup_error("Failed to run database migrations", e))?;
    }

    let redis = RedisStore::connect(&config.cache.url, config.cache.op_timeout)
        .await
        .map_err(|e| startup_error("Failed to connect to Redis", format!("{:#}", e)))?;
    tracing::info!(
        op_timeout_ms = config.cache.op_timeout.as_millis() as u64,
        invalidation = %config.cache.invalidation_scope,
        "Redis connection established"
    );

    let repo: Arc<dyn PostRepository> = Arc::new(PgPostRepository::new(pool.clone()));
    let cache: Arc<dyn CacheStore> = Arc::new(redis.clone());
    let counters: Arc<dyn CounterStore> = Arc::new(redis.clone());
    let limiter: Arc<dyn RateLimiter> = Arc::new(CounterRateLimiter::new(counters));

    let services = web::Data::new(PostServices::new(
        repo,
        cache,
        limiter,
        config.service_settings(),
    ));

    let probes: Vec<Arc<dyn ReadinessProbe>> = vec![
        Arc::new(PostgresProbe(pool.clone())),
        Arc::new(RedisProbe(redis)),
    ];
    let health_state = web::Data::new(HealthState::new(probes));

    let bind_address = config.bind_address();
    tracing::info!("Listening on {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(services.clone())
            .app_data(health_state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    actix_rt::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        server_handle.stop(true).await;
    });

    server.await?;
    pool.close().await;
    tracing::info!("post-service stopped");
    Ok(())
}
