use crate::config::ServerConfig;
use crate::error::Result;
use axum::Router;
use bookclub_app::rest_api;
use bookclub_app::state::{AppConfig, AppState};
use futures::FutureExt;
use tracing::{debug, info, warn};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

fn main_router(state: AppState) -> Router<()> {
    let upload_limit_mb = state.config().upload_limit_mb;
    Router::new()
        .nest(
            "/api/books",
            rest_api::book::router(upload_limit_mb).merge(rest_api::comment::router()),
        )
        .nest("/api/genres", rest_api::genre::router())
        .nest("/api", rest_api::system::router())
        .with_state(state)
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {:?}", data_dir);
    }

    let pool = bookclub_dal::new_pool(&config.database_url()).await?;
    // schema problems are fatal, a server without tables is useless
    bookclub_dal::schema::ensure_schema(&pool).await?;

    let app_config = AppConfig {
        books_dir: config.books_dir(),
        upload_limit_mb: config.upload_limit_mb,
    };
    let state = AppState::new(app_config, pool);

    // first-run seed; a missing books directory is fine, the catalogue
    // just starts empty
    let outcome = state.seed_loader().initialize(false).await;
    if outcome.skipped {
        info!("Database already initialized");
    } else if outcome.success {
        info!("{}", outcome.message);
    } else {
        warn!("Database seed failed: {}", outcome.message);
    }

    Ok(state)
}
