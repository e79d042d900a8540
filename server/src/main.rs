mod config;
mod error;
mod routes;
mod services;
mod state;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("server io: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    let config = config::ServerConfig::from_env()?;
    let port = config.port;
    let state = state::AppState::new(config);
    tracing::info!(
        content_dir = %state.store.dir().display(),
        app_env = %state.config.app_env,
        admin = state.config.admin_enabled(),
        "configuration loaded"
    );

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "studio server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
