use sessiongate::config::AppConfig;
use sessiongate::routes;
use sessiongate::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let port = config.port;
    let site_dir = config.site_dir.clone();

    if config.backend_api_url.is_none() {
        tracing::warn!("BACKEND_API_URL not configured, login and password reset will fail");
    }

    let state = AppState::from_config(config).expect("identity backend client init failed");

    let app = routes::app(state, routes::site_pages(&site_dir));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, site_dir = %site_dir.display(), "sessiongate listening");
    axum::serve(listener, app).await.expect("server failed");
}
