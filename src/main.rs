use dotenvy::dotenv;
use log::info;
use std::sync::Arc;

use taskserver::config::AppConfig;
use taskserver::server::run_server;
use taskserver::shared::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env();
    let app_state = Arc::new(AppState::new());

    info!(
        "Starting HTTP server on {}:{}",
        config.server.host, config.server.port
    );
    run_server(app_state, &config).await
}
