use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use copilot_backend::config::Settings;
use copilot_backend::routes;
use copilot_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    let cors = routes::cors_layer(&settings.frontend_origin);
    let state = Arc::new(AppState::new(settings));

    let app = routes::create_router().with_state(state).layer(cors);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("AI Copilot backend listening on http://localhost:3000");
    axum::serve(listener, app).await?;

    Ok(())
}
