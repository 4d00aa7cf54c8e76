use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::initialize_app_state;
use crate::router::create_router;

/// Start the dashboard server on the given address.
pub async fn serve(bind_address: &str) -> Result<()> {
    info!("Stockcast application starting up");

    let state = initialize_app_state();
    let app = create_router(state);

    info!("Starting server on {}", bind_address);
    let listener = TcpListener::bind(bind_address).await?;

    info!("Stockcast dashboard running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
