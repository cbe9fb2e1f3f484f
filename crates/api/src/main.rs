use anyhow::Context;

use bitacora_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional; real environment variables win.
    let _ = dotenvy::dotenv();
    bitacora_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = bitacora_api::app::services::build_services(&config)
        .await
        .context("failed to initialize record store")?;

    let app = bitacora_api::app::build_app(services);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
