use anyhow::Context;

use licensedesk_infra::InventoryConfig;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    licensedesk_observability::init();

    let config = InventoryConfig::from_env();
    let bind = std::env::var("LICENSEDESK_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

    let services = licensedesk_api::app::services::build_services(&config)
        .context("failed to open license storage")?;
    let app = licensedesk_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
