//! Backend entry-point: loads settings, wires adapters, and serves the REST
//! API with its OpenAPI docs.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use pazanimal::config::AppSettings;
use pazanimal::domain::DonationSettings;
use pazanimal::inbound::http::health::HealthState;
use pazanimal::inbound::http::session_config::{BuildMode, session_settings_from_env};
use pazanimal::outbound::mercadopago::MercadoPagoSettings;
use pazanimal::outbound::persistence::{DbPool, PoolConfig};

use server::{ServerConfig, create_server};

fn config_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::other(err.to_string())
}

/// Translate loaded settings into the server configuration.
async fn server_config(settings: &AppSettings) -> io::Result<ServerConfig> {
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(config_error)?;
    let bind_addr = settings.bind_addr().map_err(config_error)?;
    let donations = DonationSettings::new(
        settings.donation_limits().map_err(config_error)?,
        settings.public_base_url(),
        settings.gateway_sandbox,
    );
    let mut config = ServerConfig::new(session, bind_addr).with_donation_settings(donations);

    if let Some(url) = settings.database_url.as_deref() {
        let mut pool_config = PoolConfig::new(url);
        if let Some(size) = settings.database_pool_size {
            pool_config = pool_config.with_max_size(size);
        }
        let pool = DbPool::new(pool_config).await.map_err(config_error)?;
        config = config.with_db_pool(pool);
    }

    if let Some(token) = settings.gateway_access_token() {
        config = config.with_gateway(MercadoPagoSettings {
            base_url: settings.gateway_base_url().map_err(config_error)?,
            access_token: Zeroizing::new(token.to_owned()),
            timeout: settings.gateway_timeout(),
        });
    }
    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(config_error)?;
    let config = server_config(&settings).await?;
    info!(bind_addr = %config.bind_addr(), "starting server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
