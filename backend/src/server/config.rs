//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use pazanimal::domain::DonationSettings;
use pazanimal::inbound::http::session_config::SessionSettings;
use pazanimal::outbound::mercadopago::MercadoPagoSettings;
use pazanimal::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) gateway: Option<MercadoPagoSettings>,
    pub(crate) donations: DonationSettings,
}

impl ServerConfig {
    /// Construct a configuration that serves fixtures until adapters are
    /// attached.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            gateway: None,
            donations: DonationSettings::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool every port is served by its in-memory fixture.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach MercadoPago credentials. Without them donations go through
    /// the fixture gateway.
    #[must_use]
    pub fn with_gateway(mut self, gateway: MercadoPagoSettings) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Override donation limits and callback origin.
    #[must_use]
    pub fn with_donation_settings(mut self, donations: DonationSettings) -> Self {
        self.donations = donations;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
