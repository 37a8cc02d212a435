//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set with a `PAZANIMAL_`-prefixed environment variable,
//! for example `PAZANIMAL_DATABASE_URL` or `PAZANIMAL_GATEWAY_ACCESS_TOKEN`.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DonationLimits;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_GATEWAY_BASE_URL: &str = "https://api.mercadopago.com";
const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DONATION_MIN: i64 = 100;
const DEFAULT_DONATION_MAX: i64 = 1_000_000;

/// Invalid setting value.
#[derive(Debug, thiserror::Error)]
#[error("invalid {name}: {message}")]
pub struct SettingsError {
    name: &'static str,
    message: String,
}

/// Server, database, and payment gateway settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PAZANIMAL")]
pub struct AppSettings {
    /// PostgreSQL URL; fixtures are served when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub database_pool_size: Option<u32>,
    /// Listen address, default `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// Public site origin used for checkout return URLs and volunteer QR
    /// codes.
    pub public_base_url: Option<String>,
    /// MercadoPago API root.
    pub gateway_base_url: Option<String>,
    /// MercadoPago private access token; without it no real checkout is
    /// created.
    pub gateway_access_token: Option<String>,
    /// Prefer sandbox checkout URLs.
    #[ortho_config(default = true)]
    pub gateway_sandbox: bool,
    /// Gateway request timeout in milliseconds.
    pub gateway_timeout_ms: Option<u64>,
    /// Smallest accepted donation in ARS.
    pub donation_min: Option<i64>,
    /// Largest accepted donation in ARS.
    pub donation_max: Option<i64>,
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError {
            name: "bind_addr",
            message: format!("{raw}: {err}"),
        })
    }

    /// Public site origin without a trailing slash.
    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
            .trim_end_matches('/')
    }

    /// Gateway API root.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the value is not an absolute URL.
    pub fn gateway_base_url(&self) -> Result<url::Url, SettingsError> {
        let raw = self
            .gateway_base_url
            .as_deref()
            .unwrap_or(DEFAULT_GATEWAY_BASE_URL);
        url::Url::parse(raw).map_err(|err| SettingsError {
            name: "gateway_base_url",
            message: format!("{raw}: {err}"),
        })
    }

    /// Access token, when one is configured and non-blank.
    pub fn gateway_access_token(&self) -> Option<&str> {
        self.gateway_access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Gateway request timeout.
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(
            self.gateway_timeout_ms
                .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_MS),
        )
    }

    /// Accepted donation range.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the minimum is not positive or exceeds
    /// the maximum.
    pub fn donation_limits(&self) -> Result<DonationLimits, SettingsError> {
        let min = self.donation_min.unwrap_or(DEFAULT_DONATION_MIN);
        let max = self.donation_max.unwrap_or(DEFAULT_DONATION_MAX);
        if min <= 0 || min > max {
            return Err(SettingsError {
                name: "donation_min",
                message: format!("expected 0 < {min} <= {max}"),
            });
        }
        Ok(DonationLimits::from_major_units(min, max))
    }
}

#[cfg(test)]
mod tests {
    //! Settings parsing against the process environment.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "PAZANIMAL_DATABASE_URL",
        "PAZANIMAL_DATABASE_POOL_SIZE",
        "PAZANIMAL_BIND_ADDR",
        "PAZANIMAL_PUBLIC_BASE_URL",
        "PAZANIMAL_GATEWAY_BASE_URL",
        "PAZANIMAL_GATEWAY_ACCESS_TOKEN",
        "PAZANIMAL_GATEWAY_SANDBOX",
        "PAZANIMAL_GATEWAY_TIMEOUT_MS",
        "PAZANIMAL_DONATION_MIN",
        "PAZANIMAL_DONATION_MAX",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("pazanimal")]).expect("config should load")
    }

    fn cleared_except(
        overrides: &[(&'static str, &str)],
    ) -> impl IntoIterator<Item = (&'static str, Option<String>)> {
        VARS.into_iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value).to_owned());
                (name, value)
            })
            .collect::<Vec<_>>()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_except(&[]));
        let settings = load();

        assert!(settings.database_url.is_none());
        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert_eq!(settings.public_base_url(), "http://localhost:3000");
        assert_eq!(
            settings.gateway_base_url().expect("default gateway").as_str(),
            "https://api.mercadopago.com/"
        );
        assert!(settings.gateway_access_token().is_none());
        assert!(settings.gateway_sandbox);
        assert_eq!(settings.gateway_timeout(), Duration::from_secs(5));
        assert_eq!(
            settings.donation_limits().expect("default limits"),
            DonationLimits::from_major_units(100, 1_000_000)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("PAZANIMAL_DATABASE_URL", "postgres://localhost/pazanimal"),
            ("PAZANIMAL_DATABASE_POOL_SIZE", "3"),
            ("PAZANIMAL_BIND_ADDR", "127.0.0.1:9000"),
            ("PAZANIMAL_PUBLIC_BASE_URL", "https://pazanimal.org/"),
            ("PAZANIMAL_GATEWAY_ACCESS_TOKEN", "  APP_USR-token "),
            ("PAZANIMAL_GATEWAY_SANDBOX", "false"),
            ("PAZANIMAL_GATEWAY_TIMEOUT_MS", "1500"),
            ("PAZANIMAL_DONATION_MIN", "50"),
        ]));
        let settings = load();

        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/pazanimal")
        );
        assert_eq!(settings.database_pool_size, Some(3));
        assert_eq!(
            settings.bind_addr().expect("bind address").port(),
            9000
        );
        assert_eq!(settings.public_base_url(), "https://pazanimal.org");
        assert_eq!(settings.gateway_access_token(), Some("APP_USR-token"));
        assert!(!settings.gateway_sandbox);
        assert_eq!(settings.gateway_timeout(), Duration::from_millis(1500));
        assert_eq!(
            settings.donation_limits().expect("limits"),
            DonationLimits::from_major_units(50, 1_000_000)
        );
    }

    #[rstest]
    #[case::inverted(&[("PAZANIMAL_DONATION_MIN", "500"), ("PAZANIMAL_DONATION_MAX", "100")])]
    #[case::non_positive(&[("PAZANIMAL_DONATION_MIN", "0")])]
    fn inconsistent_limits_are_rejected(#[case] overrides: &[(&'static str, &str)]) {
        let _guard = lock_env(cleared_except(overrides));
        assert!(load().donation_limits().is_err());
    }

    #[rstest]
    fn malformed_bind_addresses_are_rejected() {
        let _guard = lock_env(cleared_except(&[("PAZANIMAL_BIND_ADDR", "localhost")]));
        let err = load().bind_addr().expect_err("not a socket address");
        assert!(err.to_string().contains("bind_addr"));
    }
}
