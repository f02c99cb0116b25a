use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use tracing::warn;

/// Local embedded database, created on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://federwerk.db?mode=rwc";

/// Development fallback. Anyone who knows it can forge session cookies,
/// hence the warning when it is used.
pub const DEV_SECRET_KEY: &str = "12345";

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Env {
    #[serde(default = "default_server_address")]
    pub server_address: IpAddr,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    pub secret_key: Option<String>,
    pub database_url: Option<String>,
}

fn default_server_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_server_port() -> u16 {
    8080
}

impl Env {
    #[must_use]
    pub fn secret_key(&self) -> &str {
        match &self.secret_key {
            Some(secret) => secret,
            None => {
                warn!("SECRET_KEY is unset, using the insecure development default");
                DEV_SECRET_KEY
            }
        }
    }

    #[must_use]
    pub fn database_url(&self) -> String {
        self.database_url
            .as_deref()
            .map_or_else(|| DEFAULT_DATABASE_URL.to_string(), normalize_database_url)
    }
}

/// Managed Postgres services hand out URLs with the bare `postgres://`
/// scheme; sqlx wants the driver-qualified form.
#[must_use]
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(secret_key: Option<&str>, database_url: Option<&str>) -> Env {
        Env {
            server_address: default_server_address(),
            server_port: default_server_port(),
            secret_key: secret_key.map(Into::into),
            database_url: database_url.map(Into::into),
        }
    }

    #[test]
    fn bare_postgres_scheme_is_qualified() {
        assert_eq!(
            normalize_database_url("postgres://u:p@host/db"),
            "postgresql://u:p@host/db"
        );
    }

    #[test]
    fn other_schemes_pass_through() {
        assert_eq!(
            normalize_database_url("postgresql://host/db"),
            "postgresql://host/db"
        );
        assert_eq!(
            normalize_database_url("sqlite://federwerk.db"),
            "sqlite://federwerk.db"
        );
    }

    #[test]
    fn missing_database_url_falls_back_to_sqlite() {
        assert_eq!(env(None, None).database_url(), DEFAULT_DATABASE_URL);
        assert_eq!(
            env(None, Some("postgres://host/db")).database_url(),
            "postgresql://host/db"
        );
    }

    #[test]
    fn missing_secret_key_falls_back_to_dev_default() {
        assert_eq!(env(None, None).secret_key(), DEV_SECRET_KEY);
        assert_eq!(env(Some("hunter2"), None).secret_key(), "hunter2");
    }
}
