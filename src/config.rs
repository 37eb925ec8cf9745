//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Aggregator environment selector.
///
/// Controls which Plaid API host the client talks to. Sandbox issues fake
/// institutions and test credentials; production talks to real banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaidEnvironment {
    Sandbox,
    Production,
}

impl PlaidEnvironment {
    /// Base URL of the Plaid API host for this environment.
    pub fn base_url(self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

fn default_plaid_environment() -> PlaidEnvironment {
    PlaidEnvironment::Sandbox
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `PLAID_CLIENT_ID` (required): Plaid API client id
/// - `PLAID_SECRET` (required): Plaid API secret for the selected environment
/// - `PLAID_ENVIRONMENT` (optional): `sandbox` or `production`, defaults to sandbox
/// - `PLAID_CLIENT_NAME` (optional): name shown inside the Link widget
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub plaid_client_id: String,

    pub plaid_secret: String,

    #[serde(default = "default_plaid_environment")]
    pub plaid_environment: PlaidEnvironment,

    #[serde(default = "default_client_name")]
    pub plaid_client_name: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_client_name() -> String {
    "LedgerLink".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_selects_host() {
        assert_eq!(
            PlaidEnvironment::Sandbox.base_url(),
            "https://sandbox.plaid.com"
        );
        assert_eq!(
            PlaidEnvironment::Production.base_url(),
            "https://production.plaid.com"
        );
    }
}
