//! Service configuration loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_DB_PATH: &str = "tiramisu.db";
const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Configuration values for the questionnaire service.
///
/// Values come from CLI flags, environment variables prefixed with
/// `TIRAMISU_`, and configuration files, in OrthoConfig's usual
/// precedence order. `token_secret` has no default; startup fails
/// without one.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TIRAMISU")]
pub struct AppConfig {
    /// Path of the database file; created when absent.
    pub db_path: Option<PathBuf>,
    /// Secret key for signing session tokens.
    pub token_secret: Option<String>,
    /// Session token lifetime in seconds.
    #[ortho_config(default = 86_400)]
    pub token_ttl_secs: i64,
}

impl AppConfig {
    /// Return the configured database path, falling back to the default.
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    /// Session token lifetime as a duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_secs)
    }
}
