use crate::error::ConfigError;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub leaderboard: LeaderboardConfig,
    pub game: GameConfig,
}

/// Where the HTTP interface listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests from any origin.
    pub cors_enabled: bool,
}

/// Which store backs the attempts table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Non-durable, process-local storage for development and tests.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    /// Connection string. When unset, `DATABASE_URL` is read from the environment.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Rows returned when a request omits `limit`.
    pub default_limit: u32,
}

/// Settings for the terminal game client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Base URL of the leaderboard server.
    pub server_url: String,
    /// Shortest wait before the signal turns green.
    pub min_delay_ms: u64,
    /// Longest wait before the signal turns green.
    pub max_delay_ms: u64,
    /// Submit false starts too, flagged as such.
    pub record_false_starts: bool,
}

// --- Default Implementations ---
// These allow any section, or the whole file, to be omitted.

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2022,
            cors_enabled: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:2022".to_string(),
            min_delay_ms: 2000,
            max_delay_ms: 5000,
            record_false_starts: false,
        }
    }
}

impl Config {
    /// Checks cross-field constraints that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.leaderboard.default_limit == 0 {
            return Err(ConfigError::ValidationError(
                "leaderboard.default_limit must be at least 1".to_string(),
            ));
        }
        if self.game.min_delay_ms > self.game.max_delay_ms {
            return Err(ConfigError::ValidationError(format!(
                "game.min_delay_ms ({}) must not exceed game.max_delay_ms ({})",
                self.game.min_delay_ms, self.game.max_delay_ms
            )));
        }
        Ok(())
    }
}
