use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, DatabaseConfig, GameConfig, LeaderboardConfig, ServerConfig, StorageBackend,
};

/// Loads the application configuration from `config.toml` in the working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the application configuration, layering sources from lowest to
/// highest precedence:
///
/// 1. the built-in defaults,
/// 2. the TOML file at `path`, if it exists,
/// 3. `REFLEX_*` environment variables, with `__` between nested keys
///    (e.g. `REFLEX_DATABASE__BACKEND=memory`),
/// 4. `SERVER_PORT`, which overrides `server.port`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    load_config_with(path, std::env::vars().collect())
}

/// Same as `load_config_from`, reading variables from `env` instead of the
/// process environment.
pub fn load_config_with(
    path: &Path,
    env: HashMap<String, String>,
) -> Result<Config, ConfigError> {
    let server_port = env.get("SERVER_PORT").cloned();

    let mut builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("REFLEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        );

    if let Some(raw) = server_port {
        let port: u16 = raw.parse().map_err(|_| {
            ConfigError::ValidationError(format!("SERVER_PORT must be a port number, got '{raw}'"))
        })?;
        builder = builder.set_override("server.port", i64::from(port))?;
    }

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        port = config.server.port,
        backend = ?config.database.backend,
        "Configuration loaded."
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_with(Path::new("does-not-exist.toml"), HashMap::new()).unwrap();
        assert_eq!(config.leaderboard.default_limit, 10);
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.game.min_delay_ms, 2000);
        assert_eq!(config.game.max_delay_ms, 5000);
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [database]
            backend = "memory"

            [leaderboard]
            default_limit = 25

            [game]
            record_false_starts = true
            "#,
        );
        let config = load_config_with(file.path(), HashMap::new()).unwrap();
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.leaderboard.default_limit, 25);
        assert!(config.game.record_false_starts);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn rejects_inverted_delay_range() {
        let file = write_config(
            r#"
            [game]
            min_delay_ms = 6000
            max_delay_ms = 1000
            "#,
        );
        let err = load_config_with(file.path(), HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_zero_default_limit() {
        let mut config = Config::default();
        config.leaderboard.default_limit = 0;
        assert!(config.validate().is_err());
    }

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn environment_overrides_the_file() {
        let file = write_config(
            r#"
            [server]
            port = 3000

            [leaderboard]
            default_limit = 25
            "#,
        );
        let config = load_config_with(
            file.path(),
            env(&[
                ("REFLEX_SERVER__PORT", "4000"),
                ("REFLEX_DATABASE__BACKEND", "memory"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.leaderboard.default_limit, 25);
    }

    #[test]
    fn server_port_wins_over_everything() {
        let file = write_config("[server]\nport = 3000\n");
        let config = load_config_with(
            file.path(),
            env(&[("REFLEX_SERVER__PORT", "4000"), ("SERVER_PORT", "5000")]),
        )
        .unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn rejects_a_non_numeric_server_port() {
        let err = load_config_with(
            Path::new("does-not-exist.toml"),
            env(&[("SERVER_PORT", "abc")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("abc")));
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = load_config_with(
            Path::new("does-not-exist.toml"),
            env(&[("PATH", "/usr/bin"), ("SERVER_HOST", "10.0.0.1")]),
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 2022);
    }
}
