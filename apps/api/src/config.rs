use anyhow::{Context, Result};
use chrono::FixedOffset;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Offset of the municipal office's wall clock. Period boundaries
    /// (Monday 00:00, first of month) are computed in this offset.
    pub board_utc_offset_minutes: i32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: optional_env("DATABASE_MAX_CONNECTIONS", "10")
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            board_utc_offset_minutes: optional_env("BOARD_UTC_OFFSET_MINUTES", "-180")
                .parse::<i32>()
                .context("BOARD_UTC_OFFSET_MINUTES must be an integer number of minutes")?,
        };

        // Reject out-of-range offsets here rather than on the first request.
        config.board_offset()?;
        Ok(config)
    }

    pub fn board_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.board_utc_offset_minutes * 60).with_context(|| {
            format!(
                "BOARD_UTC_OFFSET_MINUTES={} is outside the valid UTC offset range",
                self.board_utc_offset_minutes
            )
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_offset(minutes: i32) -> Config {
        Config {
            database_url: "postgres://localhost/gabinete".to_string(),
            database_max_connections: 10,
            port: 8080,
            rust_log: "info".to_string(),
            board_utc_offset_minutes: minutes,
        }
    }

    #[test]
    fn test_sao_paulo_offset() {
        let offset = config_with_offset(-180).board_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_out_of_range_offset_rejected() {
        assert!(config_with_offset(24 * 60).board_offset().is_err());
    }
}
