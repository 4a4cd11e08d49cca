//! Service configuration loaded from the environment (and `.env`).

use anyhow::{bail, Context, Result};

pub const DEFAULT_PORT: u16 = 3000;

/// bcrypt work factor bounds
pub const MIN_PASSWORD_COST: u32 = 4;
pub const MAX_PASSWORD_COST: u32 = 31;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Shared HS256 signing secret. Never defaulted.
    pub token_secret: String,
    /// bcrypt work factor
    pub password_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let token_secret = std::env::var("AUTH_TOKEN_SECRET")
            .context("AUTH_TOKEN_SECRET must be set to the token signing secret")?;
        if token_secret.trim().is_empty() {
            bail!("AUTH_TOKEN_SECRET must not be empty");
        }

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match std::env::var("PORT") {
            Ok(v) => v.parse().with_context(|| format!("Invalid PORT: {}", v))?,
            Err(_) => DEFAULT_PORT,
        };

        let password_cost = std::env::var("PASSWORD_HASH_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(bcrypt::DEFAULT_COST)
            .clamp(MIN_PASSWORD_COST, MAX_PASSWORD_COST);

        Ok(Self {
            bind_addr,
            port,
            token_secret,
            password_cost,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        let config = Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 8081,
            token_secret: "s".to_string(),
            password_cost: MIN_PASSWORD_COST,
        };
        assert_eq!(config.listen_addr(), "127.0.0.1:8081");
    }

    #[test]
    fn test_password_cost_bounds_hash() {
        // Lowest cost must be accepted by bcrypt itself
        let digest = bcrypt::hash("pw", MIN_PASSWORD_COST).unwrap();
        assert!(bcrypt::verify("pw", &digest).unwrap());
        assert!(MIN_PASSWORD_COST <= bcrypt::DEFAULT_COST);
        assert!(bcrypt::DEFAULT_COST <= MAX_PASSWORD_COST);
    }
}
