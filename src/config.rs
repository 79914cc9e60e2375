use anyhow::{bail, Context};

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_INACTIVITY_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Cookie sessions expire after this long without a request.
    pub session_inactivity: time::Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Config::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());

        let minutes = match lookup("SESSION_INACTIVITY_MINUTES") {
            Some(minutes) => minutes
                .trim()
                .parse::<i64>()
                .with_context(|| format!("SESSION_INACTIVITY_MINUTES={minutes} is not a number"))?,
            None => DEFAULT_SESSION_INACTIVITY_MINUTES,
        };
        if minutes <= 0 {
            bail!("SESSION_INACTIVITY_MINUTES must be positive, got {minutes}");
        }

        Ok(Config {
            database_url,
            bind_addr,
            session_inactivity: time::Duration::minutes(minutes),
        })
    }
}
