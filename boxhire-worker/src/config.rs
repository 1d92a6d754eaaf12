/// Worker configuration
///
/// | Variable                   | Default  |
/// |----------------------------|----------|
/// | `DATABASE_URL`             | required |
/// | `DATABASE_MAX_CONNECTIONS` | `2`      |
/// | `SWEEP_INTERVAL_SECS`      | `60`     |

use anyhow::Context;
use std::{env, time::Duration};

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub sweep_interval: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            Err(_) => 2,
        };

        let sweep_interval = parse_interval(env::var("SWEEP_INTERVAL_SECS").ok().as_deref())?;

        Ok(Self {
            database_url,
            max_connections,
            sweep_interval,
        })
    }
}

/// Seconds between sweeps; unset means the default, zero is rejected.
fn parse_interval(raw: Option<&str>) -> anyhow::Result<Duration> {
    let secs = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_SWEEP_INTERVAL_SECS,
        Some(s) => s
            .parse::<u64>()
            .with_context(|| format!("SWEEP_INTERVAL_SECS must be a whole number, got {s:?}"))?,
    };

    anyhow::ensure!(secs > 0, "SWEEP_INTERVAL_SECS must be greater than zero");

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_default() {
        assert_eq!(parse_interval(None).unwrap(), Duration::from_secs(60));
        assert_eq!(parse_interval(Some("  ")).unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_interval_parsing() {
        assert_eq!(parse_interval(Some("15")).unwrap(), Duration::from_secs(15));
        assert!(parse_interval(Some("0")).is_err());
        assert!(parse_interval(Some("soon")).is_err());
    }
}
