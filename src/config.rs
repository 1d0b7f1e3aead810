// src/config.rs

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
}

/// Where leads and identities live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Supabase { url: String, anon_key: String },
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub max_workers: usize,
    /// Auto refresh period for every open dashboard.
    pub refresh_interval: Duration,
    /// Offset used for calendar days and week buckets.
    pub display_offset: FixedOffset,
    /// Shared secret expected in `x-webhook-secret` on change notifications.
    pub webhook_secret: Option<String>,
    pub backend: BackendConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_workers: 8,
            refresh_interval: Duration::from_secs(5 * 60),
            display_offset: Utc.fix(),
            webhook_secret: None,
            backend: BackendConfig::Sqlite {
                path: PathBuf::from("leads.sqlite3"),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = AppConfig::default();

        if let Some(v) = get("DASHBOARD_ADDR") {
            cfg.addr = parse("DASHBOARD_ADDR", &v)?;
        }
        if let Some(v) = get("DASHBOARD_WORKERS") {
            cfg.max_workers = parse("DASHBOARD_WORKERS", &v)?;
            if cfg.max_workers == 0 {
                return Err(ConfigError::Invalid {
                    key: "DASHBOARD_WORKERS",
                    value: v,
                });
            }
        }
        if let Some(v) = get("DASHBOARD_REFRESH_SECS") {
            let secs: u64 = parse("DASHBOARD_REFRESH_SECS", &v)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: "DASHBOARD_REFRESH_SECS",
                    value: v,
                });
            }
            cfg.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(v) = get("DASHBOARD_UTC_OFFSET_MINUTES") {
            let minutes: i32 = parse("DASHBOARD_UTC_OFFSET_MINUTES", &v)?;
            cfg.display_offset = minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or(ConfigError::Invalid {
                    key: "DASHBOARD_UTC_OFFSET_MINUTES",
                    value: v,
                })?;
        }
        cfg.webhook_secret = get("DASHBOARD_WEBHOOK_SECRET");

        cfg.backend = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => BackendConfig::Supabase { url, anon_key },
            (Some(_), None) => return Err(ConfigError::Incomplete("SUPABASE_URL", "SUPABASE_ANON_KEY")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("SUPABASE_ANON_KEY", "SUPABASE_URL")),
            (None, None) => BackendConfig::Sqlite {
                path: get("DASHBOARD_SQLITE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("leads.sqlite3")),
            },
        };

        Ok(cfg)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_to_local_sqlite_and_five_minutes() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.addr.to_string(), "127.0.0.1:3000");
        assert_eq!(c.refresh_interval, Duration::from_secs(300));
        assert_eq!(c.display_offset.local_minus_utc(), 0);
        assert_eq!(
            c.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("leads.sqlite3")
            }
        );
    }

    #[test]
    fn reads_supabase_and_offset() {
        let c = cfg(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("DASHBOARD_UTC_OFFSET_MINUTES", "-300"),
            ("DASHBOARD_WEBHOOK_SECRET", "s3cret"),
        ])
        .unwrap();
        assert!(matches!(c.backend, BackendConfig::Supabase { .. }));
        assert_eq!(c.display_offset.local_minus_utc(), -300 * 60);
        assert_eq!(c.webhook_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(cfg(&[("DASHBOARD_REFRESH_SECS", "0")]).is_err());
        assert!(cfg(&[("DASHBOARD_WORKERS", "many")]).is_err());
        assert!(cfg(&[("DASHBOARD_UTC_OFFSET_MINUTES", "99999")]).is_err());
        assert!(matches!(
            cfg(&[("SUPABASE_URL", "https://abc.supabase.co")]),
            Err(ConfigError::Incomplete(..))
        ));
    }
}
