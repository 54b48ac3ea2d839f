use std::env;
use std::time::Duration;

use crate::constants::timeouts::{DEFAULT_PURGE_LIMIT, DEFAULT_PURGE_PACING_MS, MAX_HISTORY_PAGE};

/// How the admin relay reports a finished fan-out back to the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayConfirmation {
    /// Always reply with a plain "done", whatever the per-guild outcomes were
    #[default]
    Always,
    /// Reply with delivered / failed / unconfigured counts
    Summary,
}

impl RelayConfirmation {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" => Some(Self::Always),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database_url: String,
    pub guild_id: Option<u64>,
    /// Only direct messages from this user are relayed to every guild
    pub admin_user_id: Option<u64>,
    pub relay_confirmation: RelayConfirmation,
    /// How many recent messages a reconciliation sweeps from the button channel
    pub purge_limit: u8,
    /// Pause between two deletes of a purge sweep
    pub purge_pacing: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|s| !s.is_empty())
            .ok_or("DISCORD_TOKEN environment variable not set")?;

        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.is_empty())
            .ok_or("DATABASE_URL environment variable not set")?;

        let guild_id = lookup("GUILD_ID").and_then(|s| s.parse::<u64>().ok());

        let admin_user_id = lookup("ADMIN_USER_ID").and_then(|s| s.parse::<u64>().ok());

        let relay_confirmation = match lookup("RELAY_CONFIRMATION") {
            Some(value) => RelayConfirmation::parse(&value)
                .ok_or_else(|| format!("RELAY_CONFIRMATION must be 'always' or 'summary', got '{}'", value))?,
            None => RelayConfirmation::default(),
        };

        let purge_limit = lookup("PURGE_LIMIT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(|limit| limit.clamp(1, MAX_HISTORY_PAGE as u64) as u8)
            .unwrap_or(DEFAULT_PURGE_LIMIT);

        let purge_pacing = lookup("PURGE_PACING_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_PURGE_PACING_MS));

        Ok(Self {
            discord_token,
            database_url,
            guild_id,
            admin_user_id,
            relay_confirmation,
            purge_limit,
            purge_pacing,
        })
    }

    /// Whether a direct message from `user_id` should be relayed
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_user_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Settings, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = load(&[("DISCORD_TOKEN", "t"), ("DATABASE_URL", "postgres://x")]).unwrap();
        assert_eq!(settings.guild_id, None);
        assert_eq!(settings.admin_user_id, None);
        assert_eq!(settings.relay_confirmation, RelayConfirmation::Always);
        assert_eq!(settings.purge_limit, 20);
        assert_eq!(settings.purge_pacing, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_credentials_are_fatal() {
        assert!(load(&[("DATABASE_URL", "postgres://x")]).is_err());
        assert!(load(&[("DISCORD_TOKEN", "t")]).is_err());
        assert!(load(&[("DISCORD_TOKEN", ""), ("DATABASE_URL", "postgres://x")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let settings = load(&[
            ("DISCORD_TOKEN", "t"),
            ("DATABASE_URL", "postgres://x"),
            ("ADMIN_USER_ID", "42"),
            ("RELAY_CONFIRMATION", "Summary"),
            ("PURGE_LIMIT", "250"),
            ("PURGE_PACING_MS", "10"),
        ]);
        let settings = settings.unwrap();
        assert!(settings.is_admin(42));
        assert!(!settings.is_admin(43));
        assert_eq!(settings.relay_confirmation, RelayConfirmation::Summary);
        assert_eq!(settings.purge_limit, 100);
        assert_eq!(settings.purge_pacing, Duration::from_millis(10));
    }

    #[test]
    fn test_purge_limit_clamped() {
        let limit = |value: &str| {
            load(&[
                ("DISCORD_TOKEN", "t"),
                ("DATABASE_URL", "postgres://x"),
                ("PURGE_LIMIT", value),
            ])
            .unwrap()
            .purge_limit
        };
        assert_eq!(limit("0"), 1);
        assert_eq!(limit("55"), 55);
        assert_eq!(limit("101"), 100);
        assert_eq!(limit("255"), 100);
        assert_eq!(limit("256"), 100);
        assert_eq!(limit("500"), 100);
        assert_eq!(limit("not a number"), 20);
        assert_eq!(limit("-3"), 20);
    }

    #[test]
    fn test_bad_relay_policy_rejected() {
        assert!(load(&[
            ("DISCORD_TOKEN", "t"),
            ("DATABASE_URL", "postgres://x"),
            ("RELAY_CONFIRMATION", "sometimes"),
        ])
        .is_err());
    }
}
