//! Configuration for Telegram API credentials and sender tuning
//!
//! Loads configuration from config.yml file, with `.env` and environment
//! variables taking precedence for credentials.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::sender::delay::DelayPolicy;

/// Default constants (fallback if config.yml not found)
pub const SESSION_NAME: &str = "telegram_session";
pub const GROUPS_FILE: &str = "groups.txt";
pub const MESSAGES_FILE: &str = "messages.txt";
pub const LOG_FILE: &str = "telegram_sender.log";

/// Seconds between two sends of the same worker.
pub const BETWEEN_GROUPS_SECS: (u64, u64) = (1, 3);
/// Minutes between two cycles.
pub const BETWEEN_CYCLES_MINUTES: (u64, u64) = (5, 10);

/// Value left in a freshly generated config.yml.
const PLACEHOLDER_API_HASH: &str = "YOUR_API_HASH";

/// One lock file per session.
fn lock_file_for(session_name: &str) -> String {
    format!("{}.lock", session_name)
}

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    telegram: Option<TelegramConfig>,
    sender: Option<SenderConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramConfig {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    api_id: Option<String>,
    api_hash: Option<String>,
    phone: Option<String>,
    session_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SenderConfig {
    groups_file: Option<PathBuf>,
    messages_file: Option<PathBuf>,
    log_file: Option<PathBuf>,
    cycles: Option<u32>,
    workers: Option<usize>,
    delays: Option<DelaysConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DelaysConfig {
    between_groups_secs: Option<(u64, u64)>,
    between_cycles_minutes: Option<(u64, u64)>,
}

/// Deserialize a value that can be either a string or a number
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub phone: String,
    pub api_id: i32,
    pub api_hash: String,
    pub session_name: String,
    pub lock_file: String,
    pub groups_file: PathBuf,
    pub messages_file: PathBuf,
    pub log_file: PathBuf,
    /// Cycle count from config; `None` means ask interactively.
    pub cycles: Option<u32>,
    /// Worker count from config; `None` means ask interactively.
    pub workers: Option<usize>,
    pub between_groups_secs: (u64, u64),
    pub between_cycles_minutes: (u64, u64),
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml or use defaults
    /// Environment variables take precedence over config.yml values
    pub fn new() -> Self {
        Self::load_from_file("config.yml")
            .or_else(|_| Self::load_from_file("../config.yml"))
            .unwrap_or_else(|_| Self::defaults())
    }

    /// Load from an explicit path when given (errors are reported),
    /// otherwise fall back to the usual lookup.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::new()),
        }
    }

    /// Expand a `${VAR}` placeholder from the environment.
    fn expand_placeholder(value: &str) -> Option<String> {
        let var_name = value.strip_prefix("${")?.strip_suffix('}')?;
        std::env::var(var_name).ok()
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> String {
        if let Some(expanded) = value.as_deref().and_then(Self::expand_placeholder) {
            return expanded;
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return env_val;
        }
        value.unwrap_or_default()
    }

    /// Resolve a numeric value. Literal numbers from YAML win over the
    /// environment, placeholders and missing values fall back to `env_key`.
    fn resolve_env_parsed<T: FromStr + Default>(value: Option<String>, env_key: &str) -> T {
        if let Some(ref v) = value {
            if let Some(parsed) = Self::expand_placeholder(v).and_then(|e| e.parse().ok()) {
                return parsed;
            }
            if let Ok(parsed) = v.parse() {
                return parsed;
            }
        }
        std::env::var(env_key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_dotenv();

        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let yaml: YamlConfig = serde_yaml::from_str(&content)?;
        let telegram = yaml.telegram.unwrap_or_default();
        let sender = yaml.sender.unwrap_or_default();
        let delays = sender.delays.unwrap_or_default();

        let session_name = telegram
            .session_name
            .unwrap_or_else(|| SESSION_NAME.to_string());

        Ok(Self {
            phone: Self::resolve_env_string(telegram.phone, "TELEGRAM_PHONE"),
            api_hash: Self::resolve_env_string(telegram.api_hash, "TELEGRAM_API_HASH"),
            api_id: Self::resolve_env_parsed(telegram.api_id, "TELEGRAM_API_ID"),
            lock_file: lock_file_for(&session_name),
            session_name,
            groups_file: sender
                .groups_file
                .unwrap_or_else(|| PathBuf::from(GROUPS_FILE)),
            messages_file: sender
                .messages_file
                .unwrap_or_else(|| PathBuf::from(MESSAGES_FILE)),
            log_file: sender.log_file.unwrap_or_else(|| PathBuf::from(LOG_FILE)),
            cycles: sender.cycles,
            workers: sender.workers,
            between_groups_secs: delays.between_groups_secs.unwrap_or(BETWEEN_GROUPS_SECS),
            between_cycles_minutes: delays
                .between_cycles_minutes
                .unwrap_or(BETWEEN_CYCLES_MINUTES),
        })
    }

    /// Create config with empty credentials (fallback)
    /// User MUST provide config.yml or env vars with actual credentials
    fn defaults() -> Self {
        Self {
            phone: std::env::var("TELEGRAM_PHONE").unwrap_or_default(),
            api_id: Self::resolve_env_parsed(None, "TELEGRAM_API_ID"),
            api_hash: std::env::var("TELEGRAM_API_HASH").unwrap_or_default(),
            session_name: SESSION_NAME.to_string(),
            lock_file: lock_file_for(SESSION_NAME),
            groups_file: PathBuf::from(GROUPS_FILE),
            messages_file: PathBuf::from(MESSAGES_FILE),
            log_file: PathBuf::from(LOG_FILE),
            cycles: None,
            workers: None,
            between_groups_secs: BETWEEN_GROUPS_SECS,
            between_cycles_minutes: BETWEEN_CYCLES_MINUTES,
        }
    }

    /// Session file name on disk.
    pub fn session_file(&self) -> String {
        format!("{}.session", self.session_name)
    }

    /// Fail early when the API credentials were never filled in.
    pub fn validate_credentials(&self) -> Result<()> {
        if self.api_id == 0 || self.api_hash.is_empty() || self.api_hash == PLACEHOLDER_API_HASH {
            return Err(Error::Config(
                "telegram.api_id / telegram.api_hash are not set \
                 (get them at https://my.telegram.org/apps)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Build the delay policy from the configured ranges.
    pub fn delay_policy(&self) -> Result<DelayPolicy> {
        let (group_min, group_max) = self.between_groups_secs;
        let (cycle_min, cycle_max) = self.between_cycles_minutes;
        DelayPolicy::new(group_min..=group_max, cycle_min..=cycle_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{LazyLock, Mutex};
    use tempfile::tempdir;

    static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    struct EnvGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self {
                key: key.to_string(),
                original,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(value) => std::env::set_var(&self.key, value),
                None => std::env::remove_var(&self.key),
            }
        }
    }

    fn set_envs(vars: &[(&str, &str)]) -> Vec<EnvGuard> {
        vars.iter().map(|(k, v)| EnvGuard::set(k, v)).collect()
    }

    fn write_config(yaml: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.yml");
        std::fs::write(&path, yaml).expect("write config");
        (dir, path)
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.session_name.is_empty());
        assert_eq!(config.lock_file, "telegram_session.lock");
    }

    #[test]
    fn test_load_sender_section() {
        let (_dir, path) = write_config(
            r#"
telegram:
  api_id: 12345
  api_hash: "test_hash"
sender:
  groups_file: "lists/groups.txt"
  messages_file: "lists/messages.txt"
  log_file: "out.log"
  cycles: 3
  workers: 2
  delays:
    between_groups_secs: [2, 5]
    between_cycles_minutes: [40, 90]
"#,
        );

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.groups_file, PathBuf::from("lists/groups.txt"));
        assert_eq!(config.messages_file, PathBuf::from("lists/messages.txt"));
        assert_eq!(config.log_file, PathBuf::from("out.log"));
        assert_eq!(config.cycles, Some(3));
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.between_groups_secs, (2, 5));
        assert_eq!(config.between_cycles_minutes, (40, 90));
    }

    #[test]
    fn test_missing_sender_section_uses_defaults() {
        let (_dir, path) = write_config("telegram:\n  api_id: 1\n");

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.groups_file, PathBuf::from(GROUPS_FILE));
        assert_eq!(config.messages_file, PathBuf::from(MESSAGES_FILE));
        assert_eq!(config.cycles, None);
        assert_eq!(config.workers, None);
        assert_eq!(config.between_groups_secs, BETWEEN_GROUPS_SECS);
        assert_eq!(config.between_cycles_minutes, BETWEEN_CYCLES_MINUTES);
        assert_eq!(config.session_name, SESSION_NAME);
    }

    #[test]
    fn env_placeholders_are_resolved_from_environment() {
        let _lock = ENV_LOCK.lock().unwrap();
        let (_dir, path) = write_config(
            r#"
telegram:
  api_id: "${TELEGRAM_API_ID}"
  api_hash: "${TELEGRAM_API_HASH}"
  phone: "+should_be_overridden"
"#,
        );

        let _guards = set_envs(&[
            ("TELEGRAM_API_ID", "4242"),
            ("TELEGRAM_API_HASH", "hash_from_env"),
            ("TELEGRAM_PHONE", "+1999"),
        ]);

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.api_id, 4242);
        assert_eq!(config.api_hash, "hash_from_env");
        assert_eq!(config.phone, "+1999");
    }

    #[test]
    fn env_does_not_override_numeric_yaml_values() {
        let _lock = ENV_LOCK.lock().unwrap();
        let (_dir, path) = write_config(
            r#"
telegram:
  api_id: 321
  phone: "from_yaml"
"#,
        );

        let _guards = set_envs(&[("TELEGRAM_API_ID", "9999"), ("TELEGRAM_PHONE", "+8888")]);

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.api_id, 321);
        assert_eq!(config.phone, "+8888");
    }

    #[test]
    fn validate_credentials_rejects_placeholders() {
        let mut config = Config::defaults();
        config.api_id = 0;
        config.api_hash = "abc".into();
        assert!(matches!(config.validate_credentials(), Err(Error::Config(_))));

        config.api_id = 100;
        config.api_hash = PLACEHOLDER_API_HASH.into();
        assert!(config.validate_credentials().is_err());

        config.api_hash = String::new();
        assert!(config.validate_credentials().is_err());

        config.api_hash = "0123456789abcdef".into();
        assert!(config.validate_credentials().is_ok());
    }

    #[test]
    fn delay_policy_rejects_inverted_range() {
        let mut config = Config::defaults();
        config.between_groups_secs = (10, 2);
        assert!(matches!(config.delay_policy(), Err(Error::Config(_))));

        config.between_groups_secs = (1, 3);
        assert!(config.delay_policy().is_ok());
    }

    #[test]
    fn lock_file_follows_session_name() {
        let (_dir, path) = write_config("telegram:\n  session_name: promo_account\n");

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.session_file(), "promo_account.session");
        assert_eq!(config.lock_file, "promo_account.lock");
        assert_ne!(config.lock_file, Config::defaults().lock_file);
    }

    #[test]
    fn session_file_uses_session_name() {
        let mut config = Config::defaults();
        config.session_name = "sender".into();
        assert_eq!(config.session_file(), "sender.session");
    }

    #[test]
    fn load_from_file_fails_on_missing_file() {
        let result = Config::load_from_file("/nonexistent/path/config.yml");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn load_reports_errors_only_for_explicit_path() {
        assert!(Config::load(Some(Path::new("/nonexistent/config.yml"))).is_err());
        assert!(Config::load(None).is_ok());
    }

    #[test]
    fn load_from_file_fails_on_invalid_yaml() {
        let (_dir, path) = write_config("{ invalid yaml [");

        let result = Config::load_from_file(&path);
        assert!(result.is_err());
    }
}
