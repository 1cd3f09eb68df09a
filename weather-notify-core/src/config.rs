use anyhow::{Context, Result, anyhow};
use chrono::NaiveTime;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::error::ConfigError;

/// `Weather_API` value the plugin accepts.
pub const DEFAULT_WEATHER_API: &str = "xiaomi_weather";

pub const DEFAULT_TRIGGER_TIMES: [&str; 3] = ["12:00:15", "16:05:30", "20:10:30"];

const TRIGGER_TIME_FORMAT: &str = "%H:%M:%S";

/// Timing and presentation of one notification cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Host notification state passed through verbatim.
    pub state: u8,
    pub header_title: String,
    pub header_ms: u64,
    pub alert_ms: u64,
    pub data_ms: u64,
}

impl NotificationConfig {
    pub fn header_duration(&self) -> Duration {
        Duration::from_millis(self.header_ms)
    }

    pub fn alert_duration(&self) -> Duration {
        Duration::from_millis(self.alert_ms)
    }

    pub fn data_duration(&self) -> Duration {
        Duration::from_millis(self.data_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            state: 4,
            header_title: "天气预报".to_string(),
            header_ms: 5_000,
            alert_ms: 10_000,
            data_ms: 10_000,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// weather_api = "xiaomi_weather"
/// trigger_times = ["12:00:15", "16:05:30", "20:10:30"]
/// icon_timeout_secs = 5
///
/// [notification]
/// header_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub weather_api: String,

    /// Times of day (`HH:MM:SS`, local time) at which a cycle is sent.
    pub trigger_times: Vec<String>,

    /// Where alert icons are downloaded. Defaults to the platform cache directory.
    pub cache_dir: Option<PathBuf>,

    pub icon_timeout_secs: u64,

    pub notification: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weather_api: DEFAULT_WEATHER_API.to_string(),
            trigger_times: DEFAULT_TRIGGER_TIMES.iter().map(|t| t.to_string()).collect(),
            cache_dir: None,
            icon_timeout_secs: 5,
            notification: NotificationConfig::default(),
        }
    }
}

impl Config {
    /// Parse the configured trigger times, rejecting anything that is not `HH:MM:SS`.
    pub fn trigger_times(&self) -> Result<Vec<NaiveTime>, ConfigError> {
        if self.trigger_times.is_empty() {
            return Err(ConfigError::NoTriggerTimes);
        }

        self.trigger_times.iter().map(|raw| parse_trigger_time(raw)).collect()
    }

    /// Reject configs that could not drive a cycle: bad trigger times, or a
    /// zero duration that would stack notifications on the same instant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trigger_times()?;

        let durations = [
            ("icon_timeout_secs", self.icon_timeout_secs),
            ("notification.header_ms", self.notification.header_ms),
            ("notification.alert_ms", self.notification.alert_ms),
            ("notification.data_ms", self.notification.data_ms),
        ];
        match durations.into_iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::ZeroDuration(name)),
            None => Ok(()),
        }
    }

    pub fn icon_timeout(&self) -> Duration {
        Duration::from_secs(self.icon_timeout_secs)
    }

    /// Icon cache directory, falling back to the platform cache location.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }

        Ok(Self::project_dirs()?.cache_dir().join("alert_icons"))
    }

    /// Load `config.toml` from the platform config dir. A missing file means
    /// [`Config::default`]: the `xiaomi_weather` sentinel and the three stock
    /// trigger times. A present file is validated like [`Config::from_toml`].
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse and validate. Omitted keys take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist after `weather-notify configure`; refuses configs that fail
    /// [`Config::validate`].
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// `<config dir>/weather-notify/config.toml`, shared by every subcommand.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-notify", "weather-notify")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

pub fn parse_trigger_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw.trim(), TRIGGER_TIME_FORMAT)
        .map_err(|_| ConfigError::InvalidTriggerTime(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_three_valid_trigger_times() {
        let cfg = Config::default();
        let times = cfg.trigger_times().expect("defaults must parse");

        assert_eq!(times.len(), 3);
        assert_eq!(times[0], NaiveTime::from_hms_opt(12, 0, 15).unwrap());
        assert_eq!(cfg.weather_api, DEFAULT_WEATHER_API);
    }

    #[test]
    fn invalid_trigger_time_is_rejected() {
        let cfg = Config { trigger_times: vec!["25:00:00".into()], ..Config::default() };
        let err = cfg.trigger_times().unwrap_err();

        assert!(err.to_string().contains("Invalid trigger time '25:00:00'"));
    }

    #[test]
    fn empty_trigger_times_are_rejected() {
        let cfg = Config { trigger_times: Vec::new(), ..Config::default() };
        assert!(matches!(cfg.trigger_times(), Err(ConfigError::NoTriggerTimes)));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = Config::from_toml(
            r#"
            trigger_times = ["08:00:00"]

            [notification]
            data_ms = 3000
            "#,
        )
        .expect("partial config should load");

        assert_eq!(cfg.weather_api, DEFAULT_WEATHER_API);
        assert_eq!(cfg.trigger_times, vec!["08:00:00".to_string()]);
        assert_eq!(cfg.notification.data_duration(), Duration::from_secs(3));
        assert_eq!(cfg.notification.header_duration(), Duration::from_secs(5));
        assert_eq!(cfg.icon_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn toml_with_bad_time_fails_to_load() {
        assert!(Config::from_toml(r#"trigger_times = ["noon"]"#).is_err());
    }

    #[test]
    fn zero_notification_duration_is_rejected() {
        let err = Config::from_toml("[notification]\nheader_ms = 0\ndata_ms = 0").unwrap_err();
        assert!(err.to_string().contains("'notification.header_ms' must be greater than zero"));

        let cfg = Config {
            notification: NotificationConfig { alert_ms: 0, ..NotificationConfig::default() },
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroDuration("notification.alert_ms"))));
    }

    #[test]
    fn zero_icon_timeout_is_rejected() {
        let err = Config::from_toml("icon_timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("'icon_timeout_secs' must be greater than zero"));
    }

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let cfg = Config { cache_dir: Some(PathBuf::from("/tmp/icons")), ..Config::default() };
        let text = toml::to_string_pretty(&cfg).expect("serialize");

        assert_eq!(Config::from_toml(&text).expect("deserialize"), cfg);
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let cfg = Config { cache_dir: Some(PathBuf::from("/tmp/icons")), ..Config::default() };
        assert_eq!(cfg.resolved_cache_dir().unwrap(), PathBuf::from("/tmp/icons"));
    }
}
