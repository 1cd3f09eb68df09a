use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::{model::Notification, parser::WeatherPayload};

pub const WEATHER_API_KEY: &str = "Weather_API";
pub const WEATHER_DATA_KEY: &str = "Weather_Data";

/// The widget host's notification surface.
pub trait NotificationHost: Send + Sync + Debug {
    fn send_notification(&self, notification: Notification);
}

/// Context mapping the host passes on every poll tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostContext(Map<String, Value>);

impl HostContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn weather_api(&self) -> Option<&str> {
        self.get(WEATHER_API_KEY).and_then(Value::as_str)
    }

    /// `Weather_Data` as text or object. Empty strings and `null` count as absent.
    pub fn weather_data(&self) -> Option<WeatherPayload> {
        match self.get(WEATHER_DATA_KEY)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(WeatherPayload::Text(s.clone())),
            other => Some(WeatherPayload::Object(other.clone())),
        }
    }
}

/// Host that only reports notifications through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingHost;

impl NotificationHost for LoggingHost {
    fn send_notification(&self, notification: Notification) {
        tracing::info!(
            state = notification.state,
            title = %notification.title,
            subtitle = %notification.subtitle,
            content = %notification.content,
            icon = ?notification.icon,
            duration_ms = notification.duration.as_millis() as u64,
            "notification"
        );
    }
}
