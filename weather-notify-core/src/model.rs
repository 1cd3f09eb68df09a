use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Placeholder for any forecast slot that has no data.
pub const NOT_AVAILABLE: &str = "N/A";

/// Parsed weather summary used to fill notification text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub daily_temp: String,
    pub daily_precip: String,
    pub hourly_weather: String,
    pub alerts: Vec<Alert>,
}

impl WeatherRecord {
    pub fn first_alert(&self) -> Option<&Alert> {
        self.alerts.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub title: String,
    pub detail: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
    #[serde(rename = "pubTime")]
    pub pub_time: String,
    pub images: AlertImages,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertImages {
    pub icon: String,
}

/// Arguments of a single host notification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub state: u8,
    pub title: String,
    pub subtitle: String,
    pub content: String,
    pub icon: Option<PathBuf>,
    pub duration: Duration,
}

/// A notification waiting to be shown `delay` after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationJob {
    pub delay: Duration,
    pub notification: Notification,
}

impl NotificationJob {
    /// Instant (relative to dispatch) at which this notification leaves the screen.
    pub fn ends_at(&self) -> Duration {
        self.delay + self.notification.duration
    }
}

/// Ordered batch of jobs for one notification cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub jobs: Vec<NotificationJob>,
    /// Delay after which the icon cache is emptied.
    pub cleanup_after: Duration,
}
