//! Core library for the weather notification plugin.
//!
//! This crate defines:
//! - Defensive parsing of the host's weather payload into a small record
//! - The timed notification sequence sent at fixed times of day
//! - The host seam (notification API and poll context) and the alert icon cache
//!
//! It is used by `weather-notify-cli`, but can be embedded in any host that
//! implements [`NotificationHost`].

pub mod codes;
pub mod config;
pub mod error;
pub mod host;
pub mod icon;
pub mod model;
pub mod notifier;
pub mod parser;
pub mod schedule;

pub use codes::WeatherCodes;
pub use config::{Config, NotificationConfig};
pub use error::{ConfigError, IconError};
pub use host::{HostContext, LoggingHost, NotificationHost};
pub use icon::IconCache;
pub use model::{Alert, Notification, NotificationJob, Schedule, WeatherRecord};
pub use notifier::{DispatchHandle, UpdateOutcome, WeatherNotifier, dispatch};
pub use parser::{WeatherPayload, parse_weather, parse_weather_str};
pub use schedule::{TriggerGate, build_schedule};
