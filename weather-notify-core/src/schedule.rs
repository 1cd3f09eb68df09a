//! Building the timed notification sequence for one cycle, and deciding when a
//! cycle is due.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::{collections::HashSet, path::PathBuf, time::Duration};

use crate::{
    config::NotificationConfig,
    model::{Alert, NOT_AVAILABLE, Notification, NotificationJob, Schedule, WeatherRecord},
};

pub const DAILY_TEMP_TITLE: &str = "近三天温度";
pub const DAILY_PRECIP_TITLE: &str = "近三天降雨概率";
pub const HOURLY_WEATHER_TITLE: &str = "接下来三小时天气";

const COLONS: [char; 2] = [':', '：'];

/// Split an alert's detail into `(title, content)` at its first colon.
///
/// Returns `None` when the detail has no colon or the title segment is blank;
/// such alerts are not announced.
pub fn alert_headline(alert: &Alert) -> Option<(String, String)> {
    let (title, content) = alert.detail.split_once(COLONS)?;
    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    Some((title.to_string(), content.trim().to_string()))
}

/// The alert (if any) that will get its own notification this cycle.
pub fn announced_alert(record: Option<&WeatherRecord>) -> Option<&Alert> {
    record
        .and_then(WeatherRecord::first_alert)
        .filter(|alert| alert_headline(alert).is_some())
}

/// Lay out one notification cycle.
///
/// Each notification starts when the previous one leaves the screen. The
/// optional alert sits between the header and the data notifications, and the
/// cache cleanup runs once the last notification is gone.
pub fn build_schedule(
    record: Option<&WeatherRecord>,
    icon: Option<PathBuf>,
    config: &NotificationConfig,
) -> Schedule {
    let mut builder = ScheduleBuilder::new(config.state);

    builder.push(&config.header_title, String::new(), None, config.header_duration());

    if let Some((title, content)) = announced_alert(record).and_then(alert_headline) {
        builder.push(&title, content, icon, config.alert_duration());
    }

    let data = [
        (DAILY_TEMP_TITLE, record.map(|r| r.daily_temp.clone())),
        (DAILY_PRECIP_TITLE, record.map(|r| r.daily_precip.clone())),
        (HOURLY_WEATHER_TITLE, record.map(|r| r.hourly_weather.clone())),
    ];

    for (title, content) in data {
        let content = content.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        builder.push(title, content, None, config.data_duration());
    }

    builder.finish()
}

struct ScheduleBuilder {
    state: u8,
    cursor: Duration,
    jobs: Vec<NotificationJob>,
}

impl ScheduleBuilder {
    fn new(state: u8) -> Self {
        Self { state, cursor: Duration::ZERO, jobs: Vec::new() }
    }

    fn push(&mut self, title: &str, content: String, icon: Option<PathBuf>, duration: Duration) {
        let job = NotificationJob {
            delay: self.cursor,
            notification: Notification {
                state: self.state,
                title: title.to_string(),
                subtitle: String::new(),
                content,
                icon,
                duration,
            },
        };

        self.cursor = job.ends_at();
        self.jobs.push(job);
    }

    fn finish(self) -> Schedule {
        Schedule { jobs: self.jobs, cleanup_after: self.cursor }
    }
}

/// Per-day record of which trigger times already fired.
#[derive(Debug, Clone)]
pub struct TriggerGate {
    times: Vec<NaiveTime>,
    notified: HashSet<NaiveTime>,
    current_date: NaiveDate,
}

impl TriggerGate {
    pub fn new(times: Vec<NaiveTime>, today: NaiveDate) -> Self {
        // Matching is done at whole-second precision.
        let times = times.into_iter().map(truncate_to_second).collect();
        Self { times, notified: HashSet::new(), current_date: today }
    }

    /// Forget everything notified on a previous day.
    pub fn roll_over(&mut self, today: NaiveDate) {
        if today != self.current_date {
            tracing::debug!("Date changed to {}, resetting notified trigger times", today);
            self.notified.clear();
            self.current_date = today;
        }
    }

    /// True exactly once per day for each trigger time, on the tick whose
    /// wall-clock second equals it.
    pub fn should_fire(&mut self, now: NaiveDateTime) -> bool {
        self.roll_over(now.date());

        let time = truncate_to_second(now.time());
        if !self.times.contains(&time) || self.notified.contains(&time) {
            return false;
        }

        self.notified.insert(time);
        true
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }
}

fn truncate_to_second(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}
