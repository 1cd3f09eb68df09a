use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    codes::WeatherCodes,
    config::Config,
    host::{HostContext, NotificationHost},
    icon::IconCache,
    model::{Schedule, WeatherRecord},
    schedule::{TriggerGate, announced_alert, build_schedule},
};

/// What a single poll tick did.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Context was not for us, or carried no weather data.
    Ignored,
    /// Record refreshed, no trigger time reached.
    Polled,
    /// Record refreshed and a notification cycle was started.
    Dispatched(DispatchHandle),
}

/// The plugin: polled by the host, sends the daily weather notifications.
#[derive(Debug)]
pub struct WeatherNotifier {
    config: Config,
    codes: WeatherCodes,
    host: Arc<dyn NotificationHost>,
    gate: TriggerGate,
    icons: IconCache,
    record: Option<WeatherRecord>,
    cycles: u64,
}

impl WeatherNotifier {
    pub fn new(config: Config, host: Arc<dyn NotificationHost>, today: NaiveDate) -> Result<Self> {
        config.validate()?;
        let gate = TriggerGate::new(config.trigger_times()?, today);
        let icons = IconCache::new(config.resolved_cache_dir()?, config.icon_timeout());

        // Icons left behind by an earlier run belong to no pending cycle.
        icons.clear();
        if let Err(e) = icons.ensure_dir() {
            tracing::warn!("Failed to create icon cache {}: {}", icons.dir().display(), e);
        }

        Ok(Self {
            config,
            codes: WeatherCodes::default(),
            host,
            gate,
            icons,
            record: None,
            cycles: 0,
        })
    }

    pub fn with_codes(mut self, codes: WeatherCodes) -> Self {
        self.codes = codes;
        self
    }

    /// Most recently parsed record; `None` before the first valid poll or after an unparsable one.
    pub fn record(&self) -> Option<&WeatherRecord> {
        self.record.as_ref()
    }

    pub fn icon_cache(&self) -> &IconCache {
        &self.icons
    }

    /// Handle one poll tick from the host.
    pub async fn update(&mut self, ctx: &HostContext, now: NaiveDateTime) -> UpdateOutcome {
        self.gate.roll_over(now.date());

        if ctx.weather_api() != Some(self.config.weather_api.as_str()) {
            return UpdateOutcome::Ignored;
        }
        let Some(payload) = ctx.weather_data() else {
            return UpdateOutcome::Ignored;
        };

        self.record = payload.parse(&self.codes);

        if !self.gate.should_fire(now) {
            return UpdateOutcome::Polled;
        }

        tracing::info!("Trigger time {} reached, scheduling weather notifications", now.time());
        UpdateOutcome::Dispatched(self.notify_now().await)
    }

    /// Start a notification cycle for the current record, regardless of the clock.
    ///
    /// Each cycle downloads into, and later removes, its own subdirectory of
    /// the icon cache.
    pub async fn notify_now(&mut self) -> DispatchHandle {
        self.cycles += 1;
        let icons = self.icons.cycle(self.cycles);

        let icon = match announced_alert(self.record.as_ref()) {
            Some(alert) => icons.download(&alert.images.icon).await,
            None => None,
        };

        let schedule = build_schedule(self.record.as_ref(), icon, &self.config.notification);
        dispatch(schedule, Arc::clone(&self.host), icons)
    }
}

/// Spawn one delayed task per job plus the removal of the cycle's icon cache.
///
/// Jobs own their notification, so a later record update does not change
/// what an already dispatched cycle shows. Nothing is cancellable.
pub fn dispatch(
    schedule: Schedule,
    host: Arc<dyn NotificationHost>,
    icons: IconCache,
) -> DispatchHandle {
    let mut tasks = Vec::with_capacity(schedule.jobs.len() + 1);

    for job in schedule.jobs {
        let host = Arc::clone(&host);
        tasks.push(tokio::spawn(async move {
            tokio::time::sleep(job.delay).await;
            tracing::debug!("Sending notification '{}'", job.notification.title);
            host.send_notification(job.notification);
        }));
    }

    let cleanup_after = schedule.cleanup_after;
    tasks.push(tokio::spawn(async move {
        tokio::time::sleep(cleanup_after).await;
        icons.discard();
    }));

    DispatchHandle { tasks }
}

/// Tasks of one dispatched cycle.
#[derive(Debug)]
pub struct DispatchHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl DispatchHandle {
    /// Number of spawned tasks, cleanup included.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait until every notification was sent and the cycle's icons were removed.
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("Notification task failed: {}", e);
            }
        }
    }
}
