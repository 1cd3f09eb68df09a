use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use weather_notify_core::{
    Config, HostContext, LoggingHost, UpdateOutcome, WeatherCodes, WeatherNotifier,
    build_schedule, config::parse_trigger_time, parse_weather_str,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-notify",
    version,
    about = "Daily weather notifications for a widget host"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a weather payload file and print the resulting record.
    Parse {
        /// JSON file holding the `Weather_Data` payload.
        payload: PathBuf,
    },

    /// Print the notification plan a payload would produce.
    Plan {
        /// JSON file holding the `Weather_Data` payload.
        payload: PathBuf,
    },

    /// Send one notification cycle right now for a host context file.
    Fire {
        /// JSON file holding the host context (`Weather_API`, `Weather_Data`).
        context: PathBuf,
    },

    /// Poll a host context file and notify at the configured times of day.
    Run {
        /// JSON file holding the host context; re-read on every tick.
        context: PathBuf,

        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Interactively edit trigger times, API sentinel and download timeout.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Parse { payload } => parse(&payload),
            Command::Plan { payload } => plan(&payload),
            Command::Fire { context } => fire(&context).await,
            Command::Run { context, interval_ms } => {
                poll(&context, Duration::from_millis(interval_ms)).await
            }
            Command::Configure => configure(),
        }
    }
}

fn parse(payload: &Path) -> Result<()> {
    let text = read(payload)?;

    match parse_weather_str(&WeatherCodes::default(), &text) {
        Some(record) => {
            let pretty = serde_json::to_string_pretty(&record)
                .context("Failed to serialize weather record")?;
            println!("{pretty}");
            Ok(())
        }
        None => bail!("Payload {} could not be parsed", payload.display()),
    }
}

fn plan(payload: &Path) -> Result<()> {
    let config = Config::load()?;
    let text = read(payload)?;
    let record = parse_weather_str(&WeatherCodes::default(), &text);

    let schedule = build_schedule(record.as_ref(), None, &config.notification);

    for job in &schedule.jobs {
        let n = &job.notification;
        println!(
            "+{:>6}ms  [{:>6}ms]  {}  {}",
            job.delay.as_millis(),
            n.duration.as_millis(),
            n.title,
            n.content
        );
    }
    println!("+{:>6}ms  cleanup icon cache", schedule.cleanup_after.as_millis());

    Ok(())
}

async fn fire(context: &Path) -> Result<()> {
    let ctx = read_context(context)?;
    let now = Local::now().naive_local();
    let mut notifier = WeatherNotifier::new(Config::load()?, Arc::new(LoggingHost), now.date())?;

    let handle = match notifier.update(&ctx, now).await {
        UpdateOutcome::Ignored => bail!(
            "Context {} has no usable weather data or a different Weather_API",
            context.display()
        ),
        UpdateOutcome::Dispatched(handle) => handle,
        UpdateOutcome::Polled => notifier.notify_now().await,
    };

    handle.join().await;
    Ok(())
}

async fn poll(context: &Path, interval: Duration) -> Result<()> {
    let today = Local::now().date_naive();
    let mut notifier = WeatherNotifier::new(Config::load()?, Arc::new(LoggingHost), today)?;
    let mut ticker = tokio::time::interval(interval);

    tracing::info!("Polling {} every {:?}", context.display(), interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping");
                return Ok(());
            }
        }

        let ctx = match read_context(context) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!("{:#}", e);
                continue;
            }
        };

        match notifier.update(&ctx, Local::now().naive_local()).await {
            UpdateOutcome::Ignored => tracing::debug!("Context ignored"),
            UpdateOutcome::Polled => {}
            UpdateOutcome::Dispatched(handle) => {
                tracing::info!("Dispatched {} notification tasks", handle.len());
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let times = Text::new("Trigger times (HH:MM:SS, comma separated):")
        .with_default(&config.trigger_times.join(", "))
        .with_validator(|input: &str| {
            let bad = input.split(',').find(|t| parse_trigger_time(t).is_err());
            Ok(match bad {
                Some(t) => inquire::validator::Validation::Invalid(
                    format!("'{}' is not a valid HH:MM:SS time", t.trim()).into(),
                ),
                None => inquire::validator::Validation::Valid,
            })
        })
        .prompt()?;

    let weather_api = Text::new("Accepted Weather_API value:")
        .with_default(&config.weather_api)
        .prompt()?;

    let timeout = CustomType::<u64>::new("Icon download timeout (seconds):")
        .with_default(config.icon_timeout_secs)
        .prompt()?;

    config.trigger_times = times.split(',').map(|t| t.trim().to_string()).collect();
    config.weather_api = weather_api.trim().to_string();
    config.icon_timeout_secs = timeout;
    config.validate()?;

    if Confirm::new("Save configuration?").with_default(true).prompt()? {
        config.save()?;
        println!("Saved to {}", Config::config_file_path()?.display());
    }

    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_context(path: &Path) -> Result<HostContext> {
    let text = read(path)?;
    HostContext::from_json(&text)
        .with_context(|| format!("Failed to parse host context {}", path.display()))
}
