use crate::application::binding_registry::SubscriptionMode;
use crate::application::fetch_scheduler::SchedulerSettings;
use anyhow::Context;
use chrono::TimeDelta;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub twinmaker: TwinMakerSettings,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TwinMakerSettings {
    pub region: String,
    pub workspace_id: String,
    #[serde(default)]
    pub role_arn: Option<String>,
    /// Overrides the regional service endpoint, e.g. a signing proxy.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl TwinMakerSettings {
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://iottwinmaker.{}.amazonaws.com", self.region),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    pub interval_secs: f64,
    pub max_workers: usize,
    pub fetch_timeout_secs: f64,
    pub initial_lookback_secs: f64,
    pub subscription_mode: SubscriptionMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 2.0,
            max_workers: 4,
            fetch_timeout_secs: 10.0,
            initial_lookback_secs: 15.0,
            subscription_mode: SubscriptionMode::RefCounted,
        }
    }
}

impl SchedulerConfig {
    pub fn settings(&self) -> anyhow::Result<SchedulerSettings> {
        if self.max_workers == 0 {
            anyhow::bail!("scheduler.max_workers must be at least 1");
        }

        Ok(SchedulerSettings {
            interval: seconds("scheduler.interval_secs", self.interval_secs)?,
            max_workers: self.max_workers,
            fetch_timeout: seconds("scheduler.fetch_timeout_secs", self.fetch_timeout_secs)?,
            initial_lookback: seconds("scheduler.initial_lookback_secs", self.initial_lookback_secs)?,
        })
    }
}

fn seconds(key: &str, value: f64) -> anyhow::Result<Duration> {
    let duration = Duration::try_from_secs_f64(value)
        .with_context(|| format!("{} must be a non-negative number, got {}", key, value))?;
    // Windows are computed on chrono timestamps.
    TimeDelta::from_std(duration).with_context(|| format!("{} is too large, got {}", key, value))?;

    Ok(duration)
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HostConfig {
    pub frame_millis: u64,
    pub listen_addr: String,
    pub bindings_file: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_millis: 16,
            listen_addr: "0.0.0.0:8080".to_string(),
            bindings_file: None,
        }
    }
}

/// Read `config/twinmaker.*`, overridden by `TWINMAKER__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/twinmaker"))
        .add_source(
            config::Environment::with_prefix("TWINMAKER")
                .separator("__")
                .try_parsing(true),
        );

    build_app_config(builder)
}

fn build_app_config(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let settings = builder.build()?;

    Ok(settings.try_deserialize()?)
}
