use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{interval, timeout, MissedTickBehavior},
};
use tracing::{debug, warn};

use super::{WeatherError, WeatherSnapshot};

/// Anything that can produce a fresh snapshot. Fetches may block; the poller
/// runs them off the frame loop.
pub trait WeatherSource: Send + Sync {
    fn fetch(&self) -> Result<WeatherSnapshot, WeatherError>;
}

/// Reads the state file the external weather script keeps up to date.
pub struct FileWeatherSource {
    path: PathBuf,
}

impl FileWeatherSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WeatherSource for FileWeatherSource {
    fn fetch(&self) -> Result<WeatherSnapshot, WeatherError> {
        let text = fs::read_to_string(&self.path)?;
        WeatherSnapshot::parse_state(&text)
    }
}

pub struct StaticWeatherSource {
    snapshot: WeatherSnapshot,
}

impl StaticWeatherSource {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self { snapshot }
    }
}

impl WeatherSource for StaticWeatherSource {
    fn fetch(&self) -> Result<WeatherSnapshot, WeatherError> {
        Ok(self.snapshot.clone())
    }
}

/// Single-slot handoff between the background poller and the frame loop.
/// A newer publish replaces an unread one.
#[derive(Clone, Default)]
pub struct WeatherMailbox {
    slot: Arc<Mutex<Option<WeatherSnapshot>>>,
}

impl WeatherMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: WeatherSnapshot) {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(snapshot);
    }

    pub fn take(&self) -> Option<WeatherSnapshot> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Runs one fetch on the blocking pool, giving up after `limit`.
pub async fn fetch_with_timeout(
    source: Arc<dyn WeatherSource>,
    limit: Duration,
) -> Result<WeatherSnapshot, WeatherError> {
    let task = tokio::task::spawn_blocking(move || source.fetch());
    match timeout(limit, task).await {
        Err(_) => Err(WeatherError::Timeout(limit)),
        Ok(Err(join_err)) => Err(WeatherError::Worker(join_err.to_string())),
        Ok(Ok(result)) => result,
    }
}

/// Polls `source` every `every` (first fetch immediately) and publishes each
/// successful snapshot into `mailbox`. Failures keep whatever the session
/// already has. Abort the returned handle to stop polling.
pub fn spawn_weather_poller(
    source: Arc<dyn WeatherSource>,
    mailbox: WeatherMailbox,
    every: Duration,
    limit: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match fetch_with_timeout(source.clone(), limit).await {
                Ok(snapshot) => {
                    debug!(tag = %snapshot.tag, temperature = snapshot.temperature, "weather fetched");
                    mailbox.publish(snapshot);
                }
                Err(err) => warn!(error = %err, "weather refresh failed, keeping stale data"),
            }
        }
    })
}
