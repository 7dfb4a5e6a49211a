use std::{path::PathBuf, sync::Arc, time::Duration};

use verdant::{
    clock::FixedClock,
    weather::{
        fetch_with_timeout, spawn_weather_poller, FileWeatherSource, StaticWeatherSource,
        WeatherError, WeatherMailbox, WeatherSnapshot, WeatherSource, WeatherTag,
    },
    GameplaySession, PlantCatalogue, SessionConfig,
};

fn asset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join(name)
}

async fn wait_for(mailbox: &WeatherMailbox) -> Option<WeatherSnapshot> {
    for _ in 0..200 {
        if let Some(snapshot) = mailbox.take() {
            return Some(snapshot);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}

#[test]
fn bundled_state_file_parses() {
    let snapshot = FileWeatherSource::new(asset("weather_state.txt"))
        .fetch()
        .unwrap();
    assert_eq!(snapshot.tag, WeatherTag::Clear);
    assert_eq!(snapshot.humidity, 48.0);
    assert_eq!(snapshot.sunrise_seconds, 6 * 3600 + 40 * 60);
    assert_eq!(snapshot.sunset_seconds, 17 * 3600 + 40 * 60);
    assert_eq!(snapshot.sunrise_ts, Some(1_760_824_800));
    assert_eq!(snapshot.sunset_ts, Some(1_760_864_400));
}

#[test]
fn state_without_tag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weather_state.txt");
    std::fs::write(&path, "TEMP=3.0\nHUMIDITY=90\n").unwrap();
    assert!(matches!(
        FileWeatherSource::new(&path).fetch(),
        Err(WeatherError::MissingField("TAG"))
    ));
}

#[tokio::test]
async fn static_source_resolves_within_limit() {
    let source: Arc<dyn WeatherSource> =
        Arc::new(StaticWeatherSource::new(WeatherSnapshot::new(WeatherTag::Storm)));
    let snapshot = fetch_with_timeout(source, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(snapshot.tag, WeatherTag::Storm);
}

#[tokio::test]
async fn poller_feeds_a_running_session() {
    let catalogue = PlantCatalogue::load(asset("plants.json")).unwrap();
    let mut session = GameplaySession::start(&catalogue, 1, SessionConfig::calm())
        .unwrap()
        .with_clock(FixedClock(12 * 3600));
    assert_eq!(session.effective_tag(), WeatherTag::Unknown);

    let poller = spawn_weather_poller(
        Arc::new(FileWeatherSource::new(asset("weather_state.txt"))),
        session.mailbox(),
        Duration::from_secs(60),
        Duration::from_secs(2),
    );
    let shared = session.mailbox();
    let snapshot = wait_for(&shared).await;
    poller.abort();

    // Hand the fetched snapshot back so the next tick picks it up.
    let snapshot = snapshot.expect("poller should publish the bundled state");
    shared.publish(snapshot);
    session.tick(1.0 / 60.0);
    assert_eq!(session.weather().tag, WeatherTag::Clear);
    assert_eq!(session.effective_tag(), WeatherTag::Clear);
}

#[tokio::test]
async fn failed_refresh_keeps_stale_weather() {
    let dir = tempfile::tempdir().unwrap();
    let catalogue = PlantCatalogue::load(asset("plants.json")).unwrap();
    let mut session = GameplaySession::start(&catalogue, 0, SessionConfig::calm())
        .unwrap()
        .with_clock(FixedClock(12 * 3600))
        .with_weather(WeatherSnapshot::new(WeatherTag::Rain));

    let poller = spawn_weather_poller(
        Arc::new(FileWeatherSource::new(dir.path().join("missing.txt"))),
        session.mailbox(),
        Duration::from_millis(10),
        Duration::from_millis(200),
    );
    tokio::time::sleep(Duration::from_millis(60)).await;
    poller.abort();

    let report = session.tick(0.5);
    assert!(report.events.is_empty());
    assert_eq!(session.weather().tag, WeatherTag::Rain);
    assert_eq!(session.effective_tag(), WeatherTag::Rain);
}
