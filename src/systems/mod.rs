mod daylight;
mod environment;
mod incidents;
mod weather_events;

pub use daylight::DaylightSystem;
pub use environment::EnvironmentSystem;
pub use incidents::IncidentSystem;
pub use weather_events::WeatherEventSystem;
