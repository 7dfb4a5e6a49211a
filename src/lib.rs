pub mod actions;
pub mod clock;
pub mod config;
pub mod engine;
pub mod garden;
pub mod journal;
pub mod plant;
pub mod progression;
pub mod rng;
pub mod session;
pub mod systems;
pub mod weather;

pub use actions::{ActionOutcome, PlayerAction, TempDirection};
pub use config::SessionConfig;
pub use plant::PlantCatalogue;
pub use session::{GameplaySession, SessionError, TickReport};
