//! Catalog services consuming the repository interfaces.

pub mod counter;
pub mod game_service;

pub use counter::{AtomicGameCounter, GameCounter};
pub use game_service::GameService;
