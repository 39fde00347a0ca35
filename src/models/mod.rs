//! Core data models for tournaments.

mod errors;
mod game;
mod history;
mod ids;
mod player;
mod round;
mod standing;
mod tournament;

pub use errors::*;
pub use game::*;
pub use history::*;
pub use ids::*;
pub use player::*;
pub use round::*;
pub use standing::*;
pub use tournament::*;
