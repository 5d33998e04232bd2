mod ability;
mod action;
mod board;
mod card;
mod error;
mod game;
mod ident;
mod player;

pub use ability::*;
pub use action::*;
pub use board::*;
pub use card::*;
pub use error::{
    ActionError,
    GameError,
};
pub use game::*;
pub use ident::*;
pub use player::*;
