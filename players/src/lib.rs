mod generator;
mod heuristic;
mod mcts;
mod player;
mod random;

pub use generator::*;
pub use heuristic::*;
pub use mcts::*;
pub use player::*;
pub use random::*;
