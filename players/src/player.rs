use engine::{
    Action,
    Game,
    PlayerId,
};

use super::{
    heuristic::{
        AggressivePlayer,
        ControllingPlayer,
    },
    mcts::MctsPlayer,
    random::RandomPlayer,
};

/// Search statistics a planner can report after picking a move.
#[derive(Debug, Clone, Copy)]
pub struct TreeStats {
    pub height: usize,
    pub nodes: usize,
    pub exploration: f64,
}

/// The base trait for all player implementations.
pub trait Player {
    fn get_name(&self) -> &str;

    /// Called once per duel, before the first action.
    fn init_game(&mut self, player_id: PlayerId, game: &Game);

    /// Picks the next move; `None` means no legal action was found.
    fn get_action(&mut self, game: &Game) -> Option<Action>;

    /// Observes every committed move, the player's own included.
    fn notify_action(&mut self, _action: &Action) {}

    fn stats(&self) -> Option<TreeStats> {
        None
    }
}

#[derive(Clone, Debug)]
pub enum PlayerType {
    Random,
    Aggressive,
    Controlling,
    Mcts { iterations: usize },
}

const PLAYER_TYPE_VARIANTS: [PlayerType; 7] = [
    PlayerType::Random,
    PlayerType::Aggressive,
    PlayerType::Controlling,
    PlayerType::Mcts { iterations: 10 },
    PlayerType::Mcts { iterations: 100 },
    PlayerType::Mcts { iterations: 300 },
    PlayerType::Mcts { iterations: 1000 },
];

impl clap::ArgEnum for PlayerType {
    fn value_variants<'a>() -> &'a [Self] {
        &PLAYER_TYPE_VARIANTS
    }

    fn to_possible_value<'a>(&self) -> Option<clap::PossibleValue<'a>> {
        let name = match self {
            PlayerType::Random => "random",
            PlayerType::Aggressive => "aggressive",
            PlayerType::Controlling => "controlling",
            PlayerType::Mcts { iterations: 10 } => "mcts-10",
            PlayerType::Mcts { iterations: 100 } => "mcts-100",
            PlayerType::Mcts { iterations: 300 } => "mcts-300",
            PlayerType::Mcts { iterations: 1000 } => "mcts-1000",
            _ => panic!(),
        };
        Some(clap::PossibleValue::new(name))
    }
}

impl PlayerType {
    pub fn create_player(&self, seed: u64) -> Box<dyn Player> {
        match self {
            PlayerType::Random => Box::new(RandomPlayer::new("random".into(), seed)),
            PlayerType::Aggressive => Box::new(AggressivePlayer::new("aggressive".into(), seed)),
            PlayerType::Controlling => {
                Box::new(ControllingPlayer::new("controlling".into(), seed))
            }
            PlayerType::Mcts { iterations } => Box::new(MctsPlayer::new(
                format!("mcts-{}", iterations),
                seed,
                *iterations,
            )),
        }
    }
}
