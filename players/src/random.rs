use rand_mt::Mt64;

use engine::{
    Action,
    Game,
    PlayerId,
};

use super::{
    generator::ActionGenerator,
    Player,
};

/// Plays the first legal action the generator hands out.
pub struct RandomPlayer {
    name: String,
    rng: Mt64,
}

impl RandomPlayer {
    pub fn new(name: String, seed: u64) -> RandomPlayer {
        RandomPlayer {
            name,
            rng: Mt64::new(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn init_game(&mut self, _player_id: PlayerId, _game: &Game) {}

    fn get_action(&mut self, game: &Game) -> Option<Action> {
        let mut generator = ActionGenerator::new(game, None, &mut self.rng);
        generator
            .next_action(&mut self.rng)
            .map(|legal| legal.action)
    }
}
