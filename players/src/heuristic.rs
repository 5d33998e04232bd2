use rand_mt::Mt64;

use engine::{
    Action,
    Game,
    PlayerId,
};

use super::{
    generator::{
        ActionGenerator,
        LegalAction,
    },
    Player,
};

/// Goes face: hero attacks first, then any attack, then whatever is
/// left.
pub struct AggressivePlayer {
    name: String,
    rng: Mt64,
}

impl AggressivePlayer {
    pub fn new(name: String, seed: u64) -> AggressivePlayer {
        AggressivePlayer {
            name,
            rng: Mt64::new(seed),
        }
    }
}

impl Player for AggressivePlayer {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn init_game(&mut self, _player_id: PlayerId, _game: &Game) {}

    fn get_action(&mut self, game: &Game) -> Option<Action> {
        let actions =
            ActionGenerator::new(game, None, &mut self.rng).collect_actions(&mut self.rng);
        pick(&actions, |action| action.attacks_hero())
            .or_else(|| pick(&actions, Action::is_attack))
            .or_else(|| actions.first().map(|legal| legal.action.clone()))
    }
}

/// Trades units away before anything else, leaving heroes alone as long
/// as there is a board to fight over.
pub struct ControllingPlayer {
    name: String,
    rng: Mt64,
}

impl ControllingPlayer {
    pub fn new(name: String, seed: u64) -> ControllingPlayer {
        ControllingPlayer {
            name,
            rng: Mt64::new(seed),
        }
    }
}

impl Player for ControllingPlayer {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn init_game(&mut self, _player_id: PlayerId, _game: &Game) {}

    fn get_action(&mut self, game: &Game) -> Option<Action> {
        let actions =
            ActionGenerator::new(game, None, &mut self.rng).collect_actions(&mut self.rng);
        pick(&actions, |action| {
            action.is_attack() && !action.attacks_hero()
        })
        .or_else(|| actions.first().map(|legal| legal.action.clone()))
    }
}

fn pick(actions: &[LegalAction], matcher: impl Fn(&Action) -> bool) -> Option<Action> {
    actions
        .iter()
        .find(|legal| matcher(&legal.action))
        .map(|legal| legal.action.clone())
}
