use std::io::stdin;

use log::*;
use rand_mt::Mt64;
use serde::Serialize;

use engine::{
    starter_deck,
    Game,
    GameError,
};
use players::Player;

/// One JSON line per move. The analysis tooling downstream keys on
/// these field names.
#[derive(Debug, Serialize)]
pub struct MoveRecord {
    pub game_over: bool,
    pub game_turn: u32,
    pub player_name: String,
    pub last_move: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_height: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_exploration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser: Option<String>,
}

#[derive(Debug)]
pub struct DuelResult {
    /// 0 for the first seat, 1 for the second.
    pub loser_index: usize,
    pub loser_name: String,
    pub turns: u32,
}

/// Runs one duel to the death, emitting a [`MoveRecord`] JSON line per
/// move on stdout.
pub fn run(
    player: &mut dyn Player,
    opponent: &mut dyn Player,
    rng: &mut Mt64,
    step_execution: bool,
) -> DuelResult {
    let names = [
        player.get_name().to_string(),
        opponent.get_name().to_string(),
    ];
    let decks = vec![starter_deck(rng), starter_deck(rng)];
    let mut game = Game::new(&[&names[0], &names[1]], decks);
    game.start()
        .expect("starter decks cover the opening draws");
    let ids = game.player_ids();
    player.init_game(ids[0], &game);
    opponent.init_game(ids[1], &game);

    debug!("Duel begins: {} vs {}", names[0], names[1]);
    if step_execution {
        println!("{}", game);
    }

    loop {
        let current = game.current_player().unwrap().get_id();
        let mover_index = if current == ids[0] { 0 } else { 1 };
        let (action, stats) = {
            let mover: &mut dyn Player = if mover_index == 0 {
                &mut *player
            } else {
                &mut *opponent
            };
            let action = mover
                .get_action(&game)
                .expect("ending the turn is always possible");
            (action, mover.stats())
        };

        let mut record = MoveRecord {
            game_over: false,
            game_turn: game.get_turn(),
            player_name: names[mover_index].clone(),
            last_move: action.to_string(),
            tree_height: stats.map(|s| s.height),
            tree_exploration: stats.map(|s| s.exploration),
            tree_nodes: stats.map(|s| s.nodes),
            loser: None,
        };

        match action.apply(&mut game) {
            Ok(()) => {
                player.notify_action(&action);
                opponent.notify_action(&action);
                println!("{}", serde_json::to_string(&record).unwrap());
            }
            Err(GameError::DeadPlayer(loser_id)) => {
                let loser_index = if loser_id == ids[0] { 0 } else { 1 };
                record.game_over = true;
                record.loser = Some(names[loser_index].clone());
                println!("{}", serde_json::to_string(&record).unwrap());
                info!("Game over: {} lost on turn {}", names[loser_index], game.get_turn());
                return DuelResult {
                    loser_index,
                    loser_name: names[loser_index].clone(),
                    turns: game.get_turn(),
                };
            }
            Err(GameError::Invalid(e)) => {
                panic!(
                    "{} returned an invalid action ({}): {}",
                    names[mover_index], action, e
                );
            }
        }

        if step_execution {
            println!("{}", game);
            println!("Press enter key to continue");
            stdin().read_line(&mut String::new()).unwrap();
        }
    }
}
