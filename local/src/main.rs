use clap::Parser;
use log::*;
use rand_mt::Mt64;

use players::PlayerType;

#[derive(Parser)]
pub struct AppArgs {
    /// who takes the first seat.
    #[clap(long, arg_enum, default_value = "random")]
    player: PlayerType,

    /// who takes the second seat.
    #[clap(long, arg_enum, default_value = "mcts-100")]
    opponent: PlayerType,

    /// how many duels to run back to back.
    #[clap(long, short = 'c', value_parser, default_value_t = 1)]
    duel_cnt: u32,

    /// master seed; the per-player and per-duel streams derive from it.
    #[clap(long, value_parser, default_value_t = 0x42)]
    seed: u64,

    /// pause after every move and print the game state.
    #[clap(long, short, value_parser, default_value_t = false)]
    step_execution: bool,
}

fn main() {
    // Initialize env_logger with a default log level of INFO.
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = AppArgs::parse();

    let mut rng = Mt64::new(args.seed);
    let mut player = args.player.create_player(rng.next_u64());
    let mut opponent = args.opponent.create_player(rng.next_u64());

    let mut won_cnts: [u32; 2] = [0, 0];
    for n in 0..args.duel_cnt {
        let result = local::run(&mut *player, &mut *opponent, &mut rng, args.step_execution);
        won_cnts[1 - result.loser_index] += 1;
        info!(
            "Duel #{}: {} lost after {} turns",
            n, result.loser_name, result.turns
        );
        print_rate(player.get_name(), opponent.get_name(), &won_cnts);
    }

    info!("\n* All duels have finished");
    print_rate(player.get_name(), opponent.get_name(), &won_cnts);
}

fn print_rate(player_name: &str, opponent_name: &str, won_cnts: &[u32; 2]) {
    let total = (won_cnts[0] + won_cnts[1]) as f32;
    info!(
        "{} won cnt: {} ({:.3})",
        player_name,
        won_cnts[0],
        won_cnts[0] as f32 / total
    );
    info!(
        "{} won cnt: {} ({:.3})",
        opponent_name,
        won_cnts[1],
        won_cnts[1] as f32 / total
    );
}
