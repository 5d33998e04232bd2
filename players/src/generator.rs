use itertools::Itertools;
use log::*;
use rand::{
    seq::SliceRandom,
    Rng,
};
use rand_mt::Mt64;

use engine::{
    Action,
    CardId,
    Game,
    GameError,
    PlayerId,
    Target,
};

/// An action proven legal by applying it to a throwaway clone of the
/// driving state.
#[derive(Debug, Clone)]
pub struct LegalAction {
    pub action: Action,
    /// Applying the action ends the game.
    pub terminal: bool,
}

/// Enumerates the moves available to the current player in a uniformly
/// random order. Three candidate queues are built up front (plays,
/// attacks, end turn); every pull drains a random non-empty queue and
/// validates the candidate before handing it out.
///
/// When `searcher` names a player other than the current one, the
/// current hand is treated as hidden: every card not yet seen in play or
/// in the graveyard is proposed as a weighted `ProbablePlay` hypothesis.
pub struct ActionGenerator<'a> {
    game: &'a Game,
    queues: [Vec<Action>; 3],
}

impl<'a> ActionGenerator<'a> {
    pub fn new(game: &'a Game, searcher: Option<PlayerId>, rng: &mut Mt64) -> ActionGenerator<'a> {
        let queues = if game.is_started() {
            [
                raw_play_actions(game, searcher, rng),
                raw_attack_actions(game, rng),
                raw_endturn_action(game),
            ]
        } else {
            [vec![], vec![], vec![]]
        };
        ActionGenerator { game, queues }
    }

    /// Pulls the next legal action, or `None` once every candidate has
    /// been either yielded or filtered.
    pub fn next_action(&mut self, rng: &mut Mt64) -> Option<LegalAction> {
        loop {
            let live: Vec<usize> = self
                .queues
                .iter()
                .enumerate()
                .filter(|(_, queue)| !queue.is_empty())
                .map(|(i, _)| i)
                .collect();
            if live.is_empty() {
                return None;
            }
            let queue = live[rng.gen_range(0..live.len())];
            let action = self.queues[queue].pop().unwrap();
            match validate(self.game, &action) {
                Ok(()) => {
                    return Some(LegalAction {
                        action,
                        terminal: false,
                    })
                }
                Err(GameError::DeadPlayer(_)) => {
                    return Some(LegalAction {
                        action,
                        terminal: true,
                    })
                }
                Err(GameError::Invalid(e)) => trace!("Filtered {}: {}", action, e),
            }
        }
    }

    /// Drains the generator into the complete legal set.
    pub fn collect_actions(mut self, rng: &mut Mt64) -> Vec<LegalAction> {
        let mut actions = vec![];
        while let Some(action) = self.next_action(rng) {
            actions.push(action);
        }
        debug!("Found {} legal actions", actions.len());
        actions
    }

    pub fn play_actions(&self) -> Vec<LegalAction> {
        validated(self.game, &self.queues[0])
    }

    pub fn attack_actions(&self) -> Vec<LegalAction> {
        validated(self.game, &self.queues[1])
    }

    pub fn endturn_action(&self) -> Vec<LegalAction> {
        validated(self.game, &self.queues[2])
    }

    /// The legal set in a fresh random interleaving, without consuming
    /// the generator.
    pub fn random_actions(&self, rng: &mut Mt64) -> Vec<LegalAction> {
        let clone = ActionGenerator {
            game: self.game,
            queues: self.queues.clone(),
        };
        clone.collect_actions(rng)
    }
}

/// Applies uniformly random legal actions in place until a player dies.
/// Returns the loser.
pub fn random_playout(game: &mut Game, rng: &mut Mt64) -> Option<PlayerId> {
    loop {
        let next = {
            let mut generator = ActionGenerator::new(game, None, rng);
            generator.next_action(rng)
        };
        let legal = match next {
            Some(legal) => legal,
            None => {
                warn!("No legal action available; abandoning the playout");
                return None;
            }
        };
        match legal.action.apply(game) {
            Ok(()) => (),
            Err(GameError::DeadPlayer(loser)) => return Some(loser),
            Err(GameError::Invalid(e)) => {
                // Validation just proved this action on an identical clone.
                debug_assert!(false, "validated action failed to apply: {}", e);
            }
        }
    }
}

fn validate(game: &Game, action: &Action) -> Result<(), GameError> {
    let mut probe = game.copy();
    action.apply(&mut probe)
}

fn validated(game: &Game, candidates: &[Action]) -> Vec<LegalAction> {
    candidates
        .iter()
        .filter_map(|action| match validate(game, action) {
            Ok(()) => Some(LegalAction {
                action: action.clone(),
                terminal: false,
            }),
            Err(GameError::DeadPlayer(_)) => Some(LegalAction {
                action: action.clone(),
                terminal: true,
            }),
            Err(GameError::Invalid(_)) => None,
        })
        .collect()
}

fn raw_play_actions(game: &Game, searcher: Option<PlayerId>, rng: &mut Mt64) -> Vec<Action> {
    let current = match game.current_player() {
        Some(player) => player,
        None => return vec![],
    };
    let player = current.get_id();
    let mut targets: Vec<Option<CardId>> = game
        .get_board()
        .units_of(player)
        .iter()
        .map(|card| Some(card.get_id()))
        .collect();
    targets.push(None);

    let hidden = searcher.map_or(false, |searcher| searcher != player);
    let mut actions: Vec<Action> = if !hidden {
        current
            .hand()
            .iter()
            .map(|card| card.get_id())
            .cartesian_product(targets)
            .map(|(card, target)| Action::Play {
                player,
                card,
                target,
            })
            .collect()
    } else {
        // Hidden hand: any card neither played nor buried may be held,
        // each with the same probability.
        let hand_size = current.hand().len();
        let unknown: Vec<CardId> = current
            .deck()
            .cards()
            .iter()
            .chain(current.hand().iter())
            .map(|card| card.get_id())
            .collect();
        if hand_size == 0 || unknown.is_empty() {
            vec![]
        } else {
            let chance = hand_size as f64 / unknown.len() as f64;
            unknown
                .into_iter()
                .cartesian_product(targets)
                .map(|(card, target)| Action::ProbablePlay {
                    chance,
                    player,
                    card,
                    target,
                })
                .collect()
        }
    };
    actions.shuffle(rng);
    actions
}

fn raw_attack_actions(game: &Game, rng: &mut Mt64) -> Vec<Action> {
    let current = match game.current_player() {
        Some(player) => player,
        None => return vec![],
    };
    let player = current.get_id();
    let mut victims: Vec<Target> = game
        .get_board()
        .enemy_cards(player)
        .iter()
        .map(|card| Target::Unit(card.get_id()))
        .collect();
    victims.push(Target::Hero(game.next_player().get_id()));

    let mut actions: Vec<Action> = game
        .get_board()
        .units_of(player)
        .iter()
        .map(|card| card.get_id())
        .cartesian_product(victims)
        .map(|(attacker, victim)| Action::Attack {
            player,
            attacker,
            victim,
        })
        .collect();
    actions.shuffle(rng);
    actions
}

fn raw_endturn_action(game: &Game) -> Vec<Action> {
    match game.current_player() {
        Some(player) => vec![Action::EndTurn(player.get_id())],
        None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use engine::{
        Ability,
        Card,
        Deck,
    };
    use more_asserts::*;

    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn unit(name: &str, cost: u32) -> Card {
        Card::new_unit(name, cost, 1, 1, Ability::None)
    }

    #[test]
    fn test_play_actions_filter_unaffordable_cards() {
        init();
        let deck = Deck::new(vec![unit("a", 1), unit("b", 1), unit("c", 100)]);
        let mut g = Game::with_hand_sizes(&["solo"], vec![deck], &[2]);
        g.start().unwrap();
        let mut rng = Mt64::new(42);
        let generator = ActionGenerator::new(&g, None, &mut rng);

        assert_eq!(3, g.get_players()[0].hand().len());
        assert_eq!(0, generator.attack_actions().len());
        assert_eq!(2, generator.play_actions().len());
        assert_eq!(1, generator.endturn_action().len());
        assert_eq!(3, generator.random_actions(&mut rng).len());
    }

    #[test]
    fn test_attack_actions_respect_attack_flag() {
        init();
        // Three own units, an empty-handed opponent: only the charge
        // unit played this turn may attack, and only the hero is there
        // to hit.
        let deck = Deck::new(vec![
            unit("a", 0),
            unit("b", 0),
            Card::new_unit("rusher", 0, 1, 1, Ability::Charge),
        ]);
        let other = Deck::new(vec![]);
        let mut g = Game::with_hand_sizes(&["first", "second"], vec![deck, other], &[2, 0]);
        g.start().unwrap();
        let player = g.get_players()[0].get_id();
        let cards: Vec<CardId> = g.get_players()[0]
            .hand()
            .iter()
            .map(|c| c.get_id())
            .collect();
        for card in cards {
            g.play(player, card, None).unwrap();
        }

        let mut rng = Mt64::new(42);
        let generator = ActionGenerator::new(&g, None, &mut rng);
        assert_eq!(0, g.get_players()[0].hand().len());
        assert_eq!(1, generator.attack_actions().len());
        assert_eq!(0, generator.play_actions().len());
        assert_eq!(1, generator.endturn_action().len());
        assert_eq!(2, generator.random_actions(&mut rng).len());
    }

    #[test]
    fn test_attack_actions_with_enemies() {
        init();
        let deck = Deck::new(vec![unit("a", 0), Card::new_unit("rusher", 0, 1, 1, Ability::Charge)]);
        let other = Deck::new(vec![unit("b", 0)]);
        let mut g = Game::with_hand_sizes(&["first", "second"], vec![deck, other], &[1, 0]);
        g.start().unwrap();
        let (first, second) = (
            g.get_players()[0].get_id(),
            g.get_players()[1].get_id(),
        );
        // First fields a plain unit, second fields one too; on the
        // first player's next turn a charge unit joins in.
        let plain = g.get_players()[0].hand()[0].get_id();
        g.play(first, plain, None).unwrap();
        g.endturn(first).unwrap();
        let enemy = g.get_players()[1].hand()[0].get_id();
        g.play(second, enemy, None).unwrap();
        g.endturn(second).unwrap();
        let rusher = g.get_players()[0].hand()[0].get_id();
        g.play(first, rusher, None).unwrap();

        let mut rng = Mt64::new(42);
        let generator = ActionGenerator::new(&g, None, &mut rng);
        // Both own units can attack the enemy unit or the enemy hero.
        assert_eq!(4, generator.attack_actions().len());
        assert_eq!(0, generator.play_actions().len());
        assert_eq!(1, generator.endturn_action().len());
        assert_eq!(5, generator.random_actions(&mut rng).len());
    }

    #[test]
    fn test_untargetable_cards_only_play_without_target() {
        init();
        let deck = Deck::new(vec![
            Card::new_unit("statue", 0, 10, 10, Ability::None),
            Card::new_unit("rusher", 0, 1, 1, Ability::Charge),
            Card::new_spell(
                "storm",
                0,
                Ability::DealDamage {
                    value: 4,
                    can_target: false,
                },
            ),
        ]);
        let other = Deck::new(vec![]);
        let mut g = Game::with_hand_sizes(&["first", "second"], vec![deck, other], &[2, 0]);
        g.start().unwrap();
        let player = g.get_players()[0].get_id();
        let statue = g.get_players()[0].hand()[0].get_id();
        g.play(player, statue, None).unwrap();

        let mut rng = Mt64::new(42);
        let generator = ActionGenerator::new(&g, None, &mut rng);
        // Each remaining card pairs with {statue, none}; only the
        // targetless pairing survives validation.
        assert_eq!(2, generator.play_actions().len());
    }

    #[test]
    fn test_nothing_is_generated_before_start() {
        let deck = Deck::new(vec![unit("a", 1)]);
        let g = Game::with_hand_sizes(&["solo"], vec![deck], &[1]);
        let mut rng = Mt64::new(42);
        let generator = ActionGenerator::new(&g, None, &mut rng);
        assert!(generator.random_actions(&mut rng).is_empty());
    }

    #[test]
    fn test_generated_actions_apply_cleanly() {
        init();
        let mut rng = Mt64::new(42);
        let mut g = Game::default_pair(&mut rng);
        g.start().unwrap();

        let generator = ActionGenerator::new(&g, None, &mut rng);
        let actions = generator.random_actions(&mut rng);
        assert_gt!(actions.len(), 0);
        for legal in actions {
            let mut probe = g.copy();
            match legal.action.apply(&mut probe) {
                Ok(()) => assert!(!legal.terminal),
                Err(GameError::DeadPlayer(_)) => assert!(legal.terminal),
                Err(GameError::Invalid(e)) => panic!("illegal action yielded: {}", e),
            }
        }
    }

    #[test]
    fn test_hidden_hand_produces_weighted_hypotheses() {
        init();
        let make_deck = || Deck::new((0..10).map(|i| unit(&format!("u{}", i), 0)).collect());
        let mut g = Game::new(&["searcher", "opponent"], vec![make_deck(), make_deck()]);
        g.start().unwrap();
        let (searcher, opponent) = (
            g.get_players()[0].get_id(),
            g.get_players()[1].get_id(),
        );
        g.endturn(searcher).unwrap();

        // The opponent holds 5 of their 10 cards; all 10 are unseen.
        assert_eq!(5, g.get_players()[1].hand().len());
        let mut rng = Mt64::new(42);
        let generator = ActionGenerator::new(&g, Some(searcher), &mut rng);
        let plays = generator.play_actions();
        assert_eq!(10, plays.len());
        for legal in &plays {
            match &legal.action {
                Action::ProbablePlay { chance, player, .. } => {
                    assert_eq!(0.5, *chance);
                    assert_eq!(opponent, *player);
                }
                other => panic!("expected a hidden-hand play, got {}", other),
            }
        }
    }

    #[test]
    fn test_known_hand_for_the_searching_player() {
        let make_deck = || Deck::new((0..10).map(|i| unit(&format!("u{}", i), 0)).collect());
        let mut g = Game::new(&["searcher", "opponent"], vec![make_deck(), make_deck()]);
        g.start().unwrap();
        let searcher = g.get_players()[0].get_id();

        let mut rng = Mt64::new(42);
        let generator = ActionGenerator::new(&g, Some(searcher), &mut rng);
        let plays = generator.play_actions();
        assert_eq!(4, plays.len());
        assert!(plays
            .iter()
            .all(|legal| matches!(legal.action, Action::Play { .. })));
    }

    #[test]
    fn test_random_playout_terminates() {
        init();
        let mut rng = Mt64::new(42);
        let mut g = Game::default_pair(&mut rng);
        g.start().unwrap();
        let ids = g.player_ids();

        let loser = random_playout(&mut g, &mut rng);
        assert!(loser.is_some());
        assert!(ids.contains(&loser.unwrap()));
    }
}
