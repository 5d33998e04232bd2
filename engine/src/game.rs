use std::fmt::{
    Display,
    Formatter,
};

use log::*;
use more_asserts::*;
use rand::Rng;

use crate::{
    action::Target,
    board::Board,
    card::{
        starter_deck,
        Deck,
    },
    error::{
        ActionError,
        GameError,
    },
    ident::{
        CardId,
        PlayerId,
    },
    player::Player,
};

pub const NUMBERS_OF_START_CARDS: [usize; 2] = [3, 4];
pub const DEFAULT_PLAYER_NAMES: [&str; 2] = ["Player 1", "Player 2"];

/// The whole game state: board, players and the turn counter. Cheap to
/// clone, which the planners rely on to fork hypothetical futures.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    players: Vec<Player>,
    turn: u32,
    started: bool,
}

impl Game {
    /// Creates a game with the stock opening hand sizes.
    pub fn new(names: &[&str], decks: Vec<Deck>) -> Game {
        let sizes: Vec<usize> = names
            .iter()
            .zip(NUMBERS_OF_START_CARDS.iter())
            .map(|(_, n)| *n)
            .collect();
        Self::with_hand_sizes(names, decks, &sizes)
    }

    pub fn with_hand_sizes(names: &[&str], decks: Vec<Deck>, hand_sizes: &[usize]) -> Game {
        assert_eq!(names.len(), decks.len());
        assert_eq!(names.len(), hand_sizes.len());
        assert_ge!(names.len(), 1);
        assert_le!(names.len(), 2);

        let players: Vec<Player> = names
            .iter()
            .zip(decks)
            .zip(hand_sizes)
            .map(|((name, deck), hand_size)| Player::new(name, *hand_size, deck))
            .collect();
        let ids: Vec<PlayerId> = players.iter().map(|p| p.get_id()).collect();
        Game {
            board: Board::new(&ids),
            players,
            turn: 0,
            started: false,
        }
    }

    /// A standard two-player game with shuffled starter decks.
    pub fn default_pair(rng: &mut impl Rng) -> Game {
        let decks = vec![starter_deck(rng), starter_deck(rng)];
        Self::new(&DEFAULT_PLAYER_NAMES, decks)
    }

    pub fn get_board(&self) -> &Board {
        &self.board
    }

    pub fn get_players(&self) -> &[Player] {
        &self.players
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.get_id() == id)
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.get_id()).collect()
    }

    pub fn get_turn(&self) -> u32 {
        self.turn
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The player whose turn it is; `None` before the game starts.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_index().map(|i| &self.players[i])
    }

    /// The player who acts after the current one.
    pub fn next_player(&self) -> &Player {
        &self.players[self.turn as usize % self.players.len()]
    }

    fn current_index(&self) -> Option<usize> {
        if !self.started || self.turn == 0 {
            return None;
        }
        Some((self.turn as usize - 1) % self.players.len())
    }

    /// Starts the game and enters turn 1. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        debug!("Game starts");
        self.advance_turn()
    }

    pub fn endturn(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.check_turn(player)?;
        self.advance_turn()
    }

    fn advance_turn(&mut self) -> Result<(), GameError> {
        self.turn += 1;
        let index = (self.turn as usize - 1) % self.players.len();
        trace!("Turn {} begins for {}", self.turn, self.players[index].get_name());
        self.players[index].begin_turn(&mut self.board)
    }

    pub fn play(
        &mut self,
        player: PlayerId,
        card: CardId,
        target: Option<CardId>,
    ) -> Result<(), GameError> {
        self.check_turn(player)?;
        let index = self.current_index().unwrap();
        self.players[index]
            .play(&mut self.board, card, target)
            .map_err(GameError::from)
    }

    /// Plays a card the player might hold: if it is not in the hand it is
    /// first revealed from the deck pile. Used to evaluate hidden-hand
    /// hypotheses on throwaway clones.
    pub fn play_probable(
        &mut self,
        player: PlayerId,
        card: CardId,
        target: Option<CardId>,
    ) -> Result<(), GameError> {
        self.check_turn(player)?;
        let index = self.current_index().unwrap();
        if !self.players[index].card_in_hand(card) {
            self.players[index]
                .reveal_from_deck(card)
                .map_err(GameError::from)?;
        }
        self.play(player, card, target)
    }

    pub fn attack(
        &mut self,
        player: PlayerId,
        attacker: CardId,
        victim: Target,
    ) -> Result<(), GameError> {
        self.check_turn(player)?;
        match victim {
            Target::Unit(unit) => self
                .board
                .attack(player, attacker, unit)
                .map_err(GameError::from),
            Target::Hero(hero) => {
                if hero == player {
                    return Err(ActionError::InvalidTarget.into());
                }
                let board = &mut self.board;
                let victim = self
                    .players
                    .iter_mut()
                    .find(|p| p.get_id() == hero)
                    .ok_or(ActionError::InvalidTarget)?;
                board.attack_hero(player, attacker, victim)
            }
        }
    }

    /// Deep clone; mutations of the copy never touch the original.
    pub fn copy(&self) -> Game {
        self.clone()
    }

    fn check_turn(&self, player: PlayerId) -> Result<(), ActionError> {
        if !self.started {
            return Err(ActionError::GameNotStarted);
        }
        if self.current_player().map(|p| p.get_id()) != Some(player) {
            return Err(ActionError::InvalidPlayerTurn(player));
        }
        Ok(())
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.started {
            writeln!(f, "Game not started")?;
        } else {
            let current = self.current_player().map_or("-", |p| p.get_name());
            writeln!(f, "Turn {}, {} to move", self.turn, current)?;
        }
        for player in &self.players {
            writeln!(f, "{}", player)?;
            let units = self
                .board
                .units_of(player.get_id())
                .iter()
                .map(|c| {
                    let ready = if c.can_attack() { "ready" } else { "exhausted" };
                    format!("{} ({})\n", c, ready)
                })
                .collect::<String>();
            f.write_str(&textwrap::indent(&units, "    "))?;
        }
        Ok(())
    }
}
