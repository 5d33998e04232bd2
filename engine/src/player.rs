use std::fmt::{
    Display,
    Formatter,
};
use std::hash::{
    Hash,
    Hasher,
};

use log::*;

use crate::{
    ability,
    board::{
        Board,
        MAX_CARDS_PER_PLAYER,
    },
    card::{
        Card,
        Deck,
    },
    error::{
        ActionError,
        EmptyDeck,
        GameError,
    },
    ident::{
        CardId,
        PlayerId,
    },
};

pub const HEALTH_LEVEL: i32 = 20;
pub const MAX_MANA_LEVEL: u32 = 10;

/// One side of the duel: hero health, the mana pool and the private card
/// zones (hand, graveyard, deck). Units in play belong to the board; the
/// player refers to them by id only.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    health: i32,
    current_mana: u32,
    used_mana: u32,
    hand: Vec<Card>,
    graveyard: Vec<Card>,
    deck: Deck,
}

impl Player {
    pub(crate) fn new(name: &str, hand_size: usize, mut deck: Deck) -> Player {
        // A deck too small for the opening hand deals what it has;
        // fatigue only starts once the game is running.
        let hand = match deck.deal(hand_size) {
            Ok(cards) => cards,
            Err(EmptyDeck { dealt, .. }) => dealt,
        };
        Player {
            id: PlayerId::new(),
            name: String::from(name),
            health: HEALTH_LEVEL,
            current_mana: 0,
            used_mana: 0,
            hand,
            graveyard: Vec::new(),
            deck,
        }
    }

    pub fn get_id(&self) -> PlayerId {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_health(&self) -> i32 {
        self.health
    }

    /// Mana still available this turn.
    pub fn get_mana(&self) -> u32 {
        self.current_mana - self.used_mana
    }

    pub fn get_current_mana(&self) -> u32 {
        self.current_mana
    }

    pub fn get_used_mana(&self) -> u32 {
        self.used_mana
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn graveyard(&self) -> &[Card] {
        &self.graveyard
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn card_in_hand(&self, id: CardId) -> bool {
        self.hand.iter().any(|c| c.get_id() == id)
    }

    /// Plays a card from hand. All rule checks run before anything is
    /// touched, so a rejected play leaves every zone as it was.
    pub(crate) fn play(
        &mut self,
        board: &mut Board,
        card_id: CardId,
        target: Option<CardId>,
    ) -> Result<(), ActionError> {
        let index = self
            .hand
            .iter()
            .position(|c| c.get_id() == card_id)
            .ok_or(ActionError::MissingCard(card_id))?;
        let cost = self.hand[index].get_cost();
        let available = self.get_mana();
        if cost > available {
            return Err(ActionError::NotEnoughMana {
                card: card_id,
                cost,
                available,
            });
        }
        let ability = *self.hand[index].get_ability();
        ability.check_target(self.id, target, board)?;
        if self.hand[index].is_unit() && board.unit_count(self.id) >= MAX_CARDS_PER_PLAYER {
            return Err(ActionError::TooManyCards {
                max: MAX_CARDS_PER_PLAYER,
            });
        }

        let mut card = self.hand.remove(index);
        card.mark_played();
        debug!("{} plays {}", self.name, card);
        if card.is_unit() {
            board.play_card(self.id, card)?;
            ability::resolve_unit_play(board, self.id, card_id, target)?;
        } else {
            ability::resolve_spell_play(board, self.id, &mut card, target)?;
            self.graveyard.push(card);
        }
        self.used_mana += cost;
        Ok(())
    }

    /// Draws from the deck. A short deal keeps whatever existed and
    /// converts the cumulative deficit into fatigue damage.
    pub(crate) fn take_cards(&mut self, number: usize) -> Result<(), GameError> {
        match self.deck.deal(number) {
            Ok(cards) => {
                self.hand.extend(cards);
                Ok(())
            }
            Err(EmptyDeck { dealt, shortfall }) => {
                self.hand.extend(dealt);
                info!("{} takes {} fatigue damage", self.name, shortfall);
                self.take_damage(shortfall as i32)
            }
        }
    }

    pub(crate) fn take_damage(&mut self, amount: i32) -> Result<(), GameError> {
        if self.health - amount <= 0 {
            self.health = 0;
            info!("{} is dead", self.name);
            return Err(GameError::DeadPlayer(self.id));
        }
        self.health -= amount;
        Ok(())
    }

    /// Turn upkeep: ready own units, grow and refill mana, draw one.
    pub(crate) fn begin_turn(&mut self, board: &mut Board) -> Result<(), GameError> {
        board.reset_cards(self.id);
        self.current_mana = (self.current_mana + 1).min(MAX_MANA_LEVEL);
        self.used_mana = 0;
        self.take_cards(1)
    }

    /// Moves the named card from the deck pile into the hand, making a
    /// hypothetical opponent draw concrete.
    pub(crate) fn reveal_from_deck(&mut self, id: CardId) -> Result<(), ActionError> {
        let card = self.deck.remove(id).ok_or(ActionError::MissingCard(id))?;
        self.hand.push(card);
        Ok(())
    }
}

#[cfg(test)]
impl Player {
    pub(crate) fn set_health(&mut self, health: i32) {
        self.health = health;
    }

    pub(crate) fn set_mana(&mut self, mana: u32) {
        self.current_mana = mana;
        self.used_mana = 0;
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {} HP, mana {}/{}, hand {}, deck {}, graveyard {}",
            self.name,
            self.id,
            self.health,
            self.get_mana(),
            self.current_mana,
            self.hand.len(),
            self.deck.len(),
            self.graveyard.len(),
        )
    }
}
