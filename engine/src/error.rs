use thiserror::Error;

use crate::{
    card::Card,
    ident::{
        CardId,
        PlayerId,
    },
};

/// Recoverable rule violations. An operation rejected with one of these
/// leaves the game unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("card {0} is not available to this player")]
    MissingCard(CardId),

    #[error("card {card} costs {cost} mana but only {available} is available")]
    NotEnoughMana {
        card: CardId,
        cost: u32,
        available: u32,
    },

    #[error("a player can control at most {max} units")]
    TooManyCards { max: usize },

    #[error("card {0} cannot attack in the current turn")]
    CardCannotAttack(CardId),

    #[error("the played card requires a target")]
    TargetNotDefined,

    #[error("the chosen target is not allowed for this card")]
    InvalidTarget,

    #[error("it is not player {0}'s turn")]
    InvalidPlayerTurn(PlayerId),

    #[error("the game has not been started")]
    GameNotStarted,
}

/// Everything an engine operation can reject with. `DeadPlayer` is
/// terminal: the named player lost and the game is over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Invalid(#[from] ActionError),

    #[error("player {0} is dead")]
    DeadPlayer(PlayerId),
}

impl GameError {
    pub fn is_invalid_action(&self) -> bool {
        matches!(self, GameError::Invalid(_))
    }
}

/// A unit's health reached 0. Never leaves the crate; the board consumes
/// it and removes the unit from play.
#[derive(Debug)]
pub(crate) struct DeadCard;

/// The deck ran out while dealing. Carries the cards that did exist and
/// the cumulative deficit so far; the player converts the deficit into
/// fatigue damage.
#[derive(Debug)]
pub(crate) struct EmptyDeck {
    pub dealt: Vec<Card>,
    pub shortfall: u32,
}
