use std::fmt::{
    Display,
    Formatter,
};
use std::hash::{
    Hash,
    Hasher,
};
use std::mem::discriminant;

use crate::{
    error::GameError,
    game::Game,
    ident::{
        CardId,
        PlayerId,
    },
};

/// Something an attack can hit: a unit in play or a hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Unit(CardId),
    Hero(PlayerId),
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Unit(id) => write!(f, "unit {}", id),
            Target::Hero(id) => write!(f, "hero {}", id),
        }
    }
}

/// A move, described by the ids needed to re-apply it against any clone
/// of the game. `ProbablePlay` is a hidden-hand hypothesis: the card the
/// opponent *might* hold, weighted by the chance that they do.
#[derive(Debug, Clone)]
pub enum Action {
    Initial,
    EndTurn(PlayerId),
    Attack {
        player: PlayerId,
        attacker: CardId,
        victim: Target,
    },
    Play {
        player: PlayerId,
        card: CardId,
        target: Option<CardId>,
    },
    ProbablePlay {
        chance: f64,
        player: PlayerId,
        card: CardId,
        target: Option<CardId>,
    },
}

impl Action {
    pub fn apply(&self, game: &mut Game) -> Result<(), GameError> {
        match self {
            Action::Initial => game.start(),
            Action::EndTurn(player) => game.endturn(*player),
            Action::Attack {
                player,
                attacker,
                victim,
            } => game.attack(*player, *attacker, *victim),
            Action::Play {
                player,
                card,
                target,
            } => game.play(*player, *card, *target),
            Action::ProbablePlay {
                player,
                card,
                target,
                ..
            } => game.play_probable(*player, *card, *target),
        }
    }

    /// The player the action belongs to; `Initial` belongs to nobody.
    pub fn get_player(&self) -> Option<PlayerId> {
        match self {
            Action::Initial => None,
            Action::EndTurn(player) => Some(*player),
            Action::Attack { player, .. } => Some(*player),
            Action::Play { player, .. } => Some(*player),
            Action::ProbablePlay { player, .. } => Some(*player),
        }
    }

    /// The probability weight; 1 for everything certain.
    pub fn get_chance(&self) -> f64 {
        match self {
            Action::ProbablePlay { chance, .. } => *chance,
            _ => 1.0,
        }
    }

    pub fn is_attack(&self) -> bool {
        matches!(self, Action::Attack { .. })
    }

    pub fn attacks_hero(&self) -> bool {
        matches!(
            self,
            Action::Attack {
                victim: Target::Hero(_),
                ..
            }
        )
    }
}

// Equality and hashing are structural over variant and ids only; the
// chance weight is bookkeeping and does not distinguish actions.
impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Action::Initial, Action::Initial) => true,
            (Action::EndTurn(a), Action::EndTurn(b)) => a == b,
            (
                Action::Attack {
                    player: p1,
                    attacker: a1,
                    victim: v1,
                },
                Action::Attack {
                    player: p2,
                    attacker: a2,
                    victim: v2,
                },
            ) => p1 == p2 && a1 == a2 && v1 == v2,
            (
                Action::Play {
                    player: p1,
                    card: c1,
                    target: t1,
                },
                Action::Play {
                    player: p2,
                    card: c2,
                    target: t2,
                },
            ) => p1 == p2 && c1 == c2 && t1 == t2,
            (
                Action::ProbablePlay {
                    player: p1,
                    card: c1,
                    target: t1,
                    ..
                },
                Action::ProbablePlay {
                    player: p2,
                    card: c2,
                    target: t2,
                    ..
                },
            ) => p1 == p2 && c1 == c2 && t1 == t2,
            _ => false,
        }
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        discriminant(self).hash(state);
        match self {
            Action::Initial => (),
            Action::EndTurn(player) => player.hash(state),
            Action::Attack {
                player,
                attacker,
                victim,
            } => {
                player.hash(state);
                attacker.hash(state);
                victim.hash(state);
            }
            Action::Play {
                player,
                card,
                target,
            }
            | Action::ProbablePlay {
                player,
                card,
                target,
                ..
            } => {
                player.hash(state);
                card.hash(state);
                target.hash(state);
            }
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Initial => write!(f, "game start"),
            Action::EndTurn(player) => write!(f, "{} ended turn", player),
            Action::Attack {
                player,
                attacker,
                victim,
            } => write!(f, "{} attacked {} with {}", player, victim, attacker),
            Action::Play {
                player,
                card,
                target,
            } => match target {
                Some(target) => write!(f, "{} played {} on {}", player, card, target),
                None => write!(f, "{} played {}", player, card),
            },
            Action::ProbablePlay {
                chance,
                player,
                card,
                target,
            } => match target {
                Some(target) => write!(
                    f,
                    "{} played {} on {} (chance {:.2})",
                    player, card, target, chance
                ),
                None => write!(f, "{} played {} (chance {:.2})", player, card, chance),
            },
        }
    }
}
