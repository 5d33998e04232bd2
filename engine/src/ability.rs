use std::fmt::{
    Display,
    Formatter,
};

use crate::{
    board::Board,
    card::Card,
    error::ActionError,
    ident::{
        CardId,
        PlayerId,
    },
};

/// Effect attached to a card. Dispatch happens in two phases: *init*
/// when the card is constructed and *play* when it resolves from hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    None,
    /// The unit may attack in the turn it enters play.
    Charge,
    /// Play: adds the value to the owner's damage.
    IncreaseDamage(i32),
    /// Play: adds the value to the health of every unit its player controls.
    IncreaseAlliesHealth(i32),
    /// Play: sets a targeted friendly unit's health and damage to the value.
    SetUnitStats(i32),
    /// Init: sets the owner's damage to the value. Play: attacks the
    /// chosen enemy, or every enemy unit when untargeted.
    DealDamage { value: i32, can_target: bool },
}

impl Ability {
    pub fn can_target(&self) -> bool {
        matches!(
            self,
            Ability::SetUnitStats(_)
                | Ability::DealDamage {
                    can_target: true,
                    ..
                }
        )
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            Ability::None | Ability::Charge => None,
            Ability::IncreaseDamage(v)
            | Ability::IncreaseAlliesHealth(v)
            | Ability::SetUnitStats(v) => Some(*v),
            Ability::DealDamage { value, .. } => Some(*value),
        }
    }

    pub(crate) fn apply_init(&self, card: &mut Card) {
        match self {
            Ability::Charge => card.set_can_attack(true),
            Ability::DealDamage { value, .. } => card.set_damage(*value),
            _ => (),
        }
    }

    /// Target legality for the play phase. Runs before any state is
    /// touched so that a rejected play is a no-op.
    pub(crate) fn check_target(
        &self,
        owner: PlayerId,
        target: Option<CardId>,
        board: &Board,
    ) -> Result<(), ActionError> {
        match self {
            Ability::SetUnitStats(_) => {
                let target = target.ok_or(ActionError::TargetNotDefined)?;
                if board.controller(target) != Some(owner) {
                    return Err(ActionError::MissingCard(target));
                }
                Ok(())
            }
            Ability::DealDamage {
                can_target: true, ..
            } => {
                // A friendly unit is never a legal victim. An id matching
                // nothing on the board is accepted; the play phase falls
                // back to hitting every enemy unit.
                if let Some(target) = target {
                    if board.controller(target) == Some(owner) {
                        return Err(ActionError::InvalidTarget);
                    }
                }
                Ok(())
            }
            _ => match target {
                Some(_) => Err(ActionError::InvalidTarget),
                None => Ok(()),
            },
        }
    }
}

impl Display for Ability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ability::None => write!(f, "-"),
            Ability::Charge => write!(f, "charge"),
            Ability::IncreaseDamage(v) => write!(f, "+{} dmg", v),
            Ability::IncreaseAlliesHealth(v) => write!(f, "+{} ally hp", v),
            Ability::SetUnitStats(v) => write!(f, "set {0}/{0}", v),
            Ability::DealDamage { value, can_target } => {
                if *can_target {
                    write!(f, "deal {} (targeted)", value)
                } else {
                    write!(f, "deal {} (all)", value)
                }
            }
        }
    }
}

/// Play phase for a unit that has just been placed on the board.
pub(crate) fn resolve_unit_play(
    board: &mut Board,
    owner: PlayerId,
    unit: CardId,
    target: Option<CardId>,
) -> Result<(), ActionError> {
    let ability = match board.get_unit(unit) {
        Some(card) => *card.get_ability(),
        None => return Err(ActionError::MissingCard(unit)),
    };
    match ability {
        Ability::None | Ability::Charge => Ok(()),
        Ability::IncreaseDamage(v) => {
            if let Some(card) = board.unit_mut(unit) {
                card.add_damage(v);
            }
            Ok(())
        }
        Ability::IncreaseAlliesHealth(v) => {
            heal_allies(board, owner, v);
            Ok(())
        }
        Ability::SetUnitStats(v) => {
            set_unit_stats(board, target, v);
            Ok(())
        }
        Ability::DealDamage { can_target, .. } => match target {
            Some(victim)
                if can_target && board.controller(victim).map_or(false, |c| c != owner) =>
            {
                // A real attack, retaliation included. The unit is made
                // ready first; entering play cleared its attack flag.
                if let Some(card) = board.unit_mut(unit) {
                    card.set_can_attack(true);
                }
                board.attack(owner, unit, victim)
            }
            _ => {
                let damage = board.get_unit(unit).map_or(0, |c| c.get_damage());
                strike_enemies(board, owner, damage);
                Ok(())
            }
        },
    }
}

/// Play phase for a spell, which never enters the board itself.
pub(crate) fn resolve_spell_play(
    board: &mut Board,
    owner: PlayerId,
    spell: &mut Card,
    target: Option<CardId>,
) -> Result<(), ActionError> {
    match *spell.get_ability() {
        Ability::None | Ability::Charge => Ok(()),
        Ability::IncreaseDamage(v) => {
            spell.add_damage(v);
            Ok(())
        }
        Ability::IncreaseAlliesHealth(v) => {
            heal_allies(board, owner, v);
            Ok(())
        }
        Ability::SetUnitStats(v) => {
            set_unit_stats(board, target, v);
            Ok(())
        }
        Ability::DealDamage { can_target, .. } => match target {
            Some(victim)
                if can_target && board.controller(victim).map_or(false, |c| c != owner) =>
            {
                board.strike(spell.get_damage(), victim);
                Ok(())
            }
            _ => {
                strike_enemies(board, owner, spell.get_damage());
                Ok(())
            }
        },
    }
}

fn heal_allies(board: &mut Board, owner: PlayerId, amount: i32) {
    for id in board.unit_ids_of(owner) {
        if let Some(card) = board.unit_mut(id) {
            card.heal(amount);
        }
    }
}

fn set_unit_stats(board: &mut Board, target: Option<CardId>, value: i32) {
    // Target presence was established by check_target().
    let target = match target {
        Some(t) => t,
        None => return,
    };
    let dead = match board.unit_mut(target) {
        Some(card) => card.set_stats(value).is_err(),
        None => false,
    };
    if dead {
        board.discard(target);
    }
}

fn strike_enemies(board: &mut Board, owner: PlayerId, damage: i32) {
    for victim in board.enemy_unit_ids(owner) {
        board.strike(damage, victim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_target() {
        assert!(Ability::SetUnitStats(10).can_target());
        assert!(Ability::DealDamage {
            value: 2,
            can_target: true
        }
        .can_target());
        assert!(!Ability::DealDamage {
            value: 4,
            can_target: false
        }
        .can_target());
        assert!(!Ability::Charge.can_target());
        assert!(!Ability::None.can_target());
    }

    #[test]
    fn test_init_phase_charge() {
        let card = Card::new_unit("swift", 1, 2, 2, Ability::Charge);
        assert!(card.can_attack());
    }

    #[test]
    fn test_init_phase_deal_damage_overrides_attack() {
        let card = Card::new_unit(
            "gunner",
            5,
            4,
            2,
            Ability::DealDamage {
                value: 2,
                can_target: true,
            },
        );
        assert_eq!(2, card.get_damage());
    }

    #[test]
    fn test_plain_unit_enters_play_exhausted() {
        let card = Card::new_unit("grunt", 1, 1, 1, Ability::None);
        assert!(!card.can_attack());
    }

    #[test]
    fn test_check_target_rejects_target_for_plain_ability() {
        let owner = PlayerId::new();
        let board = Board::new(&[owner]);
        let target = CardId::new();
        assert_eq!(
            Err(ActionError::InvalidTarget),
            Ability::None.check_target(owner, Some(target), &board)
        );
        assert_eq!(Ok(()), Ability::None.check_target(owner, None, &board));
    }

    #[test]
    fn test_check_target_requires_target_for_set_stats() {
        let owner = PlayerId::new();
        let board = Board::new(&[owner]);
        assert_eq!(
            Err(ActionError::TargetNotDefined),
            Ability::SetUnitStats(10).check_target(owner, None, &board)
        );
    }

    #[test]
    fn test_check_target_set_stats_needs_friendly_unit() {
        let owner = PlayerId::new();
        let enemy = PlayerId::new();
        let mut board = Board::new(&[owner, enemy]);
        let friendly = Card::new_unit("own", 1, 1, 1, Ability::None);
        let friendly_id = friendly.get_id();
        board.play_card(owner, friendly).unwrap();
        let hostile = Card::new_unit("theirs", 1, 1, 1, Ability::None);
        let hostile_id = hostile.get_id();
        board.play_card(enemy, hostile).unwrap();

        let ability = Ability::SetUnitStats(10);
        assert_eq!(Ok(()), ability.check_target(owner, Some(friendly_id), &board));
        assert_eq!(
            Err(ActionError::MissingCard(hostile_id)),
            ability.check_target(owner, Some(hostile_id), &board)
        );
    }

    #[test]
    fn test_check_target_deal_damage_rejects_friendly() {
        let owner = PlayerId::new();
        let mut board = Board::new(&[owner]);
        let friendly = Card::new_unit("own", 1, 1, 1, Ability::None);
        let friendly_id = friendly.get_id();
        board.play_card(owner, friendly).unwrap();

        let ability = Ability::DealDamage {
            value: 2,
            can_target: true,
        };
        assert_eq!(
            Err(ActionError::InvalidTarget),
            ability.check_target(owner, Some(friendly_id), &board)
        );
        // An unknown id is allowed; resolution falls back to the sweep.
        assert_eq!(
            Ok(()),
            ability.check_target(owner, Some(CardId::new()), &board)
        );
    }
}
