use std::collections::HashMap;

use log::*;
use more_asserts::*;

use crate::{
    card::Card,
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

pub const MAX_CARDS_PER_PLAYER: usize = 7;

/// Sole owner of the units in play. Units are keyed by id; the
/// per-player lists keep play order and never exceed
/// [`MAX_CARDS_PER_PLAYER`]. Every id in a control list appears exactly
/// once in the unit map.
#[derive(Debug, Clone)]
pub struct Board {
    units: HashMap<CardId, Card>,
    control: HashMap<PlayerId, Vec<CardId>>,
}

impl Board {
    pub(crate) fn new(players: &[PlayerId]) -> Board {
        let control = players.iter().map(|id| (*id, Vec::new())).collect();
        Board {
            units: HashMap::new(),
            control,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit_count(&self, player: PlayerId) -> usize {
        self.control.get(&player).map_or(0, |ids| ids.len())
    }

    pub fn get_unit(&self, id: CardId) -> Option<&Card> {
        self.units.get(&id)
    }

    pub fn controller(&self, id: CardId) -> Option<PlayerId> {
        self.control
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(player, _)| *player)
    }

    /// Units the player controls, in play order.
    pub fn units_of(&self, player: PlayerId) -> Vec<&Card> {
        self.unit_ids_of(player)
            .iter()
            .map(|id| &self.units[id])
            .collect()
    }

    /// Units controlled by anyone else.
    pub fn enemy_cards(&self, player: PlayerId) -> Vec<&Card> {
        self.enemy_unit_ids(player)
            .iter()
            .map(|id| &self.units[id])
            .collect()
    }

    pub(crate) fn unit_ids_of(&self, player: PlayerId) -> Vec<CardId> {
        self.control.get(&player).cloned().unwrap_or_default()
    }

    pub(crate) fn enemy_unit_ids(&self, player: PlayerId) -> Vec<CardId> {
        self.control
            .iter()
            .filter(|(owner, _)| **owner != player)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    pub(crate) fn unit_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.units.get_mut(&id)
    }

    pub(crate) fn play_card(&mut self, player: PlayerId, card: Card) -> Result<(), ActionError> {
        let slots = self.control.entry(player).or_insert_with(Vec::new);
        if slots.len() >= MAX_CARDS_PER_PLAYER {
            return Err(ActionError::TooManyCards {
                max: MAX_CARDS_PER_PLAYER,
            });
        }
        debug!("{} enters play for {}", card, player);
        slots.push(card.get_id());
        self.units.insert(card.get_id(), card);
        debug_assert_le!(self.unit_count(player), MAX_CARDS_PER_PLAYER);
        Ok(())
    }

    /// Unit-vs-unit combat. The victim must be an enemy unit in play;
    /// either side dropping to 0 leaves the board immediately.
    pub(crate) fn attack(
        &mut self,
        player: PlayerId,
        attacker: CardId,
        victim: CardId,
    ) -> Result<(), ActionError> {
        if self.controller(attacker) != Some(player) {
            return Err(ActionError::MissingCard(attacker));
        }
        match self.controller(victim) {
            None => return Err(ActionError::MissingCard(victim)),
            Some(owner) if owner == player => return Err(ActionError::MissingCard(victim)),
            Some(_) => (),
        }

        // The attacker leaves the map for the duration of the exchange
        // so both combatants can be borrowed at once.
        let mut attacking = self.units.remove(&attacker).unwrap();
        let combat = match attacking.fight(self.units.get_mut(&victim).unwrap()) {
            Ok(combat) => combat,
            Err(e) => {
                self.units.insert(attacker, attacking);
                return Err(e);
            }
        };
        if combat.victim_died {
            self.discard(victim);
        }
        if combat.attacker_died {
            self.discard(attacker);
        } else {
            self.units.insert(attacker, attacking);
        }
        Ok(())
    }

    /// Unit attacks the enemy hero directly. Heroes do not hit back.
    pub(crate) fn attack_hero(
        &mut self,
        player: PlayerId,
        attacker: CardId,
        victim: &mut Player,
    ) -> Result<(), GameError> {
        if self.controller(attacker) != Some(player) {
            return Err(ActionError::MissingCard(attacker).into());
        }
        let damage = self
            .units
            .get_mut(&attacker)
            .unwrap()
            .ready_attack()
            .map_err(GameError::from)?;
        debug!("{} hits {} for {}", attacker, victim.get_name(), damage);
        victim.take_damage(damage)
    }

    /// Spell damage: no attack flag involved and no retaliation. A dead
    /// unit leaves the board; an unknown victim is ignored.
    pub(crate) fn strike(&mut self, damage: i32, victim: CardId) {
        let died = match self.units.get_mut(&victim) {
            Some(card) => card.take_damage(damage).is_err(),
            None => false,
        };
        if died {
            self.discard(victim);
        }
    }

    pub(crate) fn reset_cards(&mut self, player: PlayerId) {
        for id in self.unit_ids_of(player) {
            if let Some(card) = self.units.get_mut(&id) {
                card.set_can_attack(true);
            }
        }
    }

    pub(crate) fn discard(&mut self, id: CardId) {
        self.units.remove(&id);
        for ids in self.control.values_mut() {
            ids.retain(|c| *c != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ability::Ability;

    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ready_unit(attack: i32, health: i32) -> Card {
        let mut card = Card::new_unit("test unit", 1, attack, health, Ability::None);
        card.set_can_attack(true);
        card
    }

    #[test]
    fn test_board_capacity() {
        init();
        let player = PlayerId::new();
        let mut board = Board::new(&[player]);
        for _ in 0..MAX_CARDS_PER_PLAYER {
            board.play_card(player, ready_unit(1, 1)).unwrap();
        }
        assert_eq!(MAX_CARDS_PER_PLAYER, board.unit_count(player));

        let result = board.play_card(player, ready_unit(1, 1));
        assert_eq!(
            Err(ActionError::TooManyCards {
                max: MAX_CARDS_PER_PLAYER
            }),
            result
        );
        assert_eq!(MAX_CARDS_PER_PLAYER, board.unit_count(player));
    }

    #[test]
    fn test_attack_removes_dead_units() {
        init();
        let player = PlayerId::new();
        let enemy = PlayerId::new();
        let mut board = Board::new(&[player, enemy]);

        let attacker = ready_unit(10, 2);
        let attacker_id = attacker.get_id();
        board.play_card(player, attacker).unwrap();
        let victim = ready_unit(10, 2);
        let victim_id = victim.get_id();
        board.play_card(enemy, victim).unwrap();

        assert_eq!(2, board.len());
        board.attack(player, attacker_id, victim_id).unwrap();
        assert_eq!(0, board.len());
        assert_eq!(None, board.controller(attacker_id));
        assert_eq!(None, board.controller(victim_id));
    }

    #[test]
    fn test_attack_own_unit_is_rejected() {
        let player = PlayerId::new();
        let mut board = Board::new(&[player]);
        let a = ready_unit(1, 2);
        let b = ready_unit(1, 2);
        let (a_id, b_id) = (a.get_id(), b.get_id());
        board.play_card(player, a).unwrap();
        board.play_card(player, b).unwrap();

        assert_eq!(
            Err(ActionError::MissingCard(b_id)),
            board.attack(player, a_id, b_id)
        );
        assert_eq!(2, board.len());
    }

    #[test]
    fn test_attack_unknown_victim_is_rejected() {
        let player = PlayerId::new();
        let mut board = Board::new(&[player]);
        let a = ready_unit(1, 2);
        let a_id = a.get_id();
        board.play_card(player, a).unwrap();

        let ghost = CardId::new();
        assert_eq!(
            Err(ActionError::MissingCard(ghost)),
            board.attack(player, a_id, ghost)
        );
    }

    #[test]
    fn test_exhausted_attacker_is_rejected_without_damage() {
        let player = PlayerId::new();
        let enemy = PlayerId::new();
        let mut board = Board::new(&[player, enemy]);

        let attacker = Card::new_unit("sleepy", 1, 3, 3, Ability::None);
        let attacker_id = attacker.get_id();
        board.play_card(player, attacker).unwrap();
        let victim = ready_unit(3, 3);
        let victim_id = victim.get_id();
        board.play_card(enemy, victim).unwrap();

        assert_eq!(
            Err(ActionError::CardCannotAttack(attacker_id)),
            board.attack(player, attacker_id, victim_id)
        );
        assert_eq!(3, board.get_unit(victim_id).unwrap().get_health());
        assert_eq!(2, board.len());
    }

    #[test]
    fn test_reset_cards_marks_all_ready() {
        let player = PlayerId::new();
        let mut board = Board::new(&[player]);
        let card = Card::new_unit("fresh", 1, 1, 1, Ability::None);
        let id = card.get_id();
        board.play_card(player, card).unwrap();
        assert!(!board.get_unit(id).unwrap().can_attack());

        board.reset_cards(player);
        assert!(board.get_unit(id).unwrap().can_attack());
    }

    #[test]
    fn test_enemy_cards() {
        let player = PlayerId::new();
        let enemy = PlayerId::new();
        let mut board = Board::new(&[player, enemy]);
        board.play_card(player, ready_unit(1, 1)).unwrap();
        board.play_card(enemy, ready_unit(1, 1)).unwrap();
        board.play_card(enemy, ready_unit(1, 1)).unwrap();

        assert_eq!(2, board.enemy_cards(player).len());
        assert_eq!(1, board.enemy_cards(enemy).len());
    }

    #[test]
    fn test_strike_ignores_unknown_victim() {
        let player = PlayerId::new();
        let mut board = Board::new(&[player]);
        board.strike(4, CardId::new());
        assert!(board.is_empty());
    }
}
