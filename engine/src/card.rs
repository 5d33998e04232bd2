use std::fmt::{
    Display,
    Formatter,
};
use std::hash::{
    Hash,
    Hasher,
};

use log::*;
use rand::{
    seq::SliceRandom,
    Rng,
};

use crate::{
    ability::Ability,
    error::{
        ActionError,
        DeadCard,
        EmptyDeck,
    },
    ident::CardId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Unit,
    Spell,
}

/// A single card instance. The descriptor fields (name, cost, kind,
/// ability) never change after construction; damage, health and the
/// attack flag are runtime state.
#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    name: String,
    cost: u32,
    kind: CardKind,
    ability: Ability,

    damage: i32,
    health: i32,
    can_attack: bool,
    was_played: bool,
}

/// Outcome of unit-vs-unit combat.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Combat {
    pub attacker_died: bool,
    pub victim_died: bool,
}

impl Card {
    pub fn new_unit(name: &str, cost: u32, attack: i32, health: i32, ability: Ability) -> Card {
        let mut card = Card {
            id: CardId::new(),
            name: String::from(name),
            cost,
            kind: CardKind::Unit,
            ability,
            damage: attack,
            health,
            can_attack: false,
            was_played: false,
        };
        ability.apply_init(&mut card);
        card
    }

    pub fn new_spell(name: &str, cost: u32, ability: Ability) -> Card {
        let mut card = Card {
            id: CardId::new(),
            name: String::from(name),
            cost,
            kind: CardKind::Spell,
            ability,
            damage: 0,
            health: 0,
            can_attack: false,
            was_played: false,
        };
        ability.apply_init(&mut card);
        card
    }

    pub fn get_id(&self) -> CardId {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_cost(&self) -> u32 {
        self.cost
    }

    pub fn get_kind(&self) -> CardKind {
        self.kind
    }

    pub fn is_unit(&self) -> bool {
        self.kind == CardKind::Unit
    }

    pub fn get_ability(&self) -> &Ability {
        &self.ability
    }

    pub fn get_damage(&self) -> i32 {
        self.damage
    }

    pub fn get_health(&self) -> i32 {
        self.health
    }

    pub fn can_attack(&self) -> bool {
        self.can_attack
    }

    pub fn was_played(&self) -> bool {
        self.was_played
    }

    pub(crate) fn mark_played(&mut self) {
        self.was_played = true;
    }

    pub(crate) fn set_can_attack(&mut self, value: bool) {
        self.can_attack = value;
    }

    pub(crate) fn set_damage(&mut self, value: i32) {
        self.damage = value;
    }

    pub(crate) fn add_damage(&mut self, amount: i32) {
        self.damage += amount;
    }

    pub(crate) fn heal(&mut self, amount: i32) {
        self.health += amount;
    }

    /// Overwrites both stats. Health never goes below 0; reaching 0
    /// reports the death to the caller.
    pub(crate) fn set_stats(&mut self, value: i32) -> Result<(), DeadCard> {
        self.damage = value;
        self.health = value.max(0);
        if value <= 0 {
            return Err(DeadCard);
        }
        Ok(())
    }

    pub(crate) fn take_damage(&mut self, amount: i32) -> Result<(), DeadCard> {
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            trace!("{} died", self);
            return Err(DeadCard);
        }
        Ok(())
    }

    /// Checks and consumes the attack flag, returning the damage to deal.
    pub(crate) fn ready_attack(&mut self) -> Result<i32, ActionError> {
        if !self.can_attack {
            return Err(ActionError::CardCannotAttack(self.id));
        }
        self.can_attack = false;
        Ok(self.damage)
    }

    /// Unit-vs-unit combat: the victim takes the attacker's damage and
    /// hits back with its own.
    pub(crate) fn fight(&mut self, victim: &mut Card) -> Result<Combat, ActionError> {
        let damage = self.ready_attack()?;
        let victim_died = victim.take_damage(damage).is_err();
        let attacker_died = self.take_damage(victim.damage).is_err();
        Ok(Combat {
            attacker_died,
            victim_died,
        })
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind
    }
}

impl Eq for Card {}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.kind.hash(state);
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CardKind::Unit => write!(
                f,
                "[{}] {} ({}) {}/{} [{}]",
                self.id, self.name, self.cost, self.damage, self.health, self.ability
            ),
            CardKind::Spell => write!(
                f,
                "[{}] {} ({}) spell [{}]",
                self.id, self.name, self.cost, self.ability
            ),
        }
    }
}

/// Ordered draw pile. `empty_draws` counts every draw that found no card
/// and only ever grows.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
    empty_draws: u32,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Deck {
        Deck {
            cards,
            empty_draws: 0,
        }
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn empty_draws(&self) -> u32 {
        self.empty_draws
    }

    /// Removes and returns the first `number` cards. A short deal hands
    /// back what existed along with the cumulative deficit.
    pub(crate) fn deal(&mut self, number: usize) -> Result<Vec<Card>, EmptyDeck> {
        let available = number.min(self.cards.len());
        let dealt: Vec<Card> = self.cards.drain(..available).collect();
        let shortfall = (number - available) as u32;
        if shortfall > 0 {
            self.empty_draws += shortfall;
            debug!(
                "Deck is short by {} (cumulative {})",
                shortfall, self.empty_draws
            );
            return Err(EmptyDeck {
                dealt,
                shortfall: self.empty_draws,
            });
        }
        Ok(dealt)
    }

    pub(crate) fn remove(&mut self, id: CardId) -> Option<Card> {
        let index = self.cards.iter().position(|c| c.get_id() == id)?;
        Some(self.cards.remove(index))
    }
}

impl Display for Deck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Deck with {} cards ({} empty draws)",
            self.cards.len(),
            self.empty_draws
        )
    }
}

/// The stock 20-card deck: two copies of each archetype, shuffled.
pub fn starter_deck(rng: &mut impl Rng) -> Deck {
    const COPIES: usize = 2;
    let mut cards = Vec::new();
    for _ in 0..COPIES {
        cards.push(Card::new_unit("Tunnel Rat", 1, 1, 3, Ability::None));
        cards.push(Card::new_unit("River Lurker", 2, 2, 3, Ability::None));
        cards.push(Card::new_unit("Cinder Brute", 3, 5, 1, Ability::None));
        cards.push(Card::new_unit("Highland Ox", 4, 4, 5, Ability::None));
        cards.push(Card::new_unit(
            "Ridge Commando",
            5,
            4,
            2,
            Ability::DealDamage {
                value: 2,
                can_target: true,
            },
        ));
        cards.push(Card::new_unit("Granite Ogre", 6, 6, 7, Ability::None));
        cards.push(Card::new_spell(
            "Firestorm",
            7,
            Ability::DealDamage {
                value: 4,
                can_target: false,
            },
        ));
        cards.push(Card::new_spell("Titan Growth", 8, Ability::SetUnitStats(10)));
        cards.push(Card::new_unit("Thunder Drake", 9, 8, 8, Ability::Charge));
        cards.push(Card::new_spell(
            "Vital Bloom",
            10,
            Ability::IncreaseAlliesHealth(6),
        ));
    }
    let mut deck = Deck::new(cards);
    deck.shuffle(rng);
    deck
}

#[cfg(test)]
mod tests {
    use rand_mt::Mt64;

    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn plain_unit(name: &str) -> Card {
        Card::new_unit(name, 1, 1, 2, Ability::None)
    }

    #[test]
    fn test_card_equality_is_by_id() {
        let a = plain_unit("same name");
        let b = plain_unit("same name");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_deal_removes_from_front() {
        init();
        let cards = vec![plain_unit("a"), plain_unit("b"), plain_unit("c")];
        let first = cards[0].get_id();
        let mut deck = Deck::new(cards);
        let dealt = deck.deal(1).unwrap();
        assert_eq!(first, dealt[0].get_id());
        assert_eq!(2, deck.len());
    }

    #[test]
    fn test_short_deal_reports_cumulative_deficit() {
        init();
        let mut deck = Deck::new(vec![plain_unit("only")]);

        let short = deck.deal(3).unwrap_err();
        assert_eq!(1, short.dealt.len());
        assert_eq!(2, short.shortfall);
        assert_eq!(2, deck.empty_draws());

        let short = deck.deal(1).unwrap_err();
        assert!(short.dealt.is_empty());
        assert_eq!(3, short.shortfall);
        assert_eq!(3, deck.empty_draws());
    }

    #[test]
    fn test_deck_equality() {
        let cards = vec![plain_unit("a"), plain_unit("b")];
        let mut deck = Deck::new(cards.clone());
        let other = Deck::new(cards);
        assert_eq!(deck, other);

        let _ = deck.deal(1);
        assert_ne!(deck, other);
    }

    #[test]
    fn test_fight_trades_damage() {
        let mut attacker = Card::new_unit("a", 1, 1, 2, Ability::None);
        let mut victim = Card::new_unit("v", 1, 1, 2, Ability::None);
        attacker.set_can_attack(true);

        let combat = attacker.fight(&mut victim).unwrap();
        assert!(!combat.attacker_died);
        assert!(!combat.victim_died);
        assert_eq!(1, attacker.get_health());
        assert_eq!(1, victim.get_health());
        assert!(!attacker.can_attack());
    }

    #[test]
    fn test_fight_requires_attack_flag() {
        let mut attacker = plain_unit("a");
        let mut victim = plain_unit("v");
        let result = attacker.fight(&mut victim);
        assert_eq!(
            Err(ActionError::CardCannotAttack(attacker.get_id())),
            result.map(|_| ())
        );
    }

    #[test]
    fn test_fight_kills_both_sides() {
        let mut attacker = Card::new_unit("a", 1, 5, 1, Ability::None);
        let mut victim = Card::new_unit("v", 1, 5, 1, Ability::None);
        attacker.set_can_attack(true);

        let combat = attacker.fight(&mut victim).unwrap();
        assert!(combat.attacker_died);
        assert!(combat.victim_died);
        assert_eq!(0, attacker.get_health());
        assert_eq!(0, victim.get_health());
    }

    #[test]
    fn test_starter_deck_composition() {
        let mut rng = Mt64::new(42);
        let deck = starter_deck(&mut rng);
        assert_eq!(20, deck.len());
        let units = deck.cards().iter().filter(|c| c.is_unit()).count();
        assert_eq!(14, units);
        // Costs cover the whole mana curve.
        for cost in 1..=10 {
            assert_eq!(
                2,
                deck.cards().iter().filter(|c| c.get_cost() == cost).count(),
                "expected two copies at cost {}",
                cost
            );
        }
    }
}
