use std::fmt::{
    Display,
    Formatter,
};

use uuid::Uuid;

/// Identifier of a card. Minted once at construction and never reused;
/// collisions are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> CardId {
        CardId(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The full value is unwieldy in logs. The first 8 hex chars are
        // plenty to tell cards apart in a single game.
        let hex = self.0.simple().to_string();
        write!(f, "{}", &hex[..8])
    }
}

/// Identifier of a player, same scheme as [`CardId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> PlayerId {
        PlayerId(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hex = self.0.simple().to_string();
        write!(f, "{}", &hex[..8])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<CardId> = (0..1000).map(|_| CardId::new()).collect();
        assert_eq!(1000, ids.len());
    }

    #[test]
    fn test_short_form() {
        let id = CardId::new();
        let s = format!("{}", id);
        assert_eq!(8, s.len());
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
