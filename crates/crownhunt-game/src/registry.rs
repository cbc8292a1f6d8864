//! Player registry and role bookkeeping.
//!
//! Membership and the three role slots are kept together so a removal
//! always clears a player from every place it appears at once.

use std::collections::HashMap;

use crownhunt_protocol::{Character, PlayerId};

use crate::PlayerHandle;

/// Connected players keyed by id, plus who holds which role.
///
/// Invariant: an id is in at most one of `monster`, `king`, `servants`, and
/// only if it is also in `players`.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    players: HashMap<PlayerId, PlayerHandle>,
    monster: Option<PlayerId>,
    king: Option<PlayerId>,
    /// Join order among servants.
    servants: Vec<PlayerId>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a player. Returns the handle back if the id is already taken.
    pub(crate) fn admit(&mut self, player: PlayerHandle) -> Result<(), PlayerHandle> {
        if self.players.contains_key(&player.id()) {
            return Err(player);
        }
        self.players.insert(player.id(), player);
        Ok(())
    }

    pub(crate) fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub(crate) fn get(&self, id: PlayerId) -> Option<&PlayerHandle> {
        self.players.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerHandle> {
        self.players.get_mut(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.players.len()
    }

    pub(crate) fn players(&self) -> impl Iterator<Item = &PlayerHandle> {
        self.players.values()
    }

    pub(crate) fn players_mut(&mut self) -> impl Iterator<Item = &mut PlayerHandle> {
        self.players.values_mut()
    }

    pub(crate) fn monster(&self) -> Option<&PlayerHandle> {
        self.monster.and_then(|id| self.players.get(&id))
    }

    pub(crate) fn monster_id(&self) -> Option<PlayerId> {
        self.monster
    }

    pub(crate) fn king_id(&self) -> Option<PlayerId> {
        self.king
    }

    pub(crate) fn servants(&self) -> &[PlayerId] {
        &self.servants
    }

    /// Gives an unassigned player the first vacant role, in the order
    /// Monster, King, Servant. Returns the role it got, or `None` if the
    /// player is unknown or already has one.
    pub(crate) fn assign_role(&mut self, id: PlayerId) -> Option<Character> {
        let player = self.players.get_mut(&id)?;
        if player.character() != Character::Unassigned {
            return None;
        }

        let character = if self.monster.is_none() {
            self.monster = Some(id);
            Character::Monster
        } else if self.king.is_none() {
            self.king = Some(id);
            Character::King
        } else {
            self.servants.push(id);
            Character::Servant
        };
        player.set_character(character);
        Some(character)
    }

    /// Removes a player from membership and from whichever role slot it
    /// holds. Servant removal keeps the remaining servants in order.
    pub(crate) fn remove(&mut self, id: PlayerId) -> Option<PlayerHandle> {
        let player = self.players.remove(&id)?;

        match player.character() {
            Character::Monster => {
                if self.monster == Some(id) {
                    self.monster = None;
                }
            }
            Character::King => {
                if self.king == Some(id) {
                    self.king = None;
                }
            }
            Character::Servant | Character::Unassigned => {
                if let Some(index) = self.servants.iter().position(|s| *s == id) {
                    self.servants.remove(index);
                }
            }
        }

        Some(player)
    }

    /// Removes every player, emptying all role slots.
    pub(crate) fn drain(&mut self) -> Vec<PlayerHandle> {
        self.monster = None;
        self.king = None;
        self.servants.clear();
        self.players.drain().map(|(_, player)| player).collect()
    }
}
