//! Player handles: the coordinator's record of one connected player.
//!
//! The connection layer creates a [`PlayerHandle`] and hands it to the
//! coordinator through [`GameHandle::register`](crate::GameHandle::register).
//! From then on the coordinator owns it outright; identity is readable by
//! anyone holding a reference, but role, position, and liveness can only be
//! changed from inside this crate.

use std::sync::Arc;

use crownhunt_mapgen::Map;
use crownhunt_protocol::{
    Character, Life, Outbound, PlayerId, PlayerView, Position, ServerMessage,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Longest display name kept, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// Receiving end of a player's outbound sink. Drained by the connection's
/// write pump; yields `None` once the coordinator drops the player.
pub type PlayerOutbox = mpsc::Receiver<Outbound>;

/// Why a delivery didn't happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeliveryFailure {
    /// The sink is at capacity: the consumer isn't draining it.
    Full,
    /// The consumer is gone.
    Closed,
}

/// A connected player as seen by the coordinator.
#[derive(Debug)]
pub struct PlayerHandle {
    id: PlayerId,
    name: String,
    character: Character,
    position: Position,
    life: Life,
    sink: mpsc::Sender<Outbound>,
}

impl PlayerHandle {
    /// Wraps an existing outbound sender.
    pub fn new(id: PlayerId, sink: mpsc::Sender<Outbound>) -> Self {
        Self {
            id,
            name: default_name(id),
            character: Character::Unassigned,
            position: Position::default(),
            life: Life::Alive,
            sink,
        }
    }

    /// Creates a handle together with the outbox its connection drains.
    ///
    /// A `capacity` of 0 is treated as 1.
    pub fn channel(id: PlayerId, capacity: usize) -> (Self, PlayerOutbox) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(id, tx), rx)
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn character(&self) -> Character {
        self.character
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_dead(&self) -> bool {
        self.life.is_dead()
    }

    /// The public picture of this player.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            character: self.character,
            position: self.position,
            dead: self.life.is_dead(),
        }
    }

    /// Queues an outbound item without waiting.
    pub(crate) fn send(&self, item: Outbound) -> Result<(), DeliveryFailure> {
        self.sink.try_send(item).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryFailure::Full,
            TrySendError::Closed(_) => DeliveryFailure::Closed,
        })
    }

    /// Queues the arena description.
    pub(crate) fn send_map(&self, map: &Arc<Map>) -> Result<(), DeliveryFailure> {
        self.send(Outbound::Message(ServerMessage::Map(Arc::clone(map))))
    }

    /// Stores a display name. Surrounding whitespace is trimmed, long names
    /// are cut to [`MAX_NAME_LEN`] characters, and an empty name falls back
    /// to `player-<id>`.
    pub(crate) fn on_identify(&mut self, name: &str) {
        let trimmed = name.trim();
        self.name = if trimmed.is_empty() {
            default_name(self.id)
        } else {
            trimmed.chars().take(MAX_NAME_LEN).collect()
        };
    }

    pub(crate) fn set_character(&mut self, character: Character) {
        self.character = character;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Marks the player dead. There is no way back.
    pub(crate) fn kill(&mut self) {
        self.life = Life::Dead;
    }
}

fn default_name(id: PlayerId) -> String {
    format!("player-{}", id.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_unassigned_and_alive() {
        let (player, _rx) = PlayerHandle::channel(PlayerId(4), 8);
        assert_eq!(player.id(), PlayerId(4));
        assert_eq!(player.name(), "player-4");
        assert_eq!(player.character(), Character::Unassigned);
        assert_eq!(player.position(), Position::default());
        assert!(!player.is_dead());
    }

    #[test]
    fn test_on_identify_trims_and_truncates() {
        let (mut player, _rx) = PlayerHandle::channel(PlayerId(1), 8);
        player.on_identify("  bob  ");
        assert_eq!(player.name(), "bob");

        player.on_identify(&"x".repeat(100));
        assert_eq!(player.name().chars().count(), MAX_NAME_LEN);

        player.on_identify("   ");
        assert_eq!(player.name(), "player-1");
    }

    #[test]
    fn test_kill_is_reflected_in_view() {
        let (mut player, _rx) = PlayerHandle::channel(PlayerId(1), 8);
        player.set_position(Position::new(1.0, 2.0, 3.0));
        player.kill();
        let view = player.view();
        assert!(view.dead);
        assert_eq!(view.position, Position::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_send_reports_full_sink() {
        let (player, _rx) = PlayerHandle::channel(PlayerId(1), 1);
        assert_eq!(player.send(Outbound::Text("a".into())), Ok(()));
        assert_eq!(
            player.send(Outbound::Text("b".into())),
            Err(DeliveryFailure::Full)
        );
    }

    #[test]
    fn test_send_reports_closed_sink() {
        let (player, rx) = PlayerHandle::channel(PlayerId(1), 4);
        drop(rx);
        assert_eq!(
            player.send(Outbound::Text("a".into())),
            Err(DeliveryFailure::Closed)
        );
    }

    #[test]
    fn test_zero_capacity_is_bumped_to_one() {
        let (player, mut rx) = PlayerHandle::channel(PlayerId(1), 0);
        assert_eq!(player.send(Outbound::Text("a".into())), Ok(()));
        assert_eq!(rx.try_recv().unwrap(), Outbound::Text("a".into()));
    }
}
