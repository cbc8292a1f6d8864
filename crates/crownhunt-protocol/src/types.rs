//! Core protocol types for Crownhunt.
//!
//! Everything that crosses the boundary between a connection and the game
//! coordinator lives here: player identity, positions, roles, the inbound
//! message envelope, and the outbound messages the coordinator produces.

use std::fmt;
use std::sync::Arc;

use crownhunt_mapgen::Map;
use serde::{Deserialize, Serialize};

use crate::{Codec, ProtocolError};

/// Marker prepended to free-form broadcasts (inbound messages whose type
/// the coordinator does not recognize).
pub const TEXT_BROADCAST_PREFIX: &str = "Message: ";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Serialized as a plain number. Ids are handed out by the connection layer
/// and never reused while the server is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A player's position in the arena.
///
/// `x` and `z` are the horizontal axes; `y` is height and is carried along
/// for clients but ignored by the elimination rule. Missing fields decode
/// as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance on the horizontal (X/Z) plane.
    pub fn planar_distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx.hypot(dz)
    }
}

// ---------------------------------------------------------------------------
// Roles and liveness
// ---------------------------------------------------------------------------

/// The role a player holds in the game.
///
/// Every player starts `Unassigned` and gets a role the first time it
/// identifies itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    #[default]
    Unassigned,
    Monster,
    King,
    Servant,
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => write!(f, "unassigned"),
            Self::Monster => write!(f, "monster"),
            Self::King => write!(f, "king"),
            Self::Servant => write!(f, "servant"),
        }
    }
}

/// Whether a player is still in play.
///
/// Only ever moves from `Alive` to `Dead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Life {
    #[default]
    Alive,
    Dead,
}

impl Life {
    pub fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// The public picture of a player, as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub character: Character,
    pub position: Position,
    pub dead: bool,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A message from a player, ready for the coordinator.
///
/// `payload` is opaque to everything but the coordinator, which decodes it
/// according to `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIn {
    pub kind: String,
    pub player: PlayerId,
    pub payload: Vec<u8>,
}

/// The JSON frame a client sends: `{ "type": "pos", "payload": {...} }`.
///
/// The payload is kept as raw JSON text so it can be handed on untouched.
#[cfg(feature = "json")]
#[derive(Debug, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Option<Box<serde_json::value::RawValue>>,
}

#[cfg(feature = "json")]
impl InboundFrame {
    /// Attaches the sender and turns the frame into a [`MessageIn`].
    /// A missing payload becomes JSON `null`.
    pub fn into_message(self, player: PlayerId) -> MessageIn {
        let payload = match self.payload {
            Some(raw) => raw.get().as_bytes().to_vec(),
            None => b"null".to_vec(),
        };
        MessageIn {
            kind: self.kind,
            player,
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Structured messages the coordinator sends to players.
///
/// Adjacently tagged, so `Dead(view)` becomes
/// `{ "type": "dead", "payload": { "id": 3, ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ServerMessage {
    /// The arena, sent once on join.
    Map(Arc<Map>),
    /// Reply to the player's own identify: its name and assigned role.
    Ident(PlayerView),
    /// Another player moved or identified.
    Player(PlayerView),
    /// A player was eliminated.
    Dead(PlayerView),
    /// A player left the game.
    Leave(PlayerId),
}

impl ServerMessage {
    /// The `type` tag this message carries on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::Ident(_) => "ident",
            Self::Player(_) => "player",
            Self::Dead(_) => "dead",
            Self::Leave(_) => "leave",
        }
    }
}

/// One item in a player's outbound sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// A structured message, encoded by the codec.
    Message(ServerMessage),
    /// Pre-formatted text, written as-is.
    Text(String),
}

impl Outbound {
    /// Renders this item as a text frame.
    pub fn into_text(self, codec: &impl Codec) -> Result<String, ProtocolError> {
        match self {
            Self::Message(msg) => codec.encode(&msg),
            Self::Text(text) => Ok(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonCodec;

    fn view(id: u64) -> PlayerView {
        PlayerView {
            id: PlayerId(id),
            name: "ana".into(),
            character: Character::Servant,
            position: Position::new(1.0, 0.0, 2.0),
            dead: false,
        }
    }

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Position::new(0.0, 100.0, 0.0);
        let b = Position::new(3.0, -5.0, 4.0);
        assert_eq!(a.planar_distance(&b), 5.0);
    }

    #[test]
    fn test_position_missing_fields_default_to_zero() {
        let pos: Position = serde_json::from_str(r#"{"x": 1.5}"#).unwrap();
        assert_eq!(pos, Position::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_character_json_and_display() {
        assert_eq!(serde_json::to_string(&Character::King).unwrap(), "\"king\"");
        assert_eq!(Character::Monster.to_string(), "monster");
        assert_eq!(Character::default(), Character::Unassigned);
    }

    #[test]
    fn test_life_is_dead() {
        assert!(!Life::default().is_dead());
        assert!(Life::Dead.is_dead());
    }

    #[test]
    fn test_server_message_dead_json_shape() {
        let msg = ServerMessage::Dead(view(3));
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "dead");
        assert_eq!(json["payload"]["id"], 3);
        assert_eq!(json["payload"]["character"], "servant");
        assert_eq!(json["payload"]["position"]["z"], 2.0);
        assert_eq!(msg.kind(), "dead");
    }

    #[test]
    fn test_server_message_leave_json_shape() {
        let json = serde_json::to_value(ServerMessage::Leave(PlayerId(9))).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "leave", "payload": 9 }));
    }

    #[test]
    fn test_inbound_frame_keeps_raw_payload() {
        let frame: InboundFrame =
            serde_json::from_str(r#"{"type":"pos","payload":{"x":1,"z":2}}"#).unwrap();
        let msg = frame.into_message(PlayerId(1));
        assert_eq!(msg.kind, "pos");
        assert_eq!(msg.player, PlayerId(1));
        assert_eq!(msg.payload, br#"{"x":1,"z":2}"#.to_vec());
    }

    #[test]
    fn test_inbound_frame_missing_payload_is_null() {
        let frame: InboundFrame = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(frame.into_message(PlayerId(1)).payload, b"null".to_vec());
    }

    #[test]
    fn test_inbound_frame_without_type_is_rejected() {
        let result: Result<InboundFrame, _> = serde_json::from_str(r#"{"payload":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_outbound_text_passes_through() {
        let text = Outbound::Text("Message: hi".into())
            .into_text(&JsonCodec)
            .unwrap();
        assert_eq!(text, "Message: hi");
    }

    #[test]
    fn test_outbound_message_is_json_encoded() {
        let text = Outbound::Message(ServerMessage::Leave(PlayerId(2)))
            .into_text(&JsonCodec)
            .unwrap();
        assert_eq!(text, r#"{"type":"leave","payload":2}"#);
    }
}
