//! Wire protocol for Crownhunt.
//!
//! - **Types** ([`PlayerId`], [`Position`], [`Character`], [`MessageIn`],
//!   [`ServerMessage`], [`Outbound`]) — what players and the coordinator
//!   exchange.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how those values become text.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (text frames) → Protocol (MessageIn / Outbound) → Game
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
#[cfg(feature = "json")]
pub use types::InboundFrame;
pub use types::{
    Character, Life, MessageIn, Outbound, PlayerId, PlayerView, Position,
    ServerMessage, TEXT_BROADCAST_PREFIX,
};
