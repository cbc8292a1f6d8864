//! # Crownhunt
//!
//! Authoritative server for a small real-time arena game: one monster, one
//! king, any number of servants, and a maze. The monster eliminates anyone
//! who gets too close.
//!
//! The server accepts WebSocket connections, registers each one as a player
//! with a single game coordinator, and relays JSON frames of the form
//! `{ "type": "pos", "payload": { "x": 1.0, "y": 0.0, "z": 2.0 } }` in both
//! directions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crownhunt::prelude::*;
//!
//! # async fn demo() -> Result<(), CrownhuntError> {
//! let server = CrownhuntServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .game_config(GameConfig::default())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::CrownhuntError;
pub use server::{CrownhuntServer, CrownhuntServerBuilder, ServerConfig};

/// Everything needed to embed a server, in one import.
pub mod prelude {
    pub use crate::{CrownhuntError, CrownhuntServer, CrownhuntServerBuilder, ServerConfig};
    pub use crownhunt_game::{GameConfig, GameError, GameHandle, GameSnapshot};
    pub use crownhunt_mapgen::{Map, Tile};
    pub use crownhunt_protocol::{
        Character, Outbound, PlayerId, PlayerView, Position, ServerMessage,
    };
    pub use crownhunt_tick::{TickConfig, TickPolicy};
}
