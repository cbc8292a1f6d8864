//! Game coordinator for Crownhunt.
//!
//! A single Tokio task owns the whole game: the player registry, the role
//! slots (one monster, one king, any number of servants), the arena map,
//! and the elimination tick. Everything else talks to it through a
//! [`GameHandle`].
//!
//! # Key types
//!
//! - [`spawn_game`] — generate an arena and start a coordinator
//! - [`GameHandle`] — register/unregister players, forward messages, shut down
//! - [`PlayerHandle`] — a connected player and its outbound sink
//! - [`GameConfig`] — arena size, tick period, kill radius, sink capacity
//!
//! ```no_run
//! use crownhunt_game::{GameConfig, spawn_game};
//! use crownhunt_protocol::PlayerId;
//!
//! # async fn demo() -> Result<(), crownhunt_game::GameError> {
//! let game = spawn_game(GameConfig::default())?;
//! let mut outbox = game.join(PlayerId(1))?;
//! while let Some(item) = outbox.recv().await {
//!     println!("{item:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod elimination;
mod error;
mod game;
mod player;
mod registry;

pub use config::GameConfig;
pub use error::GameError;
pub use game::{GameHandle, GameSnapshot, spawn_game, spawn_game_with_map};
pub use player::{MAX_NAME_LEN, PlayerHandle, PlayerOutbox};
