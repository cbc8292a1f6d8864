//! Error types for the game layer.

use crownhunt_mapgen::MapError;

/// Errors surfaced to callers of the game API.
///
/// Nothing in here is fatal to a running coordinator: bad payloads and
/// unresponsive players are handled inside the event loop and only logged.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The arena could not be generated.
    #[error(transparent)]
    Map(#[from] MapError),

    /// The coordinator has stopped and no longer accepts events.
    #[error("game coordinator has stopped")]
    Stopped,
}
