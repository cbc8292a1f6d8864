//! Unified error type for the Crownhunt server.

use crownhunt_game::GameError;
use crownhunt_protocol::ProtocolError;
use crownhunt_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CrownhuntError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game could not be created or has stopped.
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
