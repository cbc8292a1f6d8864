//! Per-connection handler: registration, read pump, and write pump.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Allocate a `PlayerId` and register the player with the game
//!   2. Spawn the write pump: drain the player's outbox onto the socket
//!   3. Run the read pump: decode frames and forward them to the game
//!   4. Unregister when reading stops, then wait for the write pump

use std::time::Duration;

use crownhunt_game::{GameHandle, PlayerOutbox};
use crownhunt_protocol::{Codec, InboundFrame, JsonCodec, PlayerId};
use crownhunt_transport::{
    Connection, FrameReader, FrameWriter, TransportError, WebSocketConnection,
    WebSocketReader, WebSocketWriter,
};
use tokio_util::sync::CancellationToken;

use crate::CrownhuntError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    game: GameHandle,
    idle_timeout: Duration,
) -> Result<(), CrownhuntError> {
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    let (reader, writer) = conn.split();

    let outbox = game.join(player_id)?;
    tracing::info!(
        %conn_id,
        %player_id,
        outbox_capacity = game.outbound_capacity(),
        "player connected"
    );

    // Cancelled when the write pump stops, which happens once the game
    // drops this player.
    let outbound_closed = CancellationToken::new();
    let write_task = tokio::spawn(write_pump(
        writer,
        outbox,
        player_id,
        outbound_closed.clone(),
    ));

    let result = read_pump(reader, &game, player_id, idle_timeout, outbound_closed).await;

    // The game may already have dropped the player, or stopped entirely.
    let _ = game.unregister(player_id);
    if let Err(e) = write_task.await {
        tracing::warn!(%player_id, error = %e, "write pump panicked");
    }

    tracing::info!(%conn_id, %player_id, "player disconnected");
    result
}

/// Reads frames until the peer goes away, goes quiet for `idle_timeout`, or
/// the write side shuts down.
async fn read_pump(
    mut reader: WebSocketReader,
    game: &GameHandle,
    player_id: PlayerId,
    idle_timeout: Duration,
    outbound_closed: CancellationToken,
) -> Result<(), CrownhuntError> {
    let codec = JsonCodec;

    loop {
        let received = tokio::select! {
            _ = outbound_closed.cancelled() => {
                tracing::debug!(%player_id, "outbound closed, stopping reads");
                return Ok(());
            }
            received = tokio::time::timeout(idle_timeout, reader.recv()) => received,
        };

        let text = match received {
            Ok(Ok(Some(text))) => text,
            Ok(Ok(None)) => {
                tracing::debug!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(TransportError::InvalidFrame)) => {
                tracing::debug!(%player_id, "skipping non-UTF-8 frame");
                continue;
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::info!(%player_id, "connection timed out");
                return Ok(());
            }
        };

        let frame: InboundFrame = match codec.decode(text.as_bytes()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode frame");
                continue;
            }
        };

        game.send_message(frame.into_message(player_id))?;
    }
}

/// Writes everything the game queues for this player, then closes the
/// socket once the outbox is closed.
async fn write_pump(
    mut writer: WebSocketWriter,
    mut outbox: PlayerOutbox,
    player_id: PlayerId,
    outbound_closed: CancellationToken,
) {
    let _closed = outbound_closed.drop_guard();
    let codec = JsonCodec;

    while let Some(item) = outbox.recv().await {
        let text = match item.into_text(&codec) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(%player_id, error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = writer.send(&text).await {
            tracing::debug!(%player_id, error = %e, "send failed");
            break;
        }
    }

    if let Err(e) = writer.close().await {
        tracing::trace!(%player_id, error = %e, "close failed");
    }
}
