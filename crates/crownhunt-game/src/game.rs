//! The game coordinator: one Tokio task that owns every piece of game state.
//!
//! Connection tasks never touch the registry directly. They talk to the
//! coordinator through a [`GameHandle`], which puts registrations,
//! unregistrations, inbound messages, and snapshot requests on one
//! unbounded queue. The coordinator selects over that queue, the
//! elimination tick, and a cancellation token, and handles each event to
//! completion, in arrival order, before looking at the next one.

use std::collections::VecDeque;
use std::sync::Arc;

use crownhunt_mapgen::{Map, new_map, new_map_seeded};
use crownhunt_protocol::{
    Codec, JsonCodec, MessageIn, Outbound, PlayerId, PlayerView, Position,
    ServerMessage, TEXT_BROADCAST_PREFIX,
};
use crownhunt_tick::{TickInfo, TickScheduler};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::elimination::eliminate;
use crate::player::DeliveryFailure;
use crate::registry::Registry;
use crate::{GameConfig, GameError, PlayerHandle, PlayerOutbox};

/// Everything connection tasks ask of the coordinator. All of it travels
/// through one queue, so events are handled in the order they were sent.
#[derive(Debug)]
enum Event {
    Register(PlayerHandle),
    Unregister(PlayerId),
    Message(MessageIn),
    Snapshot(oneshot::Sender<GameSnapshot>),
}

/// A point-in-time copy of the coordinator's state.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    /// Every connected player, ordered by id.
    pub players: Vec<PlayerView>,
    pub monster: Option<PlayerId>,
    pub king: Option<PlayerId>,
    /// Servants in join order.
    pub servants: Vec<PlayerId>,
    /// Elimination ticks run so far.
    pub ticks: u64,
    pub alive: bool,
}

impl GameSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Ids of connected players that have been eliminated.
    pub fn dead_players(&self) -> Vec<PlayerId> {
        self.players.iter().filter(|p| p.dead).map(|p| p.id).collect()
    }
}

/// Handle to a running coordinator.
///
/// Cheap to clone. Every method is non-blocking except the ones that wait
/// for a reply. Once the coordinator has stopped they return
/// [`GameError::Stopped`].
#[derive(Debug, Clone)]
pub struct GameHandle {
    events: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    outbound_capacity: usize,
}

impl GameHandle {
    fn submit(&self, event: Event) -> Result<(), GameError> {
        self.events.send(event).map_err(|_| GameError::Stopped)
    }

    /// Hands a new player to the coordinator, which admits it and sends it
    /// the map.
    pub fn register(&self, player: PlayerHandle) -> Result<(), GameError> {
        self.submit(Event::Register(player))
    }

    /// Creates a player with an outbox of the configured capacity and
    /// registers it. The returned outbox is what the connection drains.
    pub fn join(&self, id: PlayerId) -> Result<PlayerOutbox, GameError> {
        let (player, outbox) = PlayerHandle::channel(id, self.outbound_capacity);
        self.register(player)?;
        Ok(outbox)
    }

    /// Removes a player. Unknown ids are ignored by the coordinator.
    pub fn unregister(&self, id: PlayerId) -> Result<(), GameError> {
        self.submit(Event::Unregister(id))
    }

    /// Queues an inbound message for dispatch.
    pub fn send_message(&self, msg: MessageIn) -> Result<(), GameError> {
        self.submit(Event::Message(msg))
    }

    /// Asks the coordinator for a copy of its state.
    ///
    /// The reply reflects every event queued on this handle before the call.
    pub async fn snapshot(&self) -> Result<GameSnapshot, GameError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Event::Snapshot(reply))?;
        rx.await.map_err(|_| GameError::Stopped)
    }

    /// Stops the coordinator. Every player's outbox is closed.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Resolves once the coordinator task has stopped.
    pub async fn closed(&self) {
        self.events.closed().await;
    }

    /// Capacity of the outbox [`join`](Self::join) creates.
    pub fn outbound_capacity(&self) -> usize {
        self.outbound_capacity
    }
}

/// Generates the arena described by `config` and starts a coordinator for
/// it.
///
/// Must be called from inside a Tokio runtime.
///
/// # Errors
/// Returns [`GameError::Map`] if the configured arena size is invalid.
pub fn spawn_game(config: GameConfig) -> Result<GameHandle, GameError> {
    let map = match config.map_seed {
        Some(seed) => new_map_seeded(config.map_width, config.map_height, seed)?,
        None => new_map(config.map_width, config.map_height)?,
    };
    Ok(spawn_game_with_map(config, map))
}

/// Starts a coordinator for an existing arena. The map sizes in `config`
/// are ignored.
pub fn spawn_game_with_map(config: GameConfig, map: Map) -> GameHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let handle = GameHandle {
        events: events_tx,
        cancel: cancel.clone(),
        outbound_capacity: config.outbound_capacity.max(1),
    };

    let game = Game {
        scheduler: TickScheduler::new(config.tick.clone()),
        map: Arc::new(map),
        registry: Registry::new(),
        codec: JsonCodec,
        alive: true,
        config,
    };

    tokio::spawn(game.run(events_rx, cancel));
    handle
}

struct Game {
    config: GameConfig,
    map: Arc<Map>,
    registry: Registry,
    codec: JsonCodec,
    alive: bool,
    scheduler: TickScheduler,
}

impl Game {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>, cancel: CancellationToken) {
        info!(
            width = self.map.width,
            height = self.map.height,
            period_ms = self.scheduler.period().as_secs_f64() * 1000.0,
            "game started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                // Due ticks run before queued events; a busy queue never
                // delays elimination.
                tick = self.scheduler.wait_for_tick() => self.on_tick(tick),

                event = events.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => break,
                },
            }
        }

        self.shutdown();
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Register(player) => self.on_register(player),
            Event::Unregister(id) => self.on_unregister(id),
            Event::Message(msg) => self.on_message(msg),
            Event::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn on_register(&mut self, player: PlayerHandle) {
        let id = player.id();
        if let Err(duplicate) = self.registry.admit(player) {
            warn!(player_id = %id, "player id already registered, dropping new handle");
            drop(duplicate);
            return;
        }

        info!(player_id = %id, players = self.registry.len(), "new player");

        let failed = self
            .registry
            .get(id)
            .and_then(|player| player.send_map(&self.map).err());
        if let Some(failure) = failed {
            self.evict(vec![(id, failure)]);
        }
    }

    fn on_unregister(&mut self, id: PlayerId) {
        let Some(player) = self.registry.remove(id) else {
            debug!(player_id = %id, "unregister for unknown player, ignoring");
            return;
        };
        info!(
            player_id = %id,
            character = %player.character(),
            players = self.registry.len(),
            "player left"
        );
        // Dropping the handle closes its outbox.
        drop(player);
        self.broadcast_leave(id);
    }

    fn on_message(&mut self, msg: MessageIn) {
        if !self.registry.contains(msg.player) {
            debug!(player_id = %msg.player, kind = %msg.kind, "message from non-member, ignoring");
            return;
        }

        match msg.kind.as_str() {
            "ident" => self.on_ident(msg.player, &msg.payload),
            "pos" => self.on_pos(msg.player, &msg.payload),
            _ => self.on_text(&msg),
        }
    }

    fn on_ident(&mut self, id: PlayerId, payload: &[u8]) {
        let name: String = match self.codec.decode(payload) {
            Ok(name) => name,
            Err(error) => {
                warn!(player_id = %id, %error, "malformed ident payload, dropping");
                return;
            }
        };

        let Some(player) = self.registry.get_mut(id) else {
            return;
        };
        player.on_identify(&name);

        if let Some(character) = self.registry.assign_role(id) {
            info!(player_id = %id, %character, "role assigned");
        }

        let Some(player) = self.registry.get(id) else {
            return;
        };
        let view = player.view();
        debug!(player_id = %id, name = %view.name, "player identified");

        let mut failed = Vec::new();
        if let Err(failure) = player.send(Outbound::Message(ServerMessage::Ident(view.clone()))) {
            failed.push((id, failure));
        }
        failed.extend(self.fan_out(&Outbound::Message(ServerMessage::Player(view)), Some(id)));
        self.evict(failed);
    }

    fn on_pos(&mut self, id: PlayerId, payload: &[u8]) {
        let Some(player) = self.registry.get_mut(id) else {
            return;
        };
        if player.is_dead() {
            debug!(player_id = %id, "position from dead player, dropping");
            return;
        }

        let position: Position = match self.codec.decode(payload) {
            Ok(position) => position,
            Err(error) => {
                warn!(player_id = %id, %error, "malformed pos payload, dropping");
                return;
            }
        };
        player.set_position(position);

        let view = player.view();
        self.broadcast(Outbound::Message(ServerMessage::Player(view)), Some(id));
    }

    fn on_text(&mut self, msg: &MessageIn) {
        let text: String = match self.codec.decode(&msg.payload) {
            Ok(text) => text,
            Err(error) => {
                warn!(player_id = %msg.player, kind = %msg.kind, %error, "malformed payload, dropping");
                return;
            }
        };
        debug!(player_id = %msg.player, kind = %msg.kind, "broadcasting text");
        self.broadcast(Outbound::Text(format!("{TEXT_BROADCAST_PREFIX}{text}")), None);
    }

    fn on_tick(&mut self, tick: TickInfo) {
        let victims = eliminate(&mut self.registry, self.config.elimination_radius);
        for victim in victims {
            info!(
                player_id = %victim.id,
                tick = tick.tick,
                x = victim.position.x,
                z = victim.position.z,
                "player died"
            );
            self.broadcast(Outbound::Message(ServerMessage::Dead(victim)), None);
        }
        self.scheduler.record_tick_end();
    }

    fn snapshot(&self) -> GameSnapshot {
        let mut players: Vec<PlayerView> = self.registry.players().map(PlayerHandle::view).collect();
        players.sort_by_key(|p| p.id);
        GameSnapshot {
            players,
            monster: self.registry.monster_id(),
            king: self.registry.king_id(),
            servants: self.registry.servants().to_vec(),
            ticks: self.scheduler.tick_count(),
            alive: self.alive,
        }
    }

    /// Delivers `item` to every player except `skip`, then evicts whoever
    /// couldn't take it.
    fn broadcast(&mut self, item: Outbound, skip: Option<PlayerId>) {
        let failed = self.fan_out(&item, skip);
        self.evict(failed);
    }

    /// Delivers `item` to every player except `skip` and reports the ones
    /// whose sink refused it. A refusal never stops the fan-out.
    fn fan_out(&self, item: &Outbound, skip: Option<PlayerId>) -> Vec<(PlayerId, DeliveryFailure)> {
        self.registry
            .players()
            .filter(|p| Some(p.id()) != skip)
            .filter_map(|p| p.send(item.clone()).err().map(|failure| (p.id(), failure)))
            .collect()
    }

    fn broadcast_leave(&mut self, id: PlayerId) {
        self.broadcast(Outbound::Message(ServerMessage::Leave(id)), None);
    }

    /// Removes players whose sinks refused a delivery. Each removal tells
    /// the rest with a `leave`, which may in turn find more full sinks.
    fn evict(&mut self, failed: Vec<(PlayerId, DeliveryFailure)>) {
        let mut pending = VecDeque::from(failed);
        while let Some((id, failure)) = pending.pop_front() {
            let Some(player) = self.registry.remove(id) else {
                continue;
            };
            match failure {
                DeliveryFailure::Full => {
                    warn!(player_id = %id, "outbound sink full, evicting player");
                }
                DeliveryFailure::Closed => {
                    debug!(player_id = %id, "outbound sink closed, evicting player");
                }
            }
            drop(player);

            let leave = Outbound::Message(ServerMessage::Leave(id));
            pending.extend(self.fan_out(&leave, None));
        }
    }

    fn shutdown(&mut self) {
        self.alive = false;
        let players = self.registry.drain();
        info!(
            players = players.len(),
            ticks = self.scheduler.tick_count(),
            "game stopped"
        );
    }
}
