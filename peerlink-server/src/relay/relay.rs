use crate::relay::{Registry, RelayStats, RelayStatsSnapshot};
use dashmap::DashMap;
use peerlink_core::{ChannelHandle, ClientMessage, Identity, RoomName, ServerMessage};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outbound queue of one connected channel.
pub type ChannelSender = mpsc::UnboundedSender<ServerMessage>;

struct RelayInner {
    channels: DashMap<ChannelHandle, ChannelSender>,
    registry: Mutex<Registry>,
    stats: RelayStats,
}

/// Store-and-forward switch between connected channels.
///
/// Live connections sit in a concurrent map so forwarding only needs a point
/// lookup. Identity and room state is mutated behind a single lock.
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                channels: DashMap::new(),
                registry: Mutex::new(Registry::new()),
                stats: RelayStats::default(),
            }),
        }
    }

    /// Registers a new live connection and returns its handle.
    pub fn connect(&self, tx: ChannelSender) -> ChannelHandle {
        let channel = ChannelHandle::new();
        self.inner.channels.insert(channel, tx);
        channel
    }

    /// Entry point for every frame read from `from`.
    pub fn handle_message(&self, from: ChannelHandle, msg: ClientMessage) {
        match msg {
            ClientMessage::RoomJoin { identity, room } => self.join(from, identity, room),
            other => self.relay_message(from, other),
        }
    }

    pub fn join(&self, channel: ChannelHandle, identity: Identity, room: RoomName) {
        if !self.inner.channels.contains_key(&channel) {
            debug!("Ignoring join from closed channel {:?}", channel);
            return;
        }

        info!("{} joined room '{}' on channel {:?}", identity, room, channel);

        let members = self.registry().register(channel, identity.clone(), room.clone());

        for member in members {
            self.send_to(
                &member,
                ServerMessage::UserJoined {
                    identity: identity.clone(),
                    id: channel,
                },
            );
        }

        self.send_to(
            &channel,
            ServerMessage::RoomJoined {
                identity,
                room,
                id: channel,
            },
        );
    }

    /// Forwards an addressed frame to its destination, stamping the sender.
    /// Unknown destinations are dropped without telling the sender.
    pub fn relay_message(&self, from: ChannelHandle, msg: ClientMessage) {
        let event = msg.event_name();
        let Some((to, forwarded)) = msg.into_forwarded(from) else {
            warn!("Frame '{}' from {:?} is not addressed", event, from);
            return;
        };

        if self.send_to(&to, forwarded) {
            debug!("Relayed '{}' {:?} -> {:?}", event, from, to);
        } else {
            debug!("Dropped '{}' from {:?}: {:?} is not connected", event, from, to);
        }
    }

    /// Forgets the channel. Room members are not told.
    pub fn disconnect(&self, channel: &ChannelHandle) {
        self.inner.channels.remove(channel);
        if let Some(identity) = self.registry().unregister(channel) {
            info!("{} left (channel {:?})", identity, channel);
        }
    }

    pub fn channel_for(&self, identity: &Identity) -> Option<ChannelHandle> {
        self.registry().channel_for(identity)
    }

    pub fn identity_of(&self, channel: &ChannelHandle) -> Option<Identity> {
        self.registry().identity_of(channel).cloned()
    }

    pub fn members(&self, room: &RoomName) -> Vec<ChannelHandle> {
        self.registry().members(room)
    }

    pub fn is_connected(&self, channel: &ChannelHandle) -> bool {
        self.inner.channels.contains_key(channel)
    }

    pub fn stats(&self) -> RelayStatsSnapshot {
        self.inner.stats.snapshot()
    }

    fn send_to(&self, channel: &ChannelHandle, msg: ServerMessage) -> bool {
        let delivered = match self.inner.channels.get(channel) {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        };

        if delivered {
            self.inner.stats.record_forwarded();
        } else {
            self.inner.stats.record_dropped();
        }
        delivered
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
