use peerlink_core::{ChannelHandle, Identity, RoomName};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Identity and room bookkeeping for the relay.
///
/// Both directions of the identity mapping are updated together so that an
/// identity points to at most one live channel and every channel points back
/// to the identity that currently owns it.
#[derive(Debug, Default)]
pub struct Registry {
    identity_to_channel: HashMap<Identity, ChannelHandle>,
    channel_to_identity: HashMap<ChannelHandle, Identity>,
    rooms: HashMap<RoomName, HashSet<ChannelHandle>>,
    channel_room: HashMap<ChannelHandle, RoomName>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `identity` as living on `channel` and adds the channel to
    /// `room`. Returns the members that were already in the room, which are
    /// the ones to notify.
    pub fn register(
        &mut self,
        channel: ChannelHandle,
        identity: Identity,
        room: RoomName,
    ) -> Vec<ChannelHandle> {
        if let Some(old_identity) = self.channel_to_identity.remove(&channel) {
            if old_identity != identity
                && self.identity_to_channel.get(&old_identity) == Some(&channel)
            {
                self.identity_to_channel.remove(&old_identity);
            }
        }

        if let Some(previous) = self.identity_to_channel.insert(identity.clone(), channel) {
            if previous != channel {
                debug!(
                    "Identity {} moved from channel {:?} to {:?}",
                    identity, previous, channel
                );
                self.channel_to_identity.remove(&previous);
            }
        }
        self.channel_to_identity.insert(channel, identity);

        let moved_from = self
            .channel_room
            .get(&channel)
            .filter(|current| **current != room)
            .cloned();
        if let Some(old_room) = moved_from {
            self.leave_room(&channel, &old_room);
        }

        let members = self.rooms.entry(room.clone()).or_default();
        let existing: Vec<ChannelHandle> = members
            .iter()
            .filter(|member| **member != channel)
            .copied()
            .collect();
        members.insert(channel);
        self.channel_room.insert(channel, room);

        existing
    }

    /// Forgets everything about `channel`. Safe to call more than once.
    pub fn unregister(&mut self, channel: &ChannelHandle) -> Option<Identity> {
        if let Some(room) = self.channel_room.remove(channel) {
            self.leave_room(channel, &room);
        }

        let identity = self.channel_to_identity.remove(channel)?;
        // A newer join may already own the identity.
        if self.identity_to_channel.get(&identity) == Some(channel) {
            self.identity_to_channel.remove(&identity);
        }
        Some(identity)
    }

    pub fn channel_for(&self, identity: &Identity) -> Option<ChannelHandle> {
        self.identity_to_channel.get(identity).copied()
    }

    pub fn identity_of(&self, channel: &ChannelHandle) -> Option<&Identity> {
        self.channel_to_identity.get(channel)
    }

    pub fn room_of(&self, channel: &ChannelHandle) -> Option<&RoomName> {
        self.channel_room.get(channel)
    }

    pub fn members(&self, room: &RoomName) -> Vec<ChannelHandle> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn identity_count(&self) -> usize {
        self.identity_to_channel.len()
    }

    fn leave_room(&mut self, channel: &ChannelHandle, room: &RoomName) {
        let Some(members) = self.rooms.get_mut(room) else {
            return;
        };
        members.remove(channel);
        if members.is_empty() {
            self.rooms.remove(room);
        }
    }
}
