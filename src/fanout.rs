use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::model::{ChatType, Message};

const CHANNEL_CAPACITY: usize = 64;

/// Delivery channel key: one channel per recipient for private messages,
/// one per group for group messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Private(String),
    Group(String),
}

impl Channel {
    /// Where a message gets pushed. A message missing its target id has no
    /// channel; that cannot happen for assembled messages.
    pub fn of(message: &Message) -> Option<Channel> {
        match message.chat_type {
            ChatType::Private => message.recipient_id.clone().map(Channel::Private),
            ChatType::Group => message.group_id.clone().map(Channel::Group),
        }
    }
}

/// Best-effort push of newly persisted messages to live subscribers.
/// Fire-and-forget: no acknowledgment, no retry, no buffering for absent
/// subscribers. Channels are created lazily on first subscription, so a
/// publish to a channel nobody ever opened is a no-op.
#[derive(Clone, Default)]
pub struct Fanout {
    channels: Arc<Mutex<HashMap<Channel, broadcast::Sender<Message>>>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never fails and never blocks on delivery; the caller already committed
    /// the message and reports success regardless of what happens here.
    /// A channel whose last receiver is gone gets dropped instead of sent to,
    /// so the map tracks live subscriptions rather than every key ever seen.
    pub fn publish(&self, message: &Message) {
        let Some(channel) = Channel::of(message) else {
            return;
        };
        let mut channels = self.channels.lock().unwrap();
        if let Some(tx) = channels.get(&channel) {
            if tx.receiver_count() == 0 {
                channels.remove(&channel);
            } else {
                let _ = tx.send(message.clone());
            }
        }
    }

    pub fn subscribe(&self, channel: Channel) -> broadcast::Receiver<Message> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(channel)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }
}
