//! Binary messenger: routing bytes by channel name
//!
//! State satu-satunya adalah map `channel name → handler`.
//! Registrasi terakhir menang, registrasi `None` menghapus handler.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

/// Single-shot reply callback. `None` means "no reply payload".
pub type BinaryReply = Box<dyn FnOnce(Option<Vec<u8>>) + Send + 'static>;

/// Handler for raw messages arriving on one channel
pub type BinaryMessageHandler = Arc<dyn Fn(Option<Vec<u8>>, BinaryReply) + Send + Sync + 'static>;

/// Transport that moves encoded messages between the two sides
pub trait BinaryMessenger: Send + Sync {
    /// Send `message` on `channel`; `reply` fires once with the response.
    fn send(&self, channel: &str, message: Option<Vec<u8>>, reply: Option<BinaryReply>);

    /// Install (`Some`) or remove (`None`) the handler for `channel`.
    fn set_message_handler(&self, channel: &str, handler: Option<BinaryMessageHandler>);
}

/// Channel name → handler association
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, BinaryMessageHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, channel: &str, handler: Option<BinaryMessageHandler>) {
        let mut handlers = self.handlers.write();
        match handler {
            Some(handler) => {
                let replaced = handlers.insert(channel.to_string(), handler).is_some();
                debug!(channel, replaced, "message handler registered");
            }
            None => {
                let removed = handlers.remove(channel).is_some();
                debug!(channel, removed, "message handler cleared");
            }
        }
    }

    pub fn get(&self, channel: &str) -> Option<BinaryMessageHandler> {
        self.handlers.read().get(channel).cloned()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.handlers.read().contains_key(channel)
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver to the channel's handler, or reply `None` when there is none.
    ///
    /// The lock is released before the handler runs, so handlers may
    /// re-register channels.
    pub fn dispatch(&self, channel: &str, message: Option<Vec<u8>>, reply: BinaryReply) {
        match self.get(channel) {
            Some(handler) => handler(message, reply),
            None => {
                trace!(channel, "no handler registered, replying with empty payload");
                reply(None);
            }
        }
    }
}

/// In-process messenger: both sides share one handler map.
///
/// Delivery is synchronous on the sender's thread.
#[derive(Default)]
pub struct LocalMessenger {
    registry: HandlerRegistry,
}

impl LocalMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_handler(&self, channel: &str) -> bool {
        self.registry.contains(channel)
    }
}

impl BinaryMessenger for LocalMessenger {
    fn send(&self, channel: &str, message: Option<Vec<u8>>, reply: Option<BinaryReply>) {
        let reply: BinaryReply = match reply {
            Some(reply) => reply,
            None => Box::new(|_: Option<Vec<u8>>| {}),
        };
        self.registry.dispatch(channel, message, reply);
    }

    fn set_message_handler(&self, channel: &str, handler: Option<BinaryMessageHandler>) {
        self.registry.set(channel, handler);
    }
}
