//! Named message channel on top of a `BinaryMessenger`
//!
//! Menggabungkan nama channel, messenger, dan codec. Semua encode/decode
//! `Value` ↔ bytes terjadi di sini, jadi layer API cukup bekerja dengan
//! `Value`.

use std::sync::Arc;

use tracing::{error, warn};

use super::messenger::{BinaryMessenger, BinaryReply};
use crate::protocol::{CodecError, MessageCodec, Value};

/// Decoded-message handler. Receives the decoded message (or the decode
/// error) and the reply slot for it.
pub type MessageHandler<C> =
    Arc<dyn Fn(Result<Value, CodecError>, MessageReply<C>) + Send + Sync + 'static>;

/// Reply slot for one received message
///
/// `send` consumes the slot. A slot dropped without `send` answers with an
/// empty payload, so every message gets exactly one reply.
pub struct MessageReply<C: MessageCodec> {
    reply: Option<BinaryReply>,
    codec: C,
    channel: Arc<str>,
}

impl<C: MessageCodec> MessageReply<C> {
    pub fn send(mut self, value: Value) {
        let Some(reply) = self.reply.take() else {
            return;
        };
        match self.codec.encode_message(&value) {
            Ok(bytes) => reply(Some(bytes)),
            Err(e) => {
                error!(channel = %self.channel, error = %e, "failed to encode reply");
                reply(None);
            }
        }
    }
}

impl<C: MessageCodec> Drop for MessageReply<C> {
    fn drop(&mut self) {
        if let Some(reply) = self.reply.take() {
            warn!(channel = %self.channel, "reply dropped without an answer");
            reply(None);
        }
    }
}

/// Channel identified by name, bound to a messenger and a codec
pub struct BasicMessageChannel<C> {
    name: Arc<str>,
    messenger: Arc<dyn BinaryMessenger>,
    codec: C,
}

impl<C> BasicMessageChannel<C>
where
    C: MessageCodec + Clone + 'static,
{
    pub fn new(name: impl Into<String>, messenger: Arc<dyn BinaryMessenger>, codec: C) -> Self {
        Self {
            name: Arc::from(name.into()),
            messenger,
            codec,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send `message`; `callback` fires exactly once with the decoded reply.
    ///
    /// An encoding failure completes the callback immediately.
    pub fn send_message<F>(&self, message: &Value, callback: F)
    where
        F: FnOnce(Result<Value, CodecError>) + Send + 'static,
    {
        let bytes = match self.codec.encode_message(message) {
            Ok(bytes) => bytes,
            Err(e) => {
                callback(Err(e));
                return;
            }
        };

        let codec = self.codec.clone();
        self.messenger.send(
            &self.name,
            Some(bytes),
            Some(Box::new(move |reply: Option<Vec<u8>>| {
                callback(codec.decode_message(reply.as_deref()))
            })),
        );
    }

    /// Install a handler, or clear the channel's handler with `None`.
    pub fn set_message_handler(&self, handler: Option<MessageHandler<C>>) {
        let Some(handler) = handler else {
            self.messenger.set_message_handler(&self.name, None);
            return;
        };

        let codec = self.codec.clone();
        let channel = Arc::clone(&self.name);
        self.messenger.set_message_handler(
            &self.name,
            Some(Arc::new(move |message: Option<Vec<u8>>, reply: BinaryReply| {
                let decoded = codec.decode_message(message.as_deref());
                let slot = MessageReply {
                    reply: Some(reply),
                    codec: codec.clone(),
                    channel: Arc::clone(&channel),
                };
                handler(decoded, slot);
            })),
        );
    }
}
