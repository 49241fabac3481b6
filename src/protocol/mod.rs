//! Protocol Layer: Tagged Binary Values
//!
//! Prinsip desain:
//! - Self-describing: setiap value diawali tag 1 byte
//! - Extensible: tag >= 128 untuk custom type (ShortcutItemMessage = 129)
//! - Symmetric: semua yang bisa di-encode bisa di-decode kembali

mod codec;
mod encoder;
mod error;
mod message;
mod shortcut;
mod value;

pub use codec::{
    read_standard, write_standard, MessageCodec, ReaderWriter, StandardMessageCodec,
    StandardReaderWriter,
};
pub use encoder::{Decoder, Encoder, MAX_NESTING_DEPTH};
pub use error::CodecError;
pub use message::{ValueType, FIRST_CUSTOM_TAG};
pub use shortcut::{
    messages_codec, CustomValue, MessagesCodec, MessagesReaderWriter, ShortcutItemMessage,
    SHORTCUT_ITEM_TAG,
};
pub(crate) use shortcut::required_string;
pub use value::Value;
