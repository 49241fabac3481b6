//! Core module: message routing antar dua sisi boundary
//!
//! Prinsip desain:
//! - Satu handler per channel name, registrasi terakhir menang
//! - Setiap pesan yang diterima dijawab tepat satu kali
//! - Transport (in-process atau socket) tersembunyi di balik `BinaryMessenger`

mod channel;
mod messenger;

pub use channel::{BasicMessageChannel, MessageHandler, MessageReply};
pub use messenger::{
    BinaryMessageHandler, BinaryMessenger, BinaryReply, HandlerRegistry, LocalMessenger,
};
