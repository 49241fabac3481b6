//! Network Layer: messenger traffic over TCP
//!
//! Menggunakan mio untuk non-blocking I/O di satu background thread
//! per koneksi.
//!
//! Fitur:
//! - Envelope framing (message / reply dengan id)
//! - TCP_NODELAY dan socket buffer yang lebih besar
//! - Reply selalu dipasangkan ke callback yang benar lewat id

mod connection;
mod envelope;
mod peer;

pub use connection::{tune_socket_buffers, Connection};
pub use envelope::{Envelope, EnvelopeKind, MAX_PAYLOAD_SIZE};
pub use peer::SocketMessenger;
