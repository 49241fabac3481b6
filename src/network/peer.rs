//! SocketMessenger: `BinaryMessenger` di atas satu koneksi TCP
//!
//! Event loop mio berjalan di background thread:
//! - Message dari peer → handler lokal (di thread I/O), reply dikirim balik
//!   dengan `id` yang sama
//! - Reply dari peer → callback yang menunggu `id` tersebut
//! - Koneksi putus → semua callback yang masih menunggu dipanggil dengan `None`
//!
//! Handler berjalan di thread I/O, jadi handler tidak boleh menunggu
//! (blocking) reply dari messenger yang sama.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use mio::{Events, Interest, Poll, Token, Waker};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::connection::{tune_socket_buffers, Connection};
use super::envelope::{Envelope, EnvelopeKind};
use crate::core::{BinaryMessageHandler, BinaryMessenger, BinaryReply, HandlerRegistry};

const PEER_TOKEN: Token = Token(0);
const WAKER_TOKEN: Token = Token(1);
const EVENTS_CAPACITY: usize = 64;

/// Callbacks waiting for a reply, closed once the connection is gone
#[derive(Default)]
struct Pending {
    replies: HashMap<u64, BinaryReply>,
    closed: bool,
}

struct Shared {
    registry: HandlerRegistry,
    pending: Mutex<Pending>,
    outbound: Mutex<Vec<u8>>,
    next_id: AtomicU64,
    stop: AtomicBool,
    waker: Waker,
    peer_addr: SocketAddr,
}

impl Shared {
    /// Queue `envelope` for the I/O thread. Dropped once the connection is
    /// closed, nothing drains `outbound` after that.
    fn enqueue(&self, envelope: &Envelope) -> io::Result<()> {
        // Lock order: pending → outbound
        let pending = self.pending.lock();
        if pending.closed {
            debug!(id = envelope.id, kind = ?envelope.kind, "connection closed, envelope dropped");
            return Ok(());
        }
        envelope.encode_into(&mut self.outbound.lock())?;
        drop(pending);
        self.waker.wake()
    }

    /// Mark closed, discard unsent bytes and fail every waiting callback
    fn close_pending(&self) {
        let replies = {
            let mut pending = self.pending.lock();
            pending.closed = true;
            self.outbound.lock().clear();
            std::mem::take(&mut pending.replies)
        };
        if !replies.is_empty() {
            warn!(
                peer = %self.peer_addr,
                count = replies.len(),
                "failing calls still waiting for a reply"
            );
        }
        for (_, reply) in replies {
            reply(None);
        }
    }
}

/// Messenger connected to one remote peer over TCP
pub struct SocketMessenger {
    shared: Arc<Shared>,
    io_thread: Mutex<Option<JoinHandle<()>>>,
}

impl SocketMessenger {
    /// Connect to a listening peer
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Self::from_stream(TcpStream::connect(addr)?)
    }

    /// Accept exactly one peer from `listener`
    pub fn accept(listener: &TcpListener) -> io::Result<Self> {
        let (stream, _) = listener.accept()?;
        Self::from_stream(stream)
    }

    /// Take over a connected stream and start the I/O thread
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        // TCP_NODELAY untuk low latency
        stream.set_nodelay(true)?;
        tune_socket_buffers(&stream);
        stream.set_nonblocking(true)?;
        let peer_addr = stream.peer_addr()?;

        let poll = Poll::new()?;
        let waker = Waker::new(poll.registry(), WAKER_TOKEN)?;
        let mut mio_stream = mio::net::TcpStream::from_std(stream);
        poll.registry().register(
            &mut mio_stream,
            PEER_TOKEN,
            Interest::READABLE | Interest::WRITABLE,
        )?;

        let shared = Arc::new(Shared {
            registry: HandlerRegistry::new(),
            pending: Mutex::new(Pending::default()),
            outbound: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            stop: AtomicBool::new(false),
            waker,
            peer_addr,
        });

        let loop_shared = Arc::clone(&shared);
        let io_thread = thread::Builder::new()
            .name(format!("messenger-{peer_addr}"))
            .spawn(move || {
                let conn = Connection::new(mio_stream);
                if let Err(e) = run_event_loop(poll, conn, &loop_shared) {
                    error!(peer = %loop_shared.peer_addr, error = %e, "messenger I/O failed");
                }
                loop_shared.close_pending();
            })?;

        info!(peer = %peer_addr, "messenger connected");
        Ok(Self {
            shared,
            io_thread: Mutex::new(Some(io_thread)),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.shared.peer_addr
    }

    /// `false` once the connection is gone
    pub fn is_connected(&self) -> bool {
        !self.shared.pending.lock().closed
    }

    pub fn has_handler(&self, channel: &str) -> bool {
        self.shared.registry.contains(channel)
    }

    /// Stop the I/O thread. Waiting callbacks fire with `None`.
    pub fn shutdown(&self) {
        self.shared.stop.store(true, Ordering::Release);
        let _ = self.shared.waker.wake();

        let handle = self.io_thread.lock().take();
        if let Some(handle) = handle {
            // Dipanggil dari handler (thread I/O sendiri): jangan join
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for SocketMessenger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl BinaryMessenger for SocketMessenger {
    fn send(&self, channel: &str, message: Option<Vec<u8>>, reply: Option<BinaryReply>) {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);

        let mut pending = self.shared.pending.lock();
        if pending.closed {
            drop(pending);
            debug!(channel, "messenger closed, failing send");
            if let Some(reply) = reply {
                reply(None);
            }
            return;
        }
        if let Some(reply) = reply {
            pending.replies.insert(id, reply);
        }
        drop(pending);

        if let Err(e) = self.shared.enqueue(&Envelope::message(id, channel, message)) {
            warn!(channel, error = %e, "failed to queue message");
            let reply = self.shared.pending.lock().replies.remove(&id);
            if let Some(reply) = reply {
                reply(None);
            }
        }
    }

    fn set_message_handler(&self, channel: &str, handler: Option<BinaryMessageHandler>) {
        self.shared.registry.set(channel, handler);
    }
}

fn run_event_loop(
    mut poll: Poll,
    mut conn: Connection<mio::net::TcpStream>,
    shared: &Arc<Shared>,
) -> io::Result<()> {
    let mut events = Events::with_capacity(EVENTS_CAPACITY);

    loop {
        match poll.poll(&mut events, None) {
            Ok(()) => {}
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }

        if shared.stop.load(Ordering::Acquire) {
            debug!(peer = %shared.peer_addr, "messenger shutting down");
            return Ok(());
        }

        let mut peer_closed = false;
        for event in events.iter() {
            if event.token() == PEER_TOKEN && (event.is_readable() || event.is_read_closed()) {
                peer_closed |= conn.fill_read_buffer()?;
            }
        }

        // === Dispatch envelopes yang sudah lengkap ===
        let mut consumed = 0;
        while let Some((envelope, used)) = Envelope::decode(&conn.readable()[consumed..])? {
            consumed += used;
            handle_envelope(shared, envelope);
        }
        conn.consume(consumed);

        // === Flush outbound (termasuk reply dari handler di atas) ===
        let outbound = std::mem::take(&mut *shared.outbound.lock());
        if !outbound.is_empty() {
            conn.queue_write(&outbound);
        }
        if conn.write_pending() > 0 {
            conn.flush_write_buffer()?;
        }

        if peer_closed {
            info!(peer = %shared.peer_addr, "peer closed the connection");
            return Ok(());
        }
    }
}

fn handle_envelope(shared: &Arc<Shared>, envelope: Envelope) {
    match envelope.kind {
        EnvelopeKind::Message => {
            let id = envelope.id;
            let reply_shared = Arc::clone(shared);
            let reply: BinaryReply = Box::new(move |payload: Option<Vec<u8>>| {
                if let Err(e) = reply_shared.enqueue(&Envelope::reply(id, payload)) {
                    warn!(id, error = %e, "failed to queue reply");
                }
            });
            shared
                .registry
                .dispatch(&envelope.channel, envelope.payload, reply);
        }
        EnvelopeKind::Reply => {
            let reply = shared.pending.lock().replies.remove(&envelope.id);
            match reply {
                Some(reply) => reply(envelope.payload),
                None => debug!(id = envelope.id, "reply for unknown call dropped"),
            }
        }
    }
}
