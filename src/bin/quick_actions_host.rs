//! Quick Actions Host - native side of the quick actions bridge
//!
//! Melayani `IOSQuickActionsApi` dari app yang terkoneksi:
//! - `setShortcutItems` menyimpan shortcut di memory
//! - `clearShortcutItems` menghapus semuanya
//!
//! Setiap kali daftar shortcut berubah, host memanggil `launchAction`
//! untuk setiap shortcut type yang tersimpan.
//!
//! Usage:
//!   cargo run --release --bin quick_actions_host [OPTIONS]

use std::io;
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quick_actions_bridge::api::{
    HandlerError, IosQuickActionsApi, IosQuickActionsApiSetup, IosQuickActionsFlutterApi,
};
use quick_actions_bridge::network::SocketMessenger;
use quick_actions_bridge::protocol::ShortcutItemMessage;

/// Interval cek koneksi saat idle
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Host configuration
struct HostConfig {
    bind_addr: String,
    suffix: String,
    verbose: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9999".to_string(),
            suffix: String::new(),
            verbose: false,
        }
    }
}

/// In-memory shortcut store
///
/// Handler berjalan di thread I/O messenger, jadi perubahan hanya
/// di-notify ke main thread; `launchAction` dipanggil dari sana.
struct ShortcutStore {
    items: Mutex<Vec<ShortcutItemMessage>>,
    changed: Mutex<Sender<()>>,
}

impl ShortcutStore {
    fn new() -> (Arc<Self>, Receiver<()>) {
        let (tx, rx) = mpsc::channel();
        let store = Arc::new(Self {
            items: Mutex::new(Vec::new()),
            changed: Mutex::new(tx),
        });
        (store, rx)
    }

    fn types(&self) -> Vec<String> {
        self.items.lock().iter().map(|item| item.r#type.clone()).collect()
    }

    fn notify(&self) {
        // Receiver hilang = host sedang berhenti
        let _ = self.changed.lock().send(());
    }
}

impl IosQuickActionsApi for ShortcutStore {
    fn set_shortcut_items(&self, items_list: Vec<ShortcutItemMessage>) -> Result<(), HandlerError> {
        for item in &items_list {
            info!(
                shortcut_type = %item.r#type,
                title = %item.localized_title,
                icon = item.icon.as_deref().unwrap_or("-"),
                "shortcut registered"
            );
        }
        *self.items.lock() = items_list;
        self.notify();
        Ok(())
    }

    fn clear_shortcut_items(&self) -> Result<(), HandlerError> {
        let removed = std::mem::take(&mut *self.items.lock()).len();
        info!(removed, "shortcuts cleared");
        self.notify();
        Ok(())
    }
}

/// Serve one connected app until it disconnects
fn serve_app(messenger: Arc<SocketMessenger>, config: &HostConfig) {
    let (store, changed) = ShortcutStore::new();
    IosQuickActionsApiSetup::set_up(messenger.clone(), Some(store.clone()), &config.suffix);
    let flutter_api = IosQuickActionsFlutterApi::new(messenger.clone(), &config.suffix);

    while messenger.is_connected() {
        match changed.recv_timeout(POLL_INTERVAL) {
            Ok(()) => {
                for shortcut_type in store.types() {
                    match flutter_api.launch_action_sync(&shortcut_type) {
                        Ok(()) => info!(action = %shortcut_type, "launchAction delivered"),
                        Err(e) => warn!(action = %shortcut_type, error = %e, "launchAction failed"),
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    IosQuickActionsApiSetup::set_up(messenger.clone(), None, &config.suffix);
    messenger.shutdown();
}

fn run_host(config: HostConfig) -> io::Result<()> {
    println!("🚀 QUICK ACTIONS HOST");
    println!("=====================\n");

    let listener = TcpListener::bind(&config.bind_addr)?;
    println!("🔌 Listening on {}", listener.local_addr()?);
    if !config.suffix.is_empty() {
        println!("🏷️  Channel suffix: {}", config.suffix);
    }
    println!("\n📡 Waiting for app connections...\n");

    loop {
        let messenger = match SocketMessenger::accept(&listener) {
            Ok(messenger) => Arc::new(messenger),
            Err(e) => {
                warn!(error = %e, "failed to accept app");
                continue;
            }
        };

        let peer = messenger.peer_addr();
        println!("✅ App connected: {}", peer);
        serve_app(messenger, &config);
        println!("❌ App disconnected: {}", peer);
    }
}

fn parse_args() -> HostConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = HostConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" | "-b" => {
                if i + 1 < args.len() {
                    config.bind_addr = args[i + 1].clone();
                    i += 1;
                }
            }
            "--suffix" | "-s" => {
                if i + 1 < args.len() {
                    config.suffix = args[i + 1].clone();
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                println!("Quick Actions Host - native side of the quick actions bridge\n");
                println!("Usage: quick_actions_host [OPTIONS]\n");
                println!("Options:");
                println!("  -b, --bind <ADDR>      Bind address (default: 127.0.0.1:9999)");
                println!("  -s, --suffix <SUFFIX>  Message channel suffix (default: none)");
                println!("  -v, --verbose          Debug logging");
                println!("  -h, --help             Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let config = parse_args();
    init_tracing(config.verbose);

    if let Err(e) = run_host(config) {
        error!(error = %e, "host failed");
        eprintln!("❌ Host error: {}", e);
        std::process::exit(1);
    }
}
