//! Quick Actions App - app side of the quick actions bridge
//!
//! Alur:
//! 1. Connect ke host
//! 2. Register handler `launchAction`
//! 3. `setShortcutItems` dengan beberapa shortcut
//! 4. Tunggu `launchAction` dari host
//! 5. `clearShortcutItems`
//!
//! Usage:
//!   cargo run --release --bin quick_actions_app -- --connect 127.0.0.1:9999

use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use quick_actions_bridge::api::{
    HandlerError, IosQuickActionsApiClient, IosQuickActionsFlutterApiHandler,
    IosQuickActionsFlutterApiSetup,
};
use quick_actions_bridge::network::SocketMessenger;
use quick_actions_bridge::protocol::ShortcutItemMessage;

/// App configuration
struct AppConfig {
    connect_addr: String,
    suffix: String,
    wait_ms: u64,
    verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            connect_addr: "127.0.0.1:9999".to_string(),
            suffix: String::new(),
            wait_ms: 500,
            verbose: false,
        }
    }
}

/// Prints every action launched by the host
struct ActionPrinter {
    launched: AtomicU64,
}

impl IosQuickActionsFlutterApiHandler for ActionPrinter {
    fn launch_action(&self, action: String) -> Result<(), HandlerError> {
        let n = self.launched.fetch_add(1, Ordering::Relaxed) + 1;
        println!("⚡ [{}] launchAction: {}", n, action);
        Ok(())
    }
}

fn demo_items() -> Vec<ShortcutItemMessage> {
    vec![
        ShortcutItemMessage::new("action_one", "Action one", Some("AppIcon".to_string())),
        ShortcutItemMessage::new("action_two", "Action two", None),
    ]
}

fn run_app(config: AppConfig) -> Result<(), Box<dyn Error>> {
    println!("🚀 QUICK ACTIONS APP");
    println!("====================\n");

    let messenger = Arc::new(SocketMessenger::connect(&config.connect_addr)?);
    println!("✅ Connected to {}", messenger.peer_addr());

    let printer = Arc::new(ActionPrinter {
        launched: AtomicU64::new(0),
    });
    IosQuickActionsFlutterApiSetup::set_up(
        messenger.clone(),
        Some(printer.clone()),
        &config.suffix,
    );

    let client = IosQuickActionsApiClient::new(messenger.clone(), &config.suffix);

    let items = demo_items();
    client.set_shortcut_items_sync(&items)?;
    info!(count = items.len(), "shortcut items set");

    // Host memanggil launchAction setelah set
    std::thread::sleep(Duration::from_millis(config.wait_ms));

    client.clear_shortcut_items_sync()?;
    info!("shortcut items cleared");

    println!(
        "\n📊 launchAction received: {}",
        printer.launched.load(Ordering::Relaxed)
    );

    IosQuickActionsFlutterApiSetup::set_up(messenger.clone(), None, &config.suffix);
    messenger.shutdown();
    Ok(())
}

fn parse_args() -> AppConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = AppConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--connect" | "-c" => {
                if i + 1 < args.len() {
                    config.connect_addr = args[i + 1].clone();
                    i += 1;
                }
            }
            "--suffix" | "-s" => {
                if i + 1 < args.len() {
                    config.suffix = args[i + 1].clone();
                    i += 1;
                }
            }
            "--wait" | "-w" => {
                if i + 1 < args.len() {
                    config.wait_ms = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                println!("Quick Actions App - app side of the quick actions bridge\n");
                println!("Usage: quick_actions_app [OPTIONS]\n");
                println!("Options:");
                println!("  -c, --connect <ADDR>   Host address (default: 127.0.0.1:9999)");
                println!("  -s, --suffix <SUFFIX>  Message channel suffix (default: none)");
                println!("  -w, --wait <MS>        Wait for launchAction in ms (default: 500)");
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

    if let Err(e) = run_app(config) {
        error!(error = %e, "app failed");
        eprintln!("❌ App error: {}", e);
        std::process::exit(1);
    }
}
