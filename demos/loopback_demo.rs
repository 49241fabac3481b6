//! Loopback Demo - both sides of the bridge in one process
//!
//! Skenario:
//! 1. Host mendaftarkan `IOSQuickActionsApi`, app mendaftarkan `launchAction`
//! 2. App memanggil `setShortcutItems`
//! 3. Host memanggil `launchAction` untuk setiap shortcut
//! 4. Host menolak `clearShortcutItems`, app menerima error terstruktur
//! 5. Panggilan ke channel tanpa handler → connection error
//!
//! Usage:
//!   cargo run --example loopback_demo

use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use quick_actions_bridge::api::{
    HandlerError, IosQuickActionsApi, IosQuickActionsApiClient, IosQuickActionsApiSetup,
    IosQuickActionsFlutterApi, IosQuickActionsFlutterApiHandler, IosQuickActionsFlutterApiSetup,
    PigeonError,
};
use quick_actions_bridge::core::LocalMessenger;
use quick_actions_bridge::protocol::ShortcutItemMessage;

/// Host side: keeps the items, refuses to clear while locked
struct DemoHost {
    items: Mutex<Vec<ShortcutItemMessage>>,
    locked: bool,
}

impl IosQuickActionsApi for DemoHost {
    fn set_shortcut_items(&self, items_list: Vec<ShortcutItemMessage>) -> Result<(), HandlerError> {
        println!("   host ← setShortcutItems ({} items)", items_list.len());
        *self.items.lock() = items_list;
        Ok(())
    }

    fn clear_shortcut_items(&self) -> Result<(), HandlerError> {
        if self.locked {
            let err = PigeonError::new("locked", Some("shortcuts are pinned".to_string()), None);
            return Err(err.into());
        }
        self.items.lock().clear();
        Ok(())
    }
}

struct DemoApp;

impl IosQuickActionsFlutterApiHandler for DemoApp {
    fn launch_action(&self, action: String) -> Result<(), HandlerError> {
        println!("   app  ← launchAction({})", action);
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("🔁 Quick Actions Loopback Demo");
    println!("==============================\n");

    let messenger = Arc::new(LocalMessenger::new());
    let host = Arc::new(DemoHost {
        items: Mutex::new(Vec::new()),
        locked: true,
    });
    IosQuickActionsApiSetup::set_up(messenger.clone(), Some(host.clone()), "");
    IosQuickActionsFlutterApiSetup::set_up(messenger.clone(), Some(Arc::new(DemoApp)), "");

    let client = IosQuickActionsApiClient::new(messenger.clone(), "");
    let flutter_api = IosQuickActionsFlutterApi::new(messenger.clone(), "");

    println!("📤 setShortcutItems");
    let items = vec![
        ShortcutItemMessage::new("compose", "New message", Some("compose_icon".to_string())),
        ShortcutItemMessage::new("search", "Search", None),
    ];
    match client.set_shortcut_items_sync(&items) {
        Ok(()) => println!("   ✅ ok\n"),
        Err(e) => println!("   ❌ {}\n", e),
    }

    println!("📤 launchAction for each stored shortcut");
    let types: Vec<String> = host.items.lock().iter().map(|i| i.r#type.clone()).collect();
    for shortcut_type in types {
        match flutter_api.launch_action_sync(&shortcut_type) {
            Ok(()) => println!("   ✅ {} delivered", shortcut_type),
            Err(e) => println!("   ❌ {}", e),
        }
    }

    println!("\n📤 clearShortcutItems (host is locked)");
    match client.clear_shortcut_items_sync() {
        Ok(()) => println!("   ✅ ok"),
        Err(e) => println!("   ⚠️  {}", e),
    }

    println!("\n📤 launchAction with no app handler (suffix \"detached\")");
    let detached = IosQuickActionsFlutterApi::new(messenger, "detached");
    match detached.launch_action_sync("compose") {
        Ok(()) => println!("   ✅ ok"),
        Err(e) => println!("   ⚠️  {}", e),
    }

    println!("\n✅ Demo complete!");
}
