//! Socket Test - host and app messengers over a real TCP connection
//!
//! Usage:
//!   cargo test --test socket_test

use std::net::TcpListener;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use quick_actions_bridge::api::{
    HandlerError, IosQuickActionsApi, IosQuickActionsApiClient, IosQuickActionsApiSetup,
    IosQuickActionsFlutterApi, IosQuickActionsFlutterApiHandler, IosQuickActionsFlutterApiSetup,
    PigeonError, CHANNEL_ERROR_CODE,
};
use quick_actions_bridge::core::{BinaryMessenger, BinaryReply};
use quick_actions_bridge::network::SocketMessenger;
use quick_actions_bridge::protocol::ShortcutItemMessage;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct MemoryHost {
    items: Mutex<Vec<ShortcutItemMessage>>,
}

impl IosQuickActionsApi for MemoryHost {
    fn set_shortcut_items(&self, items_list: Vec<ShortcutItemMessage>) -> Result<(), HandlerError> {
        *self.items.lock() = items_list;
        Ok(())
    }

    fn clear_shortcut_items(&self) -> Result<(), HandlerError> {
        Err(PigeonError::new("busy", None, None).into())
    }
}

#[derive(Default)]
struct RecordingApp {
    actions: Mutex<Vec<String>>,
}

impl IosQuickActionsFlutterApiHandler for RecordingApp {
    fn launch_action(&self, action: String) -> Result<(), HandlerError> {
        self.actions.lock().push(action);
        Ok(())
    }
}

/// Connected (host, app) pair on an ephemeral port
fn connected_pair() -> (Arc<SocketMessenger>, Arc<SocketMessenger>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let acceptor = thread::spawn(move || SocketMessenger::accept(&listener).unwrap());
    let app = SocketMessenger::connect(addr).unwrap();
    let host = acceptor.join().unwrap();

    (Arc::new(host), Arc::new(app))
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_set_shortcut_items_over_tcp() {
    let (host, app) = connected_pair();
    let store = Arc::new(MemoryHost::default());
    IosQuickActionsApiSetup::set_up(host.clone(), Some(store.clone()), "");

    let items = vec![
        ShortcutItemMessage::new("a", "B", None),
        ShortcutItemMessage::new("search", "Search", Some("search_icon".to_string())),
    ];
    let client = IosQuickActionsApiClient::new(app.clone(), "");
    client.set_shortcut_items_sync(&items).unwrap();
    assert_eq!(*store.items.lock(), items);

    let err = client.clear_shortcut_items_sync().unwrap_err();
    assert_eq!(err.code, "busy");
    assert_eq!(err.message, None);
}

#[test]
fn test_launch_action_over_tcp() {
    let (host, app) = connected_pair();
    let recorder = Arc::new(RecordingApp::default());
    IosQuickActionsFlutterApiSetup::set_up(app.clone(), Some(recorder.clone()), "sfx");

    let flutter_api = IosQuickActionsFlutterApi::new(host.clone(), "sfx");
    flutter_api.launch_action_sync("shortcut_1").unwrap();
    flutter_api.launch_action_sync("shortcut_2").unwrap();

    assert_eq!(
        *recorder.actions.lock(),
        vec!["shortcut_1".to_string(), "shortcut_2".to_string()]
    );
}

#[test]
fn test_unhandled_channel_over_tcp_is_connection_error() {
    let (host, _app) = connected_pair();

    let flutter_api = IosQuickActionsFlutterApi::new(host.clone(), "");
    let err = flutter_api.launch_action_sync("shortcut_1").unwrap_err();
    assert_eq!(err, PigeonError::connection(&flutter_api.launch_action_channel_name()));
}

#[test]
fn test_many_concurrent_calls_pair_with_their_replies() {
    let (host, app) = connected_pair();
    let recorder = Arc::new(RecordingApp::default());
    IosQuickActionsFlutterApiSetup::set_up(app.clone(), Some(recorder.clone()), "");

    let flutter_api = IosQuickActionsFlutterApi::new(host.clone(), "");
    let (tx, rx) = mpsc::channel();
    for i in 0..100 {
        let tx = tx.clone();
        flutter_api.launch_action(&format!("action_{i}"), move |result| {
            let _ = tx.send(result);
        });
    }
    drop(tx);

    let results: Vec<Result<(), PigeonError>> = rx.iter().take(100).collect();
    assert_eq!(results.len(), 100);
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(recorder.actions.lock().len(), 100);
}

#[test]
fn test_pending_calls_fail_when_peer_goes_away() {
    let (host, app) = connected_pair();

    // Handler yang tidak pernah menjawab; reply disimpan supaya tidak di-drop
    let parked = Arc::new(Mutex::new(Vec::new()));
    let sink = parked.clone();
    app.set_message_handler(
        "parked",
        Some(Arc::new(move |_message: Option<Vec<u8>>, reply: BinaryReply| {
            sink.lock().push(reply);
        })),
    );

    let (tx, rx) = mpsc::channel();
    host.send(
        "parked",
        Some(vec![1, 2, 3]),
        Some(Box::new(move |reply: Option<Vec<u8>>| {
            let _ = tx.send(reply);
        })),
    );
    assert!(wait_until(|| parked.lock().len() == 1));

    app.shutdown();
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), None);
    assert!(wait_until(|| !host.is_connected()));

    // Setelah putus, call baru langsung gagal
    let flutter_api = IosQuickActionsFlutterApi::new(host.clone(), "");
    let err = flutter_api.launch_action_sync("late").unwrap_err();
    assert_eq!(err.code, CHANNEL_ERROR_CODE);
}
