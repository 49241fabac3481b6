//! Quick Actions Bridge - typed RPC over named binary message channels
//!
//! Arsitektur:
//! - `protocol`: standard tagged binary format + custom type `ShortcutItemMessage` (tag 129)
//! - `core`: `BinaryMessenger` abstraction, handler registry, `BasicMessageChannel`
//! - `api`: `IOSQuickActionsApi` (app → host) dan `IOSQuickActionsFlutterApi` (host → app)
//! - `network`: `SocketMessenger`, messenger yang sama di atas TCP

pub mod api;
pub mod core;
pub mod network;
pub mod protocol;
