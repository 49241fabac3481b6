//! API Layer: typed methods over named channels
//!
//! Nama channel: `dev.flutter.pigeon.quick_actions_ios.<Api>.<method>[.<suffix>]`.
//! Nama harus identik di kedua sisi.
//!
//! - `IosQuickActionsApi`: app → host (`setShortcutItems`, `clearShortcutItems`)
//! - `IosQuickActionsFlutterApi`: host → app (`launchAction`)

mod dispatch;
mod error;
mod flutter_api;
mod host_api;
mod proxy;

pub use error::{wrap_result, HandlerError, PigeonError, CHANNEL_ERROR_CODE, DECODE_ERROR_CODE};
pub use flutter_api::{
    IosQuickActionsFlutterApi, IosQuickActionsFlutterApiHandler, IosQuickActionsFlutterApiSetup,
    LAUNCH_ACTION,
};
pub use host_api::{
    IosQuickActionsApi, IosQuickActionsApiClient, IosQuickActionsApiSetup, CLEAR_SHORTCUT_ITEMS,
    SET_SHORTCUT_ITEMS,
};
pub use proxy::{parse_void_reply, Completion};

/// Namespace shared by every quick-actions channel
pub const CHANNEL_NAMESPACE: &str = "dev.flutter.pigeon.quick_actions_ios";

pub const HOST_API_NAME: &str = "IOSQuickActionsApi";
pub const FLUTTER_API_NAME: &str = "IOSQuickActionsFlutterApi";

/// Full channel name; an empty `suffix` adds nothing.
pub fn channel_name(api: &str, method: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        format!("{CHANNEL_NAMESPACE}.{api}.{method}")
    } else {
        format!("{CHANNEL_NAMESPACE}.{api}.{method}.{suffix}")
    }
}
