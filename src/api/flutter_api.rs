//! `IOSQuickActionsFlutterApi`: calls from the native host into the app.

use std::sync::Arc;

use super::dispatch::{self, arg, Invoke};
use super::error::{HandlerError, PigeonError};
use super::proxy::{self, Completion};
use super::{channel_name, FLUTTER_API_NAME};
use crate::core::{BasicMessageChannel, BinaryMessenger};
use crate::protocol::{messages_codec, required_string, MessagesCodec, Value};

pub const LAUNCH_ACTION: &str = "launchAction";

/// Proxy the native host uses to notify the app.
pub struct IosQuickActionsFlutterApi {
    messenger: Arc<dyn BinaryMessenger>,
    message_channel_suffix: String,
}

impl IosQuickActionsFlutterApi {
    pub fn new(messenger: Arc<dyn BinaryMessenger>, message_channel_suffix: &str) -> Self {
        Self {
            messenger,
            message_channel_suffix: message_channel_suffix.to_string(),
        }
    }

    pub fn launch_action_channel_name(&self) -> String {
        channel_name(FLUTTER_API_NAME, LAUNCH_ACTION, &self.message_channel_suffix)
    }

    /// Sends the shortcut `action` from the native platform to the app.
    ///
    /// `completion` fires exactly once.
    pub fn launch_action<F>(&self, action: &str, completion: F)
    where
        F: FnOnce(Result<(), PigeonError>) + Send + 'static,
    {
        let channel: BasicMessageChannel<MessagesCodec> = BasicMessageChannel::new(
            self.launch_action_channel_name(),
            Arc::clone(&self.messenger),
            messages_codec(),
        );
        proxy::send_void(&channel, Value::List(vec![Value::from(action)]), completion);
    }

    /// Blocking form of [`launch_action`](Self::launch_action).
    pub fn launch_action_sync(&self, action: &str) -> Result<(), PigeonError> {
        proxy::wait_for_completion(&self.launch_action_channel_name(), |done: Completion| {
            self.launch_action(action, done)
        })
    }
}

/// App-side handler of `launchAction`.
pub trait IosQuickActionsFlutterApiHandler: Send + Sync {
    fn launch_action(&self, action: String) -> Result<(), HandlerError>;
}

/// Binds an [`IosQuickActionsFlutterApiHandler`] to its channel.
pub struct IosQuickActionsFlutterApiSetup;

impl IosQuickActionsFlutterApiSetup {
    /// Register `api`, or clear the channel with `None`.
    pub fn set_up(
        messenger: Arc<dyn BinaryMessenger>,
        api: Option<Arc<dyn IosQuickActionsFlutterApiHandler>>,
        message_channel_suffix: &str,
    ) {
        let channel = BasicMessageChannel::new(
            channel_name(FLUTTER_API_NAME, LAUNCH_ACTION, message_channel_suffix),
            messenger,
            messages_codec(),
        );
        dispatch::bind(
            &channel,
            api.map(|api| -> Invoke {
                Arc::new(move |args: Vec<Value>| -> Result<Value, HandlerError> {
                    let action = arg(&args, 0)
                        .and_then(required_string)
                        .map_err(HandlerError::Decode)?;
                    api.launch_action(action)?;
                    Ok(Value::Null)
                })
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BinaryReply, LocalMessenger};
    use crate::protocol::MessageCodec;
    use parking_lot::Mutex;
    use std::sync::mpsc;

    #[test]
    fn test_launch_action_wire_message() {
        let messenger = Arc::new(LocalMessenger::new());
        let api = IosQuickActionsFlutterApi::new(messenger.clone(), "");
        let name = api.launch_action_channel_name();
        assert_eq!(
            name,
            "dev.flutter.pigeon.quick_actions_ios.IOSQuickActionsFlutterApi.launchAction"
        );

        let (seen_tx, seen_rx) = mpsc::channel();
        messenger.set_message_handler(
            &name,
            Some(Arc::new(move |message: Option<Vec<u8>>, reply: BinaryReply| {
                let codec = messages_codec();
                seen_tx
                    .send(codec.decode_message(message.as_deref()).unwrap())
                    .unwrap();
                reply(Some(codec.encode_message(&Value::List(vec![Value::Null])).unwrap()));
            })),
        );

        assert_eq!(api.launch_action_sync("shortcut_1"), Ok(()));
        assert_eq!(
            seen_rx.recv().unwrap(),
            Value::List(vec![Value::from("shortcut_1")])
        );
    }

    #[test]
    fn test_launch_action_without_counterpart() {
        let messenger = Arc::new(LocalMessenger::new());
        let api = IosQuickActionsFlutterApi::new(messenger, "sfx");
        let err = api.launch_action_sync("x").unwrap_err();
        assert_eq!(
            err,
            PigeonError::connection(
                "dev.flutter.pigeon.quick_actions_ios.IOSQuickActionsFlutterApi.launchAction.sfx"
            )
        );
    }

    struct Recorder(Mutex<Vec<String>>);

    impl IosQuickActionsFlutterApiHandler for Recorder {
        fn launch_action(&self, action: String) -> Result<(), HandlerError> {
            if action.is_empty() {
                return Err(PigeonError::new("empty", None, None).into());
            }
            self.0.lock().push(action);
            Ok(())
        }
    }

    #[test]
    fn test_handler_setup_roundtrip() {
        let messenger = Arc::new(LocalMessenger::new());
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        IosQuickActionsFlutterApiSetup::set_up(messenger.clone(), Some(recorder.clone()), "");

        let api = IosQuickActionsFlutterApi::new(messenger, "");
        api.launch_action_sync("compose").unwrap();
        assert_eq!(api.launch_action_sync("").unwrap_err().code, "empty");
        assert_eq!(*recorder.0.lock(), vec!["compose".to_string()]);
    }
}
