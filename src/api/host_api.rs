//! `IOSQuickActionsApi`: calls from the app handled by the native host.

use std::sync::Arc;

use super::dispatch::{self, arg, Invoke};
use super::error::{HandlerError, PigeonError};
use super::proxy::{self, Completion};
use super::{channel_name, HOST_API_NAME};
use crate::core::{BasicMessageChannel, BinaryMessenger};
use crate::protocol::{
    messages_codec, CodecError, CustomValue, MessagesCodec, ShortcutItemMessage, Value,
};

pub const SET_SHORTCUT_ITEMS: &str = "setShortcutItems";
pub const CLEAR_SHORTCUT_ITEMS: &str = "clearShortcutItems";

/// Handler of messages from the app, implemented by the native host.
pub trait IosQuickActionsApi: Send + Sync {
    /// Sets the dynamic shortcuts for the app.
    fn set_shortcut_items(&self, items_list: Vec<ShortcutItemMessage>) -> Result<(), HandlerError>;

    /// Removes all dynamic shortcuts.
    fn clear_shortcut_items(&self) -> Result<(), HandlerError>;
}

/// Binds an [`IosQuickActionsApi`] to its channels.
pub struct IosQuickActionsApiSetup;

impl IosQuickActionsApiSetup {
    /// Register `api` on every method channel, or clear them all with `None`.
    ///
    /// Calling again replaces the previous registration.
    pub fn set_up(
        messenger: Arc<dyn BinaryMessenger>,
        api: Option<Arc<dyn IosQuickActionsApi>>,
        message_channel_suffix: &str,
    ) {
        let codec = messages_codec();

        let set_channel = BasicMessageChannel::new(
            channel_name(HOST_API_NAME, SET_SHORTCUT_ITEMS, message_channel_suffix),
            Arc::clone(&messenger),
            codec,
        );
        dispatch::bind(
            &set_channel,
            api.clone().map(|api| -> Invoke {
                Arc::new(move |args: Vec<Value>| -> Result<Value, HandlerError> {
                    let items = arg(&args, 0)
                        .and_then(decode_items)
                        .map_err(HandlerError::Decode)?;
                    api.set_shortcut_items(items)?;
                    Ok(Value::Null)
                })
            }),
        );

        let clear_channel = BasicMessageChannel::new(
            channel_name(HOST_API_NAME, CLEAR_SHORTCUT_ITEMS, message_channel_suffix),
            messenger,
            codec,
        );
        dispatch::bind(
            &clear_channel,
            api.map(|api| -> Invoke {
                Arc::new(move |_args: Vec<Value>| -> Result<Value, HandlerError> {
                    api.clear_shortcut_items()?;
                    Ok(Value::Null)
                })
            }),
        );
    }
}

fn decode_items(value: &Value) -> Result<Vec<ShortcutItemMessage>, CodecError> {
    let Value::List(items) = value else {
        return Err(CodecError::TypeMismatch {
            expected: "list",
            found: value.kind(),
        });
    };

    items
        .iter()
        .map(|item| match item {
            Value::Custom(CustomValue::ShortcutItem(item)) => Ok(item.clone()),
            other => Err(CodecError::TypeMismatch {
                expected: "ShortcutItemMessage",
                found: other.kind(),
            }),
        })
        .collect()
}

/// App-side proxy for [`IosQuickActionsApi`].
pub struct IosQuickActionsApiClient {
    messenger: Arc<dyn BinaryMessenger>,
    message_channel_suffix: String,
}

impl IosQuickActionsApiClient {
    pub fn new(messenger: Arc<dyn BinaryMessenger>, message_channel_suffix: &str) -> Self {
        Self {
            messenger,
            message_channel_suffix: message_channel_suffix.to_string(),
        }
    }

    fn channel(&self, method: &str) -> BasicMessageChannel<MessagesCodec> {
        BasicMessageChannel::new(
            channel_name(HOST_API_NAME, method, &self.message_channel_suffix),
            Arc::clone(&self.messenger),
            messages_codec(),
        )
    }

    pub fn set_shortcut_items<F>(&self, items_list: &[ShortcutItemMessage], completion: F)
    where
        F: FnOnce(Result<(), PigeonError>) + Send + 'static,
    {
        let items = items_list.iter().cloned().map(Value::from).collect();
        let args = Value::List(vec![Value::List(items)]);
        proxy::send_void(&self.channel(SET_SHORTCUT_ITEMS), args, completion);
    }

    pub fn clear_shortcut_items<F>(&self, completion: F)
    where
        F: FnOnce(Result<(), PigeonError>) + Send + 'static,
    {
        proxy::send_void(&self.channel(CLEAR_SHORTCUT_ITEMS), Value::Null, completion);
    }

    /// Blocking form of [`set_shortcut_items`](Self::set_shortcut_items).
    pub fn set_shortcut_items_sync(
        &self,
        items_list: &[ShortcutItemMessage],
    ) -> Result<(), PigeonError> {
        let name = channel_name(HOST_API_NAME, SET_SHORTCUT_ITEMS, &self.message_channel_suffix);
        proxy::wait_for_completion(&name, |done: Completion| {
            self.set_shortcut_items(items_list, done)
        })
    }

    /// Blocking form of [`clear_shortcut_items`](Self::clear_shortcut_items).
    pub fn clear_shortcut_items_sync(&self) -> Result<(), PigeonError> {
        let name = channel_name(HOST_API_NAME, CLEAR_SHORTCUT_ITEMS, &self.message_channel_suffix);
        proxy::wait_for_completion(&name, |done: Completion| self.clear_shortcut_items(done))
    }
}
