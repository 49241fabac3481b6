//! Inbound dispatch: decode args → invoke handler → reply
//!
//! Reply selalu salah satu dari:
//! - `[result]` untuk sukses
//! - `[code, message, details]` untuk error (termasuk panic di handler)

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error};

use super::error::{wrap_result, HandlerError};
use crate::core::{BasicMessageChannel, MessageReply};
use crate::protocol::{CodecError, MessagesCodec, Value};

/// Typed method body: positional args in, result value out
pub(crate) type Invoke = Arc<dyn Fn(Vec<Value>) -> Result<Value, HandlerError> + Send + Sync>;

/// Bind `invoke` to `channel`, or clear the channel when `invoke` is `None`.
pub(crate) fn bind(channel: &BasicMessageChannel<MessagesCodec>, invoke: Option<Invoke>) {
    let Some(invoke) = invoke else {
        channel.set_message_handler(None);
        return;
    };

    let name = channel.name().to_string();
    channel.set_message_handler(Some(Arc::new(
        move |message: Result<Value, CodecError>, reply: MessageReply<MessagesCodec>| {
            reply.send(dispatch(&name, &invoke, message));
        },
    )));
}

fn dispatch(channel: &str, invoke: &Invoke, message: Result<Value, CodecError>) -> Value {
    let outcome = match message.and_then(positional_args) {
        Ok(args) => panic::catch_unwind(AssertUnwindSafe(|| invoke(args)))
            .unwrap_or_else(|payload| Err(HandlerError::from_panic(payload))),
        Err(e) => Err(HandlerError::Decode(e)),
    };

    match outcome {
        Ok(result) => wrap_result(result),
        Err(HandlerError::Api(e)) => {
            debug!(channel, code = %e.code, "handler returned application error");
            HandlerError::Api(e).to_reply()
        }
        Err(e) => {
            error!(channel, error = %e, "handler failed");
            e.to_reply()
        }
    }
}

/// Calls without arguments arrive as `null`.
fn positional_args(message: Value) -> Result<Vec<Value>, CodecError> {
    match message {
        Value::List(args) => Ok(args),
        Value::Null => Ok(Vec::new()),
        other => Err(CodecError::TypeMismatch {
            expected: "list",
            found: other.kind(),
        }),
    }
}

/// Positional argument `index`, failing when the call has too few.
pub(crate) fn arg(args: &[Value], index: usize) -> Result<&Value, CodecError> {
    args.get(index).ok_or(CodecError::FieldCount {
        expected: index + 1,
        found: args.len(),
    })
}
