//! Outbound calls and reply interpretation
//!
//! Aturan reply (harus sama persis dengan sisi lawan):
//! - bukan list        → connection error (`channel-error`)
//! - list > 1 elemen   → `[code, message, details]`
//! - list 0/1 elemen   → sukses

use std::sync::mpsc;

use tracing::warn;

use super::error::PigeonError;
use crate::core::BasicMessageChannel;
use crate::protocol::{CodecError, MessagesCodec, Value};

/// Single-shot completion of an outbound call
pub type Completion = Box<dyn FnOnce(Result<(), PigeonError>) + Send + 'static>;

/// Send `args` on `channel`; `completion` fires exactly once.
pub(crate) fn send_void<F>(channel: &BasicMessageChannel<MessagesCodec>, args: Value, completion: F)
where
    F: FnOnce(Result<(), PigeonError>) + Send + 'static,
{
    let name = channel.name().to_string();
    channel.send_message(&args, move |reply| completion(parse_void_reply(&name, reply)));
}

/// Interpret a decoded reply of a method without a return value.
pub fn parse_void_reply(
    channel_name: &str,
    reply: Result<Value, CodecError>,
) -> Result<(), PigeonError> {
    let list = match reply {
        Ok(Value::List(list)) => list,
        Ok(_) => return Err(PigeonError::connection(channel_name)),
        Err(e) => {
            warn!(channel = channel_name, error = %e, "undecodable reply");
            return Err(PigeonError::connection(channel_name));
        }
    };

    if list.len() <= 1 {
        return Ok(());
    }

    let mut fields = list.into_iter();
    let code = match fields.next() {
        Some(Value::String(code)) => code,
        other => {
            warn!(
                channel = channel_name,
                found = other.as_ref().map_or("nothing", |v| v.kind()),
                "error reply without a string code"
            );
            return Err(PigeonError::connection(channel_name));
        }
    };
    let message = match fields.next() {
        Some(Value::String(message)) => Some(message),
        _ => None,
    };
    let details = fields.next().filter(|d| !d.is_null());

    Err(PigeonError::new(code, message, details))
}

/// Run an outbound call and wait for its completion.
///
/// A completion that is dropped unfired (the transport went away) yields a
/// connection error.
pub(crate) fn wait_for_completion(
    channel_name: &str,
    start: impl FnOnce(Completion),
) -> Result<(), PigeonError> {
    let (tx, rx) = mpsc::sync_channel(1);
    start(Box::new(move |result| {
        let _ = tx.send(result);
    }));
    rx.recv()
        .unwrap_or_else(|_| Err(PigeonError::connection(channel_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "dev.flutter.pigeon.test.Api.method";

    #[test]
    fn test_null_reply_in_list_is_success() {
        assert_eq!(parse_void_reply(NAME, Ok(Value::List(vec![Value::Null]))), Ok(()));
        assert_eq!(parse_void_reply(NAME, Ok(Value::List(vec![]))), Ok(()));
    }

    #[test]
    fn test_three_elements_is_error() {
        let reply = Value::List(vec![Value::from("E"), Value::from("msg"), Value::from("d")]);
        let err = parse_void_reply(NAME, Ok(reply)).unwrap_err();
        assert_eq!(err.code, "E");
        assert_eq!(err.message.as_deref(), Some("msg"));
        assert_eq!(err.details, Some(Value::from("d")));
    }

    #[test]
    fn test_two_elements_is_error_without_details() {
        let reply = Value::List(vec![Value::from("E"), Value::Null]);
        let err = parse_void_reply(NAME, Ok(reply)).unwrap_err();
        assert_eq!(err, PigeonError::new("E", None, None));
    }

    #[test]
    fn test_non_list_is_connection_error() {
        for reply in [Ok(Value::Null), Ok(Value::from("x")), Err(CodecError::UnexpectedEof)] {
            let err = parse_void_reply(NAME, reply).unwrap_err();
            assert_eq!(err, PigeonError::connection(NAME));
        }
    }

    #[test]
    fn test_error_without_string_code_is_connection_error() {
        let reply = Value::List(vec![Value::Int(500), Value::from("m"), Value::Null]);
        let err = parse_void_reply(NAME, Ok(reply)).unwrap_err();
        assert_eq!(err, PigeonError::connection(NAME));
    }

    #[test]
    fn test_dropped_completion_is_connection_error() {
        let result = wait_for_completion(NAME, drop);
        assert_eq!(result, Err(PigeonError::connection(NAME)));
    }
}
