//! Errors that cross the channel boundary
//!
//! Di wire, setiap kegagalan berbentuk list 3 elemen
//! `[code, message, details]`.

use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

use crate::protocol::{CodecError, Value};

/// Code of the error synthesized when a reply cannot be understood
pub const CHANNEL_ERROR_CODE: &str = "channel-error";

/// Code of the error replied when call arguments fail to decode
pub const DECODE_ERROR_CODE: &str = "decode-error";

/// Structured error passed between the two sides
#[derive(Debug, Clone, PartialEq)]
pub struct PigeonError {
    pub code: String,
    pub message: Option<String>,
    pub details: Option<Value>,
}

impl PigeonError {
    pub fn new(code: impl Into<String>, message: Option<String>, details: Option<Value>) -> Self {
        Self {
            code: code.into(),
            message,
            details,
        }
    }

    /// The reply on `channel_name` was absent or malformed
    pub fn connection(channel_name: &str) -> Self {
        Self::new(
            CHANNEL_ERROR_CODE,
            Some(format!(
                "Unable to establish connection on channel: '{channel_name}'."
            )),
            Some(Value::String(String::new())),
        )
    }

    fn to_list(&self) -> Vec<Value> {
        vec![
            Value::String(self.code.clone()),
            Value::from(self.message.clone()),
            self.details.clone().unwrap_or(Value::Null),
        ]
    }
}

impl fmt::Display for PigeonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PigeonError(code: {}, message: {}, details: ",
            self.code,
            self.message.as_deref().unwrap_or("<nil>")
        )?;
        match &self.details {
            Some(details) => write!(f, "{details:?})"),
            None => write!(f, "<nil>)"),
        }
    }
}

impl Error for PigeonError {}

/// What an API handler fails with
///
/// Any `std::error::Error` converts via `?`. A [`PigeonError`] stays an
/// application error; everything else becomes an unexpected fault carrying
/// its type name and a backtrace.
#[derive(Debug)]
pub enum HandlerError {
    Api(PigeonError),
    Decode(CodecError),
    Unexpected {
        description: String,
        type_name: &'static str,
        backtrace: String,
    },
}

impl HandlerError {
    /// Panic caught by `catch_unwind`.
    ///
    /// Unwinding sudah selesai di titik ini, jadi backtrace menunjuk ke
    /// catch boundary (dispatch), bukan ke lokasi panic. Lokasi panic
    /// tercetak oleh panic hook bawaan.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let description = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        HandlerError::Unexpected {
            description,
            type_name: "panic",
            backtrace: Backtrace::force_capture().to_string(),
        }
    }

    /// Wire form `[code, message, details]`
    pub fn to_reply(&self) -> Value {
        let fields = match self {
            HandlerError::Api(e) => e.to_list(),
            HandlerError::Decode(e) => vec![
                Value::from(DECODE_ERROR_CODE),
                Value::String(e.to_string()),
                Value::Null,
            ],
            HandlerError::Unexpected {
                description,
                type_name,
                backtrace,
            } => vec![
                Value::String(description.clone()),
                Value::from(*type_name),
                Value::String(format!("Stacktrace: {backtrace}")),
            ],
        };
        Value::List(fields)
    }
}

impl<E> From<E> for HandlerError
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(err);
        match boxed.downcast::<PigeonError>() {
            Ok(pigeon) => HandlerError::Api(*pigeon),
            Err(other) => HandlerError::Unexpected {
                description: other.to_string(),
                type_name: std::any::type_name::<E>(),
                backtrace: Backtrace::force_capture().to_string(),
            },
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Api(e) => fmt::Display::fmt(e, f),
            HandlerError::Decode(e) => write!(f, "argument decoding failed: {e}"),
            HandlerError::Unexpected {
                description,
                type_name,
                ..
            } => write!(f, "{type_name}: {description}"),
        }
    }
}

/// Success reply `[result]`
#[inline]
pub fn wrap_result(result: Value) -> Value {
    Value::List(vec![result])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn fail_with<E: Error + Send + Sync + 'static>(e: E) -> Result<(), HandlerError> {
        Err(e)?
    }

    #[test]
    fn test_pigeon_error_stays_application_error() {
        let err = fail_with(PigeonError::new(
            "E1",
            Some("boom".into()),
            Some(Value::Int(3)),
        ))
        .unwrap_err();
        assert_eq!(
            err.to_reply(),
            Value::List(vec![Value::from("E1"), Value::from("boom"), Value::Int(3)])
        );
    }

    #[test]
    fn test_other_errors_become_unexpected() {
        let err = fail_with(io::Error::new(io::ErrorKind::Other, "disk gone")).unwrap_err();
        let reply = err.to_reply();
        let fields = reply.as_list().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], Value::from("disk gone"));
        assert!(fields[1].as_str().unwrap().ends_with("io::error::Error"));
        assert!(fields[2].as_str().unwrap().starts_with("Stacktrace: "));
    }

    #[test]
    fn test_panic_payload() {
        let err = HandlerError::from_panic(Box::new("exploded"));
        let reply = err.to_reply();
        let fields = reply.as_list().unwrap();
        assert_eq!(fields[0], Value::from("exploded"));
        assert_eq!(fields[1], Value::from("panic"));
    }

    #[test]
    fn test_connection_error_names_channel() {
        let err = PigeonError::connection("a.b.c");
        assert_eq!(err.code, CHANNEL_ERROR_CODE);
        assert_eq!(
            err.message.as_deref(),
            Some("Unable to establish connection on channel: 'a.b.c'.")
        );
        assert_eq!(err.details, Some(Value::from("")));
    }

    #[test]
    fn test_display() {
        let err = PigeonError::new("E", None, None);
        assert_eq!(
            err.to_string(),
            "PigeonError(code: E, message: <nil>, details: <nil>)"
        );
    }
}
