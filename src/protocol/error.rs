/// Errors that can occur while encoding or decoding messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Unexpected end of message")]
    UnexpectedEof,

    #[error("Unknown value type: {0}")]
    UnknownType(u8),

    #[error("Invalid UTF-8 in string value")]
    InvalidUtf8,

    #[error("Message corrupted: {0} trailing bytes")]
    TrailingBytes(usize),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field count mismatch: expected {expected}, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Value cannot be encoded by this codec: {0}")]
    UnsupportedValue(&'static str),

    #[error("Size {0} exceeds the u32 size limit")]
    SizeOverflow(usize),

    #[error("Nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}
