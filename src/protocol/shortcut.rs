//! Custom types carried by the quick-actions channels
//!
//! Format custom value:
//! ┌───────────┬─────────────────────────────────────────┐
//! │ tag (129) │ standard list [type, localizedTitle,    │
//! │           │                icon-or-null]            │
//! └───────────┴─────────────────────────────────────────┘

use super::codec::{read_standard, write_standard, ReaderWriter, StandardMessageCodec};
use super::encoder::{Decoder, Encoder};
use super::error::CodecError;
use super::value::Value;

/// Reserved tag for [`ShortcutItemMessage`]
pub const SHORTCUT_ITEM_TAG: u8 = 129;

/// Home screen quick-action shortcut item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutItemMessage {
    /// Identifier of this item; should be unique within the app.
    pub r#type: String,
    /// Localized title of the item.
    pub localized_title: String,
    /// Name of the native resource displayed as the icon.
    pub icon: Option<String>,
}

impl ShortcutItemMessage {
    const FIELD_COUNT: usize = 3;

    pub fn new(
        r#type: impl Into<String>,
        localized_title: impl Into<String>,
        icon: Option<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            localized_title: localized_title.into(),
            icon,
        }
    }

    pub fn to_list(&self) -> Vec<Value> {
        vec![
            Value::String(self.r#type.clone()),
            Value::String(self.localized_title.clone()),
            Value::from(self.icon.clone()),
        ]
    }

    /// Field count and types must match exactly; nothing is defaulted.
    pub fn from_list(list: &[Value]) -> Result<Self, CodecError> {
        if list.len() != Self::FIELD_COUNT {
            return Err(CodecError::FieldCount {
                expected: Self::FIELD_COUNT,
                found: list.len(),
            });
        }

        Ok(Self {
            r#type: required_string(&list[0])?,
            localized_title: required_string(&list[1])?,
            icon: optional_string(&list[2])?,
        })
    }
}

pub(crate) fn required_string(value: &Value) -> Result<String, CodecError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(CodecError::TypeMismatch {
            expected: "string",
            found: other.kind(),
        }),
    }
}

pub(crate) fn optional_string(value: &Value) -> Result<Option<String>, CodecError> {
    match value {
        Value::Null => Ok(None),
        other => required_string(other).map(Some),
    }
}

/// Every custom type known to [`MessagesCodec`]
#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
    ShortcutItem(ShortcutItemMessage),
}

impl CustomValue {
    pub fn tag(&self) -> u8 {
        match self {
            CustomValue::ShortcutItem(_) => SHORTCUT_ITEM_TAG,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CustomValue::ShortcutItem(_) => "ShortcutItemMessage",
        }
    }

    fn to_list(&self) -> Vec<Value> {
        match self {
            CustomValue::ShortcutItem(item) => item.to_list(),
        }
    }

    /// `None` when `tag` belongs to no custom type.
    fn from_tagged(tag: u8, fields: &Value) -> Option<Result<Self, CodecError>> {
        let decode = match tag {
            SHORTCUT_ITEM_TAG => |list: &[Value]| {
                ShortcutItemMessage::from_list(list).map(CustomValue::ShortcutItem)
            },
            _ => return None,
        };

        Some(match fields {
            Value::List(list) => decode(list),
            other => Err(CodecError::TypeMismatch {
                expected: "list",
                found: other.kind(),
            }),
        })
    }
}

impl From<ShortcutItemMessage> for Value {
    fn from(item: ShortcutItemMessage) -> Self {
        Value::Custom(CustomValue::ShortcutItem(item))
    }
}

/// Standard reader/writer plus the quick-actions custom types
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagesReaderWriter;

impl ReaderWriter for MessagesReaderWriter {
    fn write_value(&self, enc: &mut Encoder, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Custom(custom) => {
                enc.write_u8(custom.tag());
                self.write_value(enc, &Value::List(custom.to_list()))
            }
            other => write_standard(self, enc, other),
        }
    }

    fn read_value_of_type(&self, tag: u8, dec: &mut Decoder<'_>) -> Result<Value, CodecError> {
        if tag < super::message::FIRST_CUSTOM_TAG {
            return read_standard(self, tag, dec);
        }
        dec.enter()?;
        let fields = self.read_value(dec)?;
        dec.leave();
        match CustomValue::from_tagged(tag, &fields) {
            Some(custom) => custom.map(Value::Custom),
            None => Err(CodecError::UnknownType(tag)),
        }
    }
}

/// Codec shared by every quick-actions channel
pub type MessagesCodec = StandardMessageCodec<MessagesReaderWriter>;

pub const fn messages_codec() -> MessagesCodec {
    StandardMessageCodec::new(MessagesReaderWriter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MessageCodec;

    fn item(icon: Option<&str>) -> ShortcutItemMessage {
        ShortcutItemMessage::new("action_one", "Action one", icon.map(str::to_string))
    }

    #[test]
    fn test_shortcut_roundtrip_with_and_without_icon() {
        let codec = messages_codec();
        for original in [item(None), item(Some("AppIcon"))] {
            let bytes = codec.encode_message(&original.clone().into()).unwrap();
            let decoded = codec.decode_message(Some(&bytes)).unwrap();
            assert_eq!(decoded, Value::from(original));
        }
    }

    #[test]
    fn test_wire_layout() {
        let bytes = messages_codec()
            .encode_message(&ShortcutItemMessage::new("a", "B", None).into())
            .unwrap();
        assert_eq!(bytes, vec![129, 12, 3, 7, 1, b'a', 7, 1, b'B', 0]);
    }

    #[test]
    fn test_tag_always_decodes_as_shortcut_item() {
        let bytes = [129, 12, 3, 7, 1, b'x', 7, 0, 7, 1, b'i'];
        let decoded = messages_codec().decode_message(Some(&bytes)).unwrap();
        assert!(matches!(decoded, Value::Custom(CustomValue::ShortcutItem(_))));
    }

    #[test]
    fn test_nested_items_in_list() {
        let msg = Value::List(vec![Value::List(vec![
            item(None).into(),
            item(Some("star")).into(),
        ])]);
        let codec = messages_codec();
        let bytes = codec.encode_message(&msg).unwrap();
        assert_eq!(codec.decode_message(Some(&bytes)).unwrap(), msg);
    }

    #[test]
    fn test_from_list_rejects_bad_shapes() {
        assert_eq!(
            ShortcutItemMessage::from_list(&[Value::from("a")]),
            Err(CodecError::FieldCount {
                expected: 3,
                found: 1
            })
        );
        assert_eq!(
            ShortcutItemMessage::from_list(&[Value::Null, Value::from("t"), Value::Null]),
            Err(CodecError::TypeMismatch {
                expected: "string",
                found: "null"
            })
        );
        assert_eq!(
            ShortcutItemMessage::from_list(&[Value::from("a"), Value::from("t"), Value::Int(1)]),
            Err(CodecError::TypeMismatch {
                expected: "string",
                found: "int"
            })
        );
    }

    #[test]
    fn test_unknown_custom_tag() {
        let bytes = [130, 0];
        assert_eq!(
            messages_codec().decode_message(Some(&bytes)),
            Err(CodecError::UnknownType(130))
        );
    }

    #[test]
    fn test_chained_custom_tags_hit_nesting_limit() {
        let mut bytes = vec![SHORTCUT_ITEM_TAG; 10_000];
        bytes.push(0);
        assert_eq!(
            messages_codec().decode_message(Some(&bytes)),
            Err(CodecError::NestingTooDeep(crate::protocol::MAX_NESTING_DEPTH))
        );
    }

    #[test]
    fn test_standard_codec_rejects_custom_values() {
        let codec: crate::protocol::StandardMessageCodec = Default::default();
        assert_eq!(
            codec.encode_message(&item(None).into()),
            Err(CodecError::UnsupportedValue("ShortcutItemMessage"))
        );
    }
}
