//! Envelope framing untuk messenger traffic di atas TCP
//!
//! Layout (little-endian):
//! ┌──────────┬─────────┬─────────────────┬──────────────┐
//! │ kind u8  │ id u64  │ channel_len u16 │ channel utf8 │
//! ├──────────┴─────────┼─────────────────┼──────────────┤
//! │ has_payload u8     │ payload_len u32 │ payload      │
//! └────────────────────┴─────────────────┴──────────────┘
//!
//! Reply memakai `id` yang sama dengan message-nya, channel kosong.

use std::io;

/// Fixed bytes before the channel name
const PREFIX_SIZE: usize = 1 + 8 + 2;
/// Fixed bytes between channel name and payload
const PAYLOAD_HEADER_SIZE: usize = 1 + 4;

pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024; // 16MB max payload

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Call from the peer, expects exactly one reply
    Message = 1,
    /// Answer to an earlier message
    Reply = 2,
}

impl EnvelopeKind {
    #[inline(always)]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Message),
            2 => Some(Self::Reply),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub kind: EnvelopeKind,
    pub id: u64,
    pub channel: String,
    pub payload: Option<Vec<u8>>,
}

impl Envelope {
    pub fn message(id: u64, channel: &str, payload: Option<Vec<u8>>) -> Self {
        Self {
            kind: EnvelopeKind::Message,
            id,
            channel: channel.to_string(),
            payload,
        }
    }

    pub fn reply(id: u64, payload: Option<Vec<u8>>) -> Self {
        Self {
            kind: EnvelopeKind::Reply,
            id,
            channel: String::new(),
            payload,
        }
    }

    /// Append the encoded envelope to `out`
    pub fn encode_into(&self, out: &mut Vec<u8>) -> io::Result<()> {
        let channel_len = u16::try_from(self.channel.len())
            .map_err(|_| invalid("channel name too long"))?;
        let payload = self.payload.as_deref().unwrap_or(&[]);
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(invalid("payload too large"));
        }

        out.reserve(PREFIX_SIZE + self.channel.len() + PAYLOAD_HEADER_SIZE + payload.len());
        out.push(self.kind as u8);
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(&channel_len.to_le_bytes());
        out.extend_from_slice(self.channel.as_bytes());
        out.push(self.payload.is_some() as u8);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        Ok(())
    }

    /// Decode one envelope from the front of `buf`.
    ///
    /// Returns `Ok(None)` while the envelope is still incomplete, otherwise
    /// the envelope and the number of bytes it occupied.
    pub fn decode(buf: &[u8]) -> io::Result<Option<(Self, usize)>> {
        if buf.len() < PREFIX_SIZE {
            return Ok(None);
        }

        let kind = EnvelopeKind::from_u8(buf[0]).ok_or_else(|| invalid("unknown envelope kind"))?;
        let id = u64::from_le_bytes(buf[1..9].try_into().map_err(|_| invalid("bad id"))?);
        let channel_len = u16::from_le_bytes([buf[9], buf[10]]) as usize;

        let channel_end = PREFIX_SIZE + channel_len;
        let header_end = channel_end + PAYLOAD_HEADER_SIZE;
        if buf.len() < header_end {
            return Ok(None);
        }

        let has_payload = buf[channel_end] != 0;
        let payload_len = u32::from_le_bytes([
            buf[channel_end + 1],
            buf[channel_end + 2],
            buf[channel_end + 3],
            buf[channel_end + 4],
        ]) as usize;
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(invalid("payload too large"));
        }

        let total = header_end + payload_len;
        if buf.len() < total {
            return Ok(None);
        }

        let channel = std::str::from_utf8(&buf[PREFIX_SIZE..channel_end])
            .map_err(|_| invalid("channel name is not UTF-8"))?
            .to_string();
        let payload = has_payload.then(|| buf[header_end..total].to_vec());

        Ok(Some((
            Self {
                kind,
                id,
                channel,
                payload,
            },
            total,
        )))
    }
}

fn invalid(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_message() {
        let env = Envelope::message(7, "a.b", Some(vec![12, 0]));
        let mut buf = Vec::new();
        env.encode_into(&mut buf).unwrap();

        let (decoded, used) = Envelope::decode(&buf).unwrap().unwrap();
        assert_eq!(decoded, env);
        assert_eq!(used, buf.len());
    }

    #[test]
    fn test_reply_without_payload_differs_from_empty_payload() {
        let mut buf = Vec::new();
        Envelope::reply(1, None).encode_into(&mut buf).unwrap();
        Envelope::reply(2, Some(Vec::new())).encode_into(&mut buf).unwrap();

        let (first, used) = Envelope::decode(&buf).unwrap().unwrap();
        let (second, _) = Envelope::decode(&buf[used..]).unwrap().unwrap();
        assert_eq!(first.payload, None);
        assert_eq!(second.payload, Some(Vec::new()));
    }

    #[test]
    fn test_partial_envelope_waits_for_more() {
        let mut buf = Vec::new();
        Envelope::message(3, "channel", Some(vec![1, 2, 3]))
            .encode_into(&mut buf)
            .unwrap();
        for cut in 0..buf.len() {
            assert!(Envelope::decode(&buf[..cut]).unwrap().is_none());
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let buf = [9u8; 16];
        assert!(Envelope::decode(&buf).is_err());
    }
}
