use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result, RtpSsrc};

/// End-of-item-list marker inside an SDES chunk
const SDES_END: u8 = 0;

/// RTCP Source Description (SDES) item types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SdesItemType {
    /// Canonical name (CNAME)
    Cname = 1,

    /// User name (NAME)
    Name = 2,

    /// E-mail address (EMAIL)
    Email = 3,

    /// Phone number (PHONE)
    Phone = 4,

    /// Geographic location (LOC)
    Location = 5,

    /// Application or tool name (TOOL)
    Tool = 6,

    /// Notice/status (NOTE)
    Note = 7,

    /// Private extensions (PRIV)
    Private = 8,
}

impl TryFrom<u8> for SdesItemType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(SdesItemType::Cname),
            2 => Ok(SdesItemType::Name),
            3 => Ok(SdesItemType::Email),
            4 => Ok(SdesItemType::Phone),
            5 => Ok(SdesItemType::Location),
            6 => Ok(SdesItemType::Tool),
            7 => Ok(SdesItemType::Note),
            8 => Ok(SdesItemType::Private),
            _ => Err(Error::Rtcp(format!("unknown SDES item type: {}", value))),
        }
    }
}

/// A single SDES item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdesItem {
    /// Item type
    pub item_type: SdesItemType,

    /// Item value
    pub value: String,
}

impl SdesItem {
    /// Create a new SDES item
    pub fn new(item_type: SdesItemType, value: impl Into<String>) -> Self {
        Self { item_type, value: value.into() }
    }

    /// Create a CNAME item
    pub fn cname(value: impl Into<String>) -> Self {
        Self::new(SdesItemType::Cname, value)
    }

    /// Create a NAME item
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(SdesItemType::Name, value)
    }

    /// Create an EMAIL item
    pub fn email(value: impl Into<String>) -> Self {
        Self::new(SdesItemType::Email, value)
    }

    /// Create a PHONE item
    pub fn phone(value: impl Into<String>) -> Self {
        Self::new(SdesItemType::Phone, value)
    }

    /// Create a LOCATION item
    pub fn location(value: impl Into<String>) -> Self {
        Self::new(SdesItemType::Location, value)
    }

    /// Create a TOOL item
    pub fn tool(value: impl Into<String>) -> Self {
        Self::new(SdesItemType::Tool, value)
    }

    /// Create a NOTE item
    pub fn note(value: impl Into<String>) -> Self {
        Self::new(SdesItemType::Note, value)
    }
}

/// Per-source chunk of an SDES packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdesChunk {
    /// SSRC the items describe
    pub ssrc: RtpSsrc,

    /// SDES items
    pub items: Vec<SdesItem>,
}

impl SdesChunk {
    /// Create an empty chunk for the given source
    pub fn new(ssrc: RtpSsrc) -> Self {
        Self { ssrc, items: Vec::new() }
    }

    /// Value of the first item of the given type, if present
    pub fn value_of(&self, item_type: SdesItemType) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.item_type == item_type)
            .map(|item| item.value.as_str())
    }

    /// CNAME carried by this chunk, if any
    pub fn cname(&self) -> Option<&str> {
        self.value_of(SdesItemType::Cname)
    }
}

/// RTCP Source Description (SDES) packet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDescriptionPacket {
    /// SDES chunks, one per described source
    pub chunks: Vec<SdesChunk>,
}

impl SourceDescriptionPacket {
    /// Create an empty SDES packet
    pub fn new() -> Self {
        Self::default()
    }

    /// Packet carrying a single chunk
    pub fn with_chunk(chunk: SdesChunk) -> Self {
        Self { chunks: vec![chunk] }
    }

    pub(crate) fn serialize_body(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::new();
        for chunk in &self.chunks {
            buf.put_u32(chunk.ssrc);
            for item in &chunk.items {
                if item.value.len() > 255 {
                    return Err(Error::Rtcp(format!(
                        "SDES item value too long: {} bytes",
                        item.value.len()
                    )));
                }
                buf.put_u8(item.item_type as u8);
                buf.put_u8(item.value.len() as u8);
                buf.put_slice(item.value.as_bytes());
            }
            buf.put_u8(SDES_END);

            // Each chunk ends on a 32-bit boundary.
            while buf.len() % 4 != 0 {
                buf.put_u8(0);
            }
        }
        Ok(buf)
    }
}

pub(crate) fn parse_source_description(body: &[u8], chunk_count: u8) -> Result<SourceDescriptionPacket> {
    let mut buf = Bytes::copy_from_slice(body);
    let total = buf.remaining();
    let mut chunks = Vec::with_capacity(chunk_count as usize);

    for _ in 0..chunk_count {
        if buf.remaining() < 4 {
            return Err(Error::BufferTooSmall { required: 4, available: buf.remaining() });
        }
        let mut chunk = SdesChunk::new(buf.get_u32());

        loop {
            if !buf.has_remaining() {
                return Err(Error::Rtcp("SDES chunk missing end marker".to_string()));
            }
            let raw_type = buf.get_u8();
            if raw_type == SDES_END {
                break;
            }
            if !buf.has_remaining() {
                return Err(Error::Rtcp("SDES item missing length".to_string()));
            }
            let len = buf.get_u8() as usize;
            if buf.remaining() < len {
                return Err(Error::BufferTooSmall { required: len, available: buf.remaining() });
            }
            let value = String::from_utf8_lossy(&buf[..len]).into_owned();
            buf.advance(len);

            match SdesItemType::try_from(raw_type) {
                Ok(item_type) => chunk.items.push(SdesItem { item_type, value }),
                // Items of unassigned types are skipped, not fatal.
                Err(_) => continue,
            }
        }

        // Consume the chunk's padding up to the next 32-bit boundary.
        while (total - buf.remaining()) % 4 != 0 && buf.has_remaining() {
            buf.advance(1);
        }

        chunks.push(chunk);
    }

    Ok(SourceDescriptionPacket { chunks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ControlPacket;

    #[test]
    fn test_chunk_value_lookup() {
        let mut chunk = SdesChunk::new(0x12345678);
        chunk.items.push(SdesItem::cname("user@example.com"));
        chunk.items.push(SdesItem::tool("efflux/0.1.0"));

        assert_eq!(chunk.cname(), Some("user@example.com"));
        assert_eq!(chunk.value_of(SdesItemType::Tool), Some("efflux/0.1.0"));
        assert_eq!(chunk.value_of(SdesItemType::Email), None);
    }

    #[test]
    fn test_sdes_roundtrip() {
        let mut chunk1 = SdesChunk::new(0x12345678);
        chunk1.items.push(SdesItem::cname("alice@host"));
        chunk1.items.push(SdesItem::name("Alice"));
        chunk1.items.push(SdesItem::note("on a call"));

        let mut chunk2 = SdesChunk::new(0xabcdef01);
        chunk2.items.push(SdesItem::cname("bob@host"));

        let original = SourceDescriptionPacket { chunks: vec![chunk1, chunk2] };
        let raw = ControlPacket::SourceDescription(original.clone()).serialize().unwrap();

        match ControlPacket::parse(&raw).unwrap() {
            ControlPacket::SourceDescription(parsed) => assert_eq!(parsed, original),
            other => panic!("expected SDES, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_skips_unassigned_item_types() {
        let mut body = BytesMut::new();
        body.put_u32(0x42);
        body.put_u8(9); // unassigned type
        body.put_u8(2);
        body.put_slice(b"xx");
        body.put_u8(1); // CNAME
        body.put_u8(1);
        body.put_slice(b"a");
        body.put_u8(0); // END
        while body.len() % 4 != 0 {
            body.put_u8(0);
        }

        let parsed = parse_source_description(&body, 1).unwrap();
        assert_eq!(parsed.chunks.len(), 1);
        assert_eq!(parsed.chunks[0].items.len(), 1);
        assert_eq!(parsed.chunks[0].cname(), Some("a"));
    }
}
