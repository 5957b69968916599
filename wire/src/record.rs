use byteorder::{BigEndian, ByteOrder};

use alert::Alert;
use content::{ChangeCipherSpec, ContentType, ProtocolVersion, PROTOCOL_VERSION1_2};
use error::Error;
use handshake::Handshake;

pub const RECORD_LAYER_HEADER_SIZE: usize = 13;

// The sequence number is a 48-bit field on the wire. The implementation
// must either abandon an association or rehandshake prior to allowing the
// sequence number to wrap.
pub const MAX_SEQUENCE_NUMBER: u64 = 0x0000_ffff_ffff_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayerHeader {
    pub content_type: ContentType,
    pub protocol_version: ProtocolVersion,
    pub epoch: u16,
    // u48 on the wire
    pub sequence_number: u64,
    pub content_len: u16,
}

impl RecordLayerHeader {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        if self.sequence_number > MAX_SEQUENCE_NUMBER {
            return Err(Error::SequenceNumberOverflow);
        }

        let mut out = vec![0u8; RECORD_LAYER_HEADER_SIZE];
        out[0] = self.content_type.as_u8();
        out[1] = self.protocol_version.major;
        out[2] = self.protocol_version.minor;
        BigEndian::write_u16(&mut out[3..5], self.epoch);
        BigEndian::write_uint(&mut out[5..11], self.sequence_number, 6);
        BigEndian::write_u16(&mut out[11..13], self.content_len);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < RECORD_LAYER_HEADER_SIZE {
            return Err(Error::BufferTooSmall);
        }

        Ok(RecordLayerHeader {
            content_type: ContentType::from_u8(data[0])?,
            protocol_version: ProtocolVersion {
                major: data[1],
                minor: data[2],
            },
            epoch: BigEndian::read_u16(&data[3..5]),
            sequence_number: BigEndian::read_uint(&data[5..11], 6),
            content_len: BigEndian::read_u16(&data[11..13]),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    ChangeCipherSpec(ChangeCipherSpec),
    Alert(Alert),
    Handshake(Handshake),
}

impl Content {
    pub fn content_type(&self) -> ContentType {
        match *self {
            Content::ChangeCipherSpec(_) => ContentType::ChangeCipherSpec,
            Content::Alert(_) => ContentType::Alert,
            Content::Handshake(_) => ContentType::Handshake,
        }
    }

    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        match self {
            &Content::ChangeCipherSpec(ref c) => Ok(c.marshal()),
            &Content::Alert(ref a) => Ok(a.marshal()),
            &Content::Handshake(ref h) => h.marshal(),
        }
    }
}

/// A record layer message wrapping one piece of content. The record header
/// length field is filled from the marshaled content.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayer {
    pub record_layer_header: RecordLayerHeader,
    pub content: Content,
}

impl RecordLayer {
    pub fn new(protocol_version: ProtocolVersion, epoch: u16, content: Content) -> Self {
        RecordLayer {
            record_layer_header: RecordLayerHeader {
                content_type: content.content_type(),
                protocol_version,
                epoch,
                sequence_number: 0,
                content_len: 0,
            },
            content,
        }
    }

    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        let body = self.content.marshal()?;

        let mut header = self.record_layer_header;
        header.content_type = self.content.content_type();
        header.content_len = body.len() as u16;

        let mut out = header.marshal()?;
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        let header = RecordLayerHeader::unmarshal(data)?;
        let body = &data[RECORD_LAYER_HEADER_SIZE..];

        let content = match header.content_type {
            ContentType::ChangeCipherSpec => {
                Content::ChangeCipherSpec(ChangeCipherSpec::unmarshal(body)?)
            }
            ContentType::Alert => Content::Alert(Alert::unmarshal(body)?),
            ContentType::Handshake => Content::Handshake(Handshake::unmarshal(body)?),
            ContentType::ApplicationData => return Err(Error::NotImplemented),
        };

        Ok(RecordLayer {
            record_layer_header: header,
            content,
        })
    }
}

impl Default for RecordLayerHeader {
    fn default() -> Self {
        RecordLayerHeader {
            content_type: ContentType::Handshake,
            protocol_version: PROTOCOL_VERSION1_2,
            epoch: 0,
            sequence_number: 0,
            content_len: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = RecordLayerHeader {
            content_type: ContentType::Handshake,
            protocol_version: PROTOCOL_VERSION1_2,
            epoch: 3,
            sequence_number: 0x0000_0102_0304_0506,
            content_len: 0x1234,
        };

        let raw = header.marshal().unwrap();
        assert_eq!(raw.len(), RECORD_LAYER_HEADER_SIZE);
        assert_eq!(RecordLayerHeader::unmarshal(&raw).unwrap(), header);
    }

    #[test]
    fn header_wire_layout() {
        let header = RecordLayerHeader {
            content_type: ContentType::Handshake,
            protocol_version: PROTOCOL_VERSION1_2,
            epoch: 0,
            sequence_number: 18,
            content_len: 0,
        };

        let raw = header.marshal().unwrap();
        assert_eq!(raw, hex!("16fefd00000000000000120000").to_vec());
    }

    #[test]
    fn sequence_number_overflow() {
        let header = RecordLayerHeader {
            sequence_number: MAX_SEQUENCE_NUMBER + 1,
            ..Default::default()
        };
        assert_eq!(header.marshal(), Err(Error::SequenceNumberOverflow));
    }
}
