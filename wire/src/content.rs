use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
}

impl ContentType {
    pub fn from_u8(v: u8) -> Result<Self, Error> {
        match v {
            20 => Ok(ContentType::ChangeCipherSpec),
            21 => Ok(ContentType::Alert),
            22 => Ok(ContentType::Handshake),
            23 => Ok(ContentType::ApplicationData),
            _ => Err(Error::InvalidContentType(v)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match *self {
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

pub const PROTOCOL_VERSION1_0: ProtocolVersion = ProtocolVersion { major: 0xfe, minor: 0xff };
pub const PROTOCOL_VERSION1_2: ProtocolVersion = ProtocolVersion { major: 0xfe, minor: 0xfd };

/// The ChangeCipherSpec protocol exists to signal transitions in ciphering
/// strategies. The message consists of a single byte of value 1 encrypted
/// and compressed under the current (not the pending) connection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeCipherSpec {}

impl ChangeCipherSpec {
    pub fn marshal(&self) -> Vec<u8> {
        vec![0x01]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() == 1 && data[0] == 0x01 {
            Ok(ChangeCipherSpec {})
        } else {
            Err(Error::InvalidCipherSpec)
        }
    }
}
