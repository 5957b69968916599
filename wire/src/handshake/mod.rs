use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use error::Error;

mod client_hello;
mod server_hello;
mod hello_verify_request;
mod certificate;
mod server_key_exchange;
mod certificate_request;
mod server_hello_done;
mod client_key_exchange;
mod certificate_verify;
mod finished;

pub use self::certificate::Certificate;
pub use self::certificate_request::{CertificateRequest, ClientCertificateType};
pub use self::certificate_verify::CertificateVerify;
pub use self::client_hello::ClientHello;
pub use self::client_key_exchange::ClientKeyExchange;
pub use self::finished::Finished;
pub use self::hello_verify_request::HelloVerifyRequest;
pub use self::server_hello::ServerHello;
pub use self::server_hello_done::ServerHelloDone;
pub use self::server_key_exchange::ServerKeyExchange;

#[cfg(test)]
mod handshake_test;

// msg_len for handshake messages assumes an extra 12 bytes for sequence,
// fragment and version information.
pub const HANDSHAKE_HEADER_LENGTH: usize = 12;

/// The unique identifier for each handshake message.
/// https://tools.ietf.org/html/rfc5246#section-7.4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeType {
    HelloRequest,
    ClientHello,
    ServerHello,
    HelloVerifyRequest,
    Certificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    Finished,
}

impl HandshakeType {
    pub fn from_u8(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(HandshakeType::HelloRequest),
            1 => Ok(HandshakeType::ClientHello),
            2 => Ok(HandshakeType::ServerHello),
            3 => Ok(HandshakeType::HelloVerifyRequest),
            11 => Ok(HandshakeType::Certificate),
            12 => Ok(HandshakeType::ServerKeyExchange),
            13 => Ok(HandshakeType::CertificateRequest),
            14 => Ok(HandshakeType::ServerHelloDone),
            15 => Ok(HandshakeType::CertificateVerify),
            16 => Ok(HandshakeType::ClientKeyExchange),
            20 => Ok(HandshakeType::Finished),
            _ => Err(Error::NotImplemented),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match *self {
            HandshakeType::HelloRequest => 0,
            HandshakeType::ClientHello => 1,
            HandshakeType::ServerHello => 2,
            HandshakeType::HelloVerifyRequest => 3,
            HandshakeType::Certificate => 11,
            HandshakeType::ServerKeyExchange => 12,
            HandshakeType::CertificateRequest => 13,
            HandshakeType::ServerHelloDone => 14,
            HandshakeType::CertificateVerify => 15,
            HandshakeType::ClientKeyExchange => 16,
            HandshakeType::Finished => 20,
        }
    }
}

impl fmt::Display for HandshakeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HandshakeType::HelloRequest => write!(f, "HelloRequest"),
            HandshakeType::ClientHello => write!(f, "ClientHello"),
            HandshakeType::ServerHello => write!(f, "ServerHello"),
            HandshakeType::HelloVerifyRequest => write!(f, "HelloVerifyRequest"),
            HandshakeType::Certificate => write!(f, "Certificate"),
            HandshakeType::ServerKeyExchange => write!(f, "ServerKeyExchange"),
            HandshakeType::CertificateRequest => write!(f, "CertificateRequest"),
            HandshakeType::ServerHelloDone => write!(f, "ServerHelloDone"),
            HandshakeType::CertificateVerify => write!(f, "CertificateVerify"),
            HandshakeType::ClientKeyExchange => write!(f, "ClientKeyExchange"),
            HandshakeType::Finished => write!(f, "Finished"),
        }
    }
}

// read_u24 reads a big-endian 24 bit unsigned integer.
pub fn read_u24(data: &[u8]) -> u32 {
    (u32::from(data[0]) << 16) | (u32::from(data[1]) << 8) | u32::from(data[2])
}

// write_u24 writes a big-endian 24 bit unsigned integer.
pub fn write_u24(out: &mut [u8], v: u32) {
    out[0] = (v >> 16) as u8;
    out[1] = (v >> 8) as u8;
    out[2] = v as u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeHeader {
    pub handshake_type: HandshakeType,
    // u24 in spec
    pub length: u32,
    pub message_sequence: u16,
    // u24 in spec
    pub fragment_offset: u32,
    // u24 in spec
    pub fragment_length: u32,
}

impl HandshakeHeader {
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = vec![0u8; HANDSHAKE_HEADER_LENGTH];
        out[0] = self.handshake_type.as_u8();
        write_u24(&mut out[1..4], self.length);
        BigEndian::write_u16(&mut out[4..6], self.message_sequence);
        write_u24(&mut out[6..9], self.fragment_offset);
        write_u24(&mut out[9..12], self.fragment_length);
        out
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HANDSHAKE_HEADER_LENGTH {
            return Err(Error::BufferTooSmall);
        }

        Ok(HandshakeHeader {
            handshake_type: HandshakeType::from_u8(data[0])?,
            length: read_u24(&data[1..4]),
            message_sequence: BigEndian::read_u16(&data[4..6]),
            fragment_offset: read_u24(&data[6..9]),
            fragment_length: read_u24(&data[9..12]),
        })
    }
}

impl Default for HandshakeHeader {
    fn default() -> Self {
        HandshakeHeader {
            handshake_type: HandshakeType::HelloRequest,
            length: 0,
            message_sequence: 0,
            fragment_offset: 0,
            fragment_length: 0,
        }
    }
}

/// A handshake message body. Each variant owns its wire level fields.
#[derive(Debug, Clone, PartialEq)]
pub enum HandshakeMessage {
    ClientHello(ClientHello),
    ServerHello(ServerHello),
    HelloVerifyRequest(HelloVerifyRequest),
    Certificate(Certificate),
    ServerKeyExchange(ServerKeyExchange),
    CertificateRequest(CertificateRequest),
    ServerHelloDone(ServerHelloDone),
    ClientKeyExchange(ClientKeyExchange),
    CertificateVerify(CertificateVerify),
    Finished(Finished),
}

impl HandshakeMessage {
    pub fn handshake_type(&self) -> HandshakeType {
        match *self {
            HandshakeMessage::ClientHello(_) => HandshakeType::ClientHello,
            HandshakeMessage::ServerHello(_) => HandshakeType::ServerHello,
            HandshakeMessage::HelloVerifyRequest(_) => HandshakeType::HelloVerifyRequest,
            HandshakeMessage::Certificate(_) => HandshakeType::Certificate,
            HandshakeMessage::ServerKeyExchange(_) => HandshakeType::ServerKeyExchange,
            HandshakeMessage::CertificateRequest(_) => HandshakeType::CertificateRequest,
            HandshakeMessage::ServerHelloDone(_) => HandshakeType::ServerHelloDone,
            HandshakeMessage::ClientKeyExchange(_) => HandshakeType::ClientKeyExchange,
            HandshakeMessage::CertificateVerify(_) => HandshakeType::CertificateVerify,
            HandshakeMessage::Finished(_) => HandshakeType::Finished,
        }
    }

    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        match self {
            &HandshakeMessage::ClientHello(ref m) => m.marshal(),
            &HandshakeMessage::ServerHello(ref m) => m.marshal(),
            &HandshakeMessage::HelloVerifyRequest(ref m) => m.marshal(),
            &HandshakeMessage::Certificate(ref m) => m.marshal(),
            &HandshakeMessage::ServerKeyExchange(ref m) => m.marshal(),
            &HandshakeMessage::CertificateRequest(ref m) => m.marshal(),
            &HandshakeMessage::ServerHelloDone(ref m) => m.marshal(),
            &HandshakeMessage::ClientKeyExchange(ref m) => m.marshal(),
            &HandshakeMessage::CertificateVerify(ref m) => m.marshal(),
            &HandshakeMessage::Finished(ref m) => m.marshal(),
        }
    }

    fn unmarshal(handshake_type: HandshakeType, data: &[u8]) -> Result<Self, Error> {
        match handshake_type {
            HandshakeType::ClientHello => {
                Ok(HandshakeMessage::ClientHello(ClientHello::unmarshal(data)?))
            }
            HandshakeType::ServerHello => {
                Ok(HandshakeMessage::ServerHello(ServerHello::unmarshal(data)?))
            }
            HandshakeType::HelloVerifyRequest => Ok(HandshakeMessage::HelloVerifyRequest(
                HelloVerifyRequest::unmarshal(data)?,
            )),
            HandshakeType::Certificate => {
                Ok(HandshakeMessage::Certificate(Certificate::unmarshal(data)?))
            }
            HandshakeType::ServerKeyExchange => Ok(HandshakeMessage::ServerKeyExchange(
                ServerKeyExchange::unmarshal(data)?,
            )),
            HandshakeType::CertificateRequest => Ok(HandshakeMessage::CertificateRequest(
                CertificateRequest::unmarshal(data)?,
            )),
            HandshakeType::ServerHelloDone => Ok(HandshakeMessage::ServerHelloDone(
                ServerHelloDone::unmarshal(data)?,
            )),
            HandshakeType::ClientKeyExchange => Ok(HandshakeMessage::ClientKeyExchange(
                ClientKeyExchange::unmarshal(data)?,
            )),
            HandshakeType::CertificateVerify => Ok(HandshakeMessage::CertificateVerify(
                CertificateVerify::unmarshal(data)?,
            )),
            HandshakeType::Finished => Ok(HandshakeMessage::Finished(Finished::unmarshal(data)?)),
            HandshakeType::HelloRequest => Err(Error::NotImplemented),
        }
    }
}

/// The handshake protocol is responsible for selecting a cipher spec and
/// generating a master secret, which together comprise the primary
/// cryptographic parameters associated with a secure session. The
/// handshake protocol can also optionally authenticate parties who have
/// certificates signed by a trusted certificate authority.
/// https://tools.ietf.org/html/rfc5246#section-7.3
#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    pub handshake_header: HandshakeHeader,
    pub handshake_message: HandshakeMessage,
}

impl Handshake {
    pub fn new(handshake_message: HandshakeMessage) -> Self {
        Handshake {
            handshake_header: HandshakeHeader {
                handshake_type: handshake_message.handshake_type(),
                ..Default::default()
            },
            handshake_message,
        }
    }

    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        if self.handshake_header.fragment_offset != 0 {
            return Err(Error::UnableToMarshalFragmented);
        }

        let body = self.handshake_message.marshal()?;

        let mut header = self.handshake_header;
        header.handshake_type = self.handshake_message.handshake_type();
        header.length = body.len() as u32;
        header.fragment_length = header.length;

        let mut out = header.marshal();
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        let handshake_header = HandshakeHeader::unmarshal(data)?;

        let reported_len = read_u24(&data[1..4]);
        if (data.len() - HANDSHAKE_HEADER_LENGTH) as u32 != reported_len {
            return Err(Error::LengthMismatch);
        } else if reported_len != handshake_header.fragment_length {
            return Err(Error::LengthMismatch);
        }

        let handshake_message = HandshakeMessage::unmarshal(
            handshake_header.handshake_type,
            &data[HANDSHAKE_HEADER_LENGTH..],
        )?;

        Ok(Handshake {
            handshake_header,
            handshake_message,
        })
    }
}
