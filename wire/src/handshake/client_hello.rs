use byteorder::{BigEndian, ByteOrder};

use algorithm::{CipherSuiteId, CompressionMethodId};
use content::ProtocolVersion;
use error::Error;
use extension::{marshal_extensions, unmarshal_extensions, Extension};
use random::{HandshakeRandom, HANDSHAKE_RANDOM_LENGTH};

/// When a client first connects to a server it is required to send the
/// ClientHello as its first message. The client can also send a ClientHello
/// in response to a HelloVerifyRequest.
/// https://tools.ietf.org/html/rfc5246#section-7.4.1.2
#[derive(Debug, Clone, PartialEq)]
pub struct ClientHello {
    pub version: ProtocolVersion,
    pub random: HandshakeRandom,
    pub cookie: Vec<u8>,
    pub cipher_suites: Vec<CipherSuiteId>,
    pub compression_methods: Vec<CompressionMethodId>,
    pub extensions: Vec<Extension>,
}

impl ClientHello {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        if self.cookie.len() > 255 {
            return Err(Error::CookieTooLong);
        }

        let mut out = Vec::new();
        out.push(self.version.major);
        out.push(self.version.minor);
        out.extend_from_slice(&self.random.marshal_fixed());

        // Session ID is unused in DTLS and always empty.
        out.push(0x00);

        out.push(self.cookie.len() as u8);
        out.extend_from_slice(&self.cookie);

        let mut list_len = [0u8; 2];
        BigEndian::write_u16(&mut list_len, (self.cipher_suites.len() * 2) as u16);
        out.extend_from_slice(&list_len);
        for suite in &self.cipher_suites {
            let mut v = [0u8; 2];
            BigEndian::write_u16(&mut v, suite.0);
            out.extend_from_slice(&v);
        }

        out.push(self.compression_methods.len() as u8);
        for method in &self.compression_methods {
            out.push(method.0);
        }

        out.extend_from_slice(&marshal_extensions(&self.extensions));
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 2 + HANDSHAKE_RANDOM_LENGTH + 1 {
            return Err(Error::BufferTooSmall);
        }

        let version = ProtocolVersion {
            major: data[0],
            minor: data[1],
        };
        let random = HandshakeRandom::unmarshal_fixed(&data[2..])?;

        let mut offset = 2 + HANDSHAKE_RANDOM_LENGTH;

        let session_id_len = data[offset] as usize;
        offset += 1 + session_id_len;

        if data.len() < offset + 1 {
            return Err(Error::BufferTooSmall);
        }
        let cookie_len = data[offset] as usize;
        offset += 1;
        if data.len() < offset + cookie_len {
            return Err(Error::BufferTooSmall);
        }
        let cookie = data[offset..offset + cookie_len].to_vec();
        offset += cookie_len;

        if data.len() < offset + 2 {
            return Err(Error::BufferTooSmall);
        }
        let suites_len = BigEndian::read_u16(&data[offset..offset + 2]) as usize;
        offset += 2;
        if data.len() < offset + suites_len {
            return Err(Error::BufferTooSmall);
        }
        let mut cipher_suites = Vec::with_capacity(suites_len / 2);
        for chunk in data[offset..offset + suites_len].chunks(2) {
            if chunk.len() == 2 {
                cipher_suites.push(CipherSuiteId(BigEndian::read_u16(chunk)));
            }
        }
        offset += suites_len;

        if data.len() < offset + 1 {
            return Err(Error::BufferTooSmall);
        }
        let methods_len = data[offset] as usize;
        offset += 1;
        if data.len() < offset + methods_len {
            return Err(Error::BufferTooSmall);
        }
        let compression_methods = data[offset..offset + methods_len]
            .iter()
            .map(|&v| CompressionMethodId(v))
            .collect();
        offset += methods_len;

        let (extensions, _) = unmarshal_extensions(&data[offset..])?;

        Ok(ClientHello {
            version,
            random,
            cookie,
            cipher_suites,
            compression_methods,
            extensions,
        })
    }
}
