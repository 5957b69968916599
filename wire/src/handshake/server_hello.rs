use byteorder::{BigEndian, ByteOrder};

use algorithm::{CipherSuiteId, CompressionMethodId};
use content::ProtocolVersion;
use error::Error;
use extension::{marshal_extensions, unmarshal_extensions, Extension};
use random::{HandshakeRandom, HANDSHAKE_RANDOM_LENGTH};

/// The ServerHello is sent in response to a ClientHello when the server
/// was able to find an acceptable set of algorithms.
/// https://tools.ietf.org/html/rfc5246#section-7.4.1.3
#[derive(Debug, Clone, PartialEq)]
pub struct ServerHello {
    pub version: ProtocolVersion,
    pub random: HandshakeRandom,
    pub cipher_suite: CipherSuiteId,
    pub compression_method: CompressionMethodId,
    pub extensions: Vec<Extension>,
}

impl ServerHello {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        out.push(self.version.major);
        out.push(self.version.minor);
        out.extend_from_slice(&self.random.marshal_fixed());

        // Session ID is unused in DTLS and always empty.
        out.push(0x00);

        let mut suite = [0u8; 2];
        BigEndian::write_u16(&mut suite, self.cipher_suite.0);
        out.extend_from_slice(&suite);

        out.push(self.compression_method.0);

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

        if data.len() < offset + 3 {
            return Err(Error::BufferTooSmall);
        }
        let cipher_suite = CipherSuiteId(BigEndian::read_u16(&data[offset..offset + 2]));
        offset += 2;

        let compression_method = CompressionMethodId(data[offset]);
        offset += 1;

        let (extensions, _) = unmarshal_extensions(&data[offset..])?;

        Ok(ServerHello {
            version,
            random,
            cipher_suite,
            compression_method,
            extensions,
        })
    }
}
