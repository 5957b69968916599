use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ByteOrder};
use rand;

use error::Error;

pub const HANDSHAKE_RANDOM_LENGTH: usize = RANDOM_BYTES_LENGTH + 4;

const RANDOM_BYTES_LENGTH: usize = 28;

/// The client hello and server hello random structure: a 32-bit timestamp
/// followed by 28 bytes generated by a secure random number generator.
/// https://tools.ietf.org/html/rfc5246#section-7.4.1.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeRandom {
    pub gmt_unix_time: u32,
    pub random_bytes: [u8; RANDOM_BYTES_LENGTH],
}

impl Default for HandshakeRandom {
    fn default() -> Self {
        HandshakeRandom {
            gmt_unix_time: 0,
            random_bytes: [0; RANDOM_BYTES_LENGTH],
        }
    }
}

impl HandshakeRandom {
    // populate fills the random with the current unix time and fresh
    // random bytes.
    pub fn populate(&mut self) {
        self.gmt_unix_time = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as u32,
            Err(_) => 0,
        };
        self.random_bytes = rand::random();
    }

    pub fn marshal_fixed(&self) -> [u8; HANDSHAKE_RANDOM_LENGTH] {
        let mut out = [0u8; HANDSHAKE_RANDOM_LENGTH];
        BigEndian::write_u32(&mut out[..4], self.gmt_unix_time);
        out[4..].copy_from_slice(&self.random_bytes);
        out
    }

    pub fn unmarshal_fixed(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HANDSHAKE_RANDOM_LENGTH {
            return Err(Error::BufferTooSmall);
        }

        let mut random_bytes = [0u8; RANDOM_BYTES_LENGTH];
        random_bytes.copy_from_slice(&data[4..HANDSHAKE_RANDOM_LENGTH]);

        Ok(HandshakeRandom {
            gmt_unix_time: BigEndian::read_u32(&data[..4]),
            random_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_round_trip() {
        let mut r = HandshakeRandom::default();
        r.populate();

        let raw = r.marshal_fixed();
        assert_eq!(HandshakeRandom::unmarshal_fixed(&raw).unwrap(), r);
    }

    #[test]
    fn populate_changes_bytes() {
        let mut r = HandshakeRandom::default();
        r.populate();
        assert_ne!(r.random_bytes, [0u8; RANDOM_BYTES_LENGTH]);
    }
}
