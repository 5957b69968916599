use byteorder::{BigEndian, ByteOrder};

use algorithm::{HashAlgorithm, SignatureAlgorithm, SignatureHashAlgorithm};
use curve::{EllipticCurveType, NamedCurve};
use error::Error;

/// The ServerKeyExchange conveys the server side key exchange parameters.
/// For ECDHE suites it carries the ephemeral public key and a signature
/// over both randoms and the curve parameters; for PSK suites it carries
/// only the identity hint.
/// https://tools.ietf.org/html/rfc5246#section-7.4.3
/// https://tools.ietf.org/html/rfc4279#section-2
#[derive(Debug, Clone, PartialEq)]
pub enum ServerKeyExchange {
    Psk {
        identity_hint: Vec<u8>,
    },
    Ecdhe {
        named_curve: NamedCurve,
        public_key: Vec<u8>,
        algorithm: SignatureHashAlgorithm,
        signature: Vec<u8>,
    },
}

impl ServerKeyExchange {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        match self {
            &ServerKeyExchange::Psk { ref identity_hint } => {
                let mut out = vec![0u8; 2];
                BigEndian::write_u16(&mut out, identity_hint.len() as u16);
                out.extend_from_slice(identity_hint);
                Ok(out)
            }
            &ServerKeyExchange::Ecdhe {
                named_curve,
                ref public_key,
                algorithm,
                ref signature,
            } => {
                let mut out = Vec::new();
                out.push(EllipticCurveType::NamedCurve.as_u8());

                let mut curve = [0u8; 2];
                BigEndian::write_u16(&mut curve, named_curve.0);
                out.extend_from_slice(&curve);

                out.push(public_key.len() as u8);
                out.extend_from_slice(public_key);

                out.push(algorithm.hash.as_u8());
                out.push(algorithm.signature.as_u8());

                let mut signature_len = [0u8; 2];
                BigEndian::write_u16(&mut signature_len, signature.len() as u16);
                out.extend_from_slice(&signature_len);
                out.extend_from_slice(signature);
                Ok(out)
            }
        }
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 2 {
            return Err(Error::BufferTooSmall);
        }

        // If parsed as PSK return early and only populate the identity hint.
        let psk_length = BigEndian::read_u16(&data[..2]) as usize;
        if data.len() == psk_length + 2 {
            return Ok(ServerKeyExchange::Psk {
                identity_hint: data[2..].to_vec(),
            });
        }

        EllipticCurveType::from_u8(data[0])?;
        if data.len() < 4 {
            return Err(Error::BufferTooSmall);
        }
        let named_curve = NamedCurve(BigEndian::read_u16(&data[1..3]));

        let public_key_len = data[3] as usize;
        let mut offset = 4;
        if data.len() < offset + public_key_len + 2 {
            return Err(Error::BufferTooSmall);
        }
        let public_key = data[offset..offset + public_key_len].to_vec();
        offset += public_key_len;

        let hash = HashAlgorithm::from_u8(data[offset])?;
        let signature = SignatureAlgorithm::from_u8(data[offset + 1])?;
        offset += 2;

        if data.len() < offset + 2 {
            return Err(Error::BufferTooSmall);
        }
        let signature_len = BigEndian::read_u16(&data[offset..offset + 2]) as usize;
        offset += 2;
        if data.len() < offset + signature_len {
            return Err(Error::BufferTooSmall);
        }

        Ok(ServerKeyExchange::Ecdhe {
            named_curve,
            public_key,
            algorithm: SignatureHashAlgorithm { hash, signature },
            signature: data[offset..offset + signature_len].to_vec(),
        })
    }
}
