use byteorder::{BigEndian, ByteOrder};

use error::Error;

/// With the ClientKeyExchange the premaster secret is set, either by
/// direct transmission of the RSA-encrypted secret or by the transmission
/// of Diffie-Hellman parameters. For PSK suites it carries the identity.
/// Exactly one of the two fields must be set.
/// https://tools.ietf.org/html/rfc5246#section-7.4.7
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientKeyExchange {
    pub identity_hint: Option<Vec<u8>>,
    pub public_key: Option<Vec<u8>>,
}

impl ClientKeyExchange {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        match (&self.public_key, &self.identity_hint) {
            (&Some(_), &Some(_)) | (&None, &None) => Err(Error::InvalidClientKeyExchange),
            (&Some(ref public_key), &None) => {
                let mut out = vec![public_key.len() as u8];
                out.extend_from_slice(public_key);
                Ok(out)
            }
            (&None, &Some(ref identity_hint)) => {
                let mut out = vec![0u8; 2];
                BigEndian::write_u16(&mut out, identity_hint.len() as u16);
                out.extend_from_slice(identity_hint);
                Ok(out)
            }
        }
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 2 {
            return Err(Error::BufferTooSmall);
        }

        // If parsed as PSK return early and only populate the identity
        // hint. The two framings are ambiguous; callers that know the
        // negotiated cipher suite must check the populated field matches.
        let psk_length = BigEndian::read_u16(&data[..2]) as usize;
        if data.len() == psk_length + 2 {
            return Ok(ClientKeyExchange {
                identity_hint: Some(data[2..].to_vec()),
                public_key: None,
            });
        }

        let public_key_length = data[0] as usize;
        if data.len() != public_key_length + 1 {
            return Err(Error::BufferTooSmall);
        }

        Ok(ClientKeyExchange {
            identity_hint: None,
            public_key: Some(data[1..].to_vec()),
        })
    }
}
