use content::ProtocolVersion;
use error::Error;

/// The HelloVerifyRequest is the stateless cookie exchange the server uses
/// to demonstrate the client can receive packets at its claimed transport
/// address before any expensive work is done.
/// https://tools.ietf.org/html/rfc6347#section-4.2.1
#[derive(Debug, Clone, PartialEq)]
pub struct HelloVerifyRequest {
    pub version: ProtocolVersion,
    pub cookie: Vec<u8>,
}

impl HelloVerifyRequest {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        if self.cookie.len() > 255 {
            return Err(Error::CookieTooLong);
        }

        let mut out = Vec::with_capacity(3 + self.cookie.len());
        out.push(self.version.major);
        out.push(self.version.minor);
        out.push(self.cookie.len() as u8);
        out.extend_from_slice(&self.cookie);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 3 {
            return Err(Error::BufferTooSmall);
        }

        let cookie_len = data[2] as usize;
        if data.len() < 3 + cookie_len {
            return Err(Error::BufferTooSmall);
        }

        Ok(HelloVerifyRequest {
            version: ProtocolVersion {
                major: data[0],
                minor: data[1],
            },
            cookie: data[3..3 + cookie_len].to_vec(),
        })
    }
}
