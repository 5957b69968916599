use error::Error;
use handshake::{read_u24, write_u24};

/// The certificate chain, each entry a DER encoded X.509 certificate. The
/// sender's certificate MUST come first.
/// https://tools.ietf.org/html/rfc5246#section-7.4.2
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Certificate {
    pub certificate: Vec<Vec<u8>>,
}

impl Certificate {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        let mut payload = Vec::new();
        for certificate in &self.certificate {
            let mut len = [0u8; 3];
            write_u24(&mut len, certificate.len() as u32);
            payload.extend_from_slice(&len);
            payload.extend_from_slice(certificate);
        }

        let mut out = vec![0u8; 3];
        write_u24(&mut out, payload.len() as u32);
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 3 {
            return Err(Error::BufferTooSmall);
        }

        let payload_len = read_u24(&data[..3]) as usize;
        if data.len() < 3 + payload_len {
            return Err(Error::BufferTooSmall);
        }

        let mut certificate = Vec::new();
        let mut offset = 3;
        let end = 3 + payload_len;
        while offset < end {
            if end - offset < 3 {
                return Err(Error::BufferTooSmall);
            }
            let certificate_len = read_u24(&data[offset..offset + 3]) as usize;
            offset += 3;
            if end - offset < certificate_len {
                return Err(Error::BufferTooSmall);
            }
            certificate.push(data[offset..offset + certificate_len].to_vec());
            offset += certificate_len;
        }

        Ok(Certificate { certificate })
    }
}
