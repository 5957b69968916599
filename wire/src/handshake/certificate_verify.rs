use byteorder::{BigEndian, ByteOrder};

use algorithm::{HashAlgorithm, SignatureAlgorithm, SignatureHashAlgorithm};
use error::Error;

/// The CertificateVerify is used to provide explicit verification of a
/// client certificate by signing the handshake transcript.
/// https://tools.ietf.org/html/rfc5246#section-7.4.8
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateVerify {
    pub algorithm: SignatureHashAlgorithm,
    pub signature: Vec<u8>,
}

impl CertificateVerify {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(4 + self.signature.len());
        out.push(self.algorithm.hash.as_u8());
        out.push(self.algorithm.signature.as_u8());

        let mut signature_len = [0u8; 2];
        BigEndian::write_u16(&mut signature_len, self.signature.len() as u16);
        out.extend_from_slice(&signature_len);
        out.extend_from_slice(&self.signature);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 4 {
            return Err(Error::BufferTooSmall);
        }

        let hash = HashAlgorithm::from_u8(data[0])?;
        let signature = SignatureAlgorithm::from_u8(data[1])?;

        let signature_len = BigEndian::read_u16(&data[2..4]) as usize;
        if data.len() != 4 + signature_len {
            return Err(Error::LengthMismatch);
        }

        Ok(CertificateVerify {
            algorithm: SignatureHashAlgorithm { hash, signature },
            signature: data[4..].to_vec(),
        })
    }
}
