use byteorder::{BigEndian, ByteOrder};

use algorithm::{HashAlgorithm, SignatureAlgorithm, SignatureHashAlgorithm};
use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientCertificateType(pub u8);

impl ClientCertificateType {
    pub const RSA_SIGN: ClientCertificateType = ClientCertificateType(1);
    pub const ECDSA_SIGN: ClientCertificateType = ClientCertificateType(64);
}

/// A non-anonymous server can optionally request a certificate from the
/// client, if appropriate for the selected cipher suite.
/// https://tools.ietf.org/html/rfc5246#section-7.4.4
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateRequest {
    pub certificate_types: Vec<ClientCertificateType>,
    pub signature_hash_algorithms: Vec<SignatureHashAlgorithm>,
}

impl CertificateRequest {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();

        out.push(self.certificate_types.len() as u8);
        for certificate_type in &self.certificate_types {
            out.push(certificate_type.0);
        }

        let mut list_len = [0u8; 2];
        BigEndian::write_u16(&mut list_len, (self.signature_hash_algorithms.len() * 2) as u16);
        out.extend_from_slice(&list_len);
        for algorithm in &self.signature_hash_algorithms {
            out.push(algorithm.hash.as_u8());
            out.push(algorithm.signature.as_u8());
        }

        // Empty distinguished names list.
        out.extend_from_slice(&[0x00, 0x00]);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::BufferTooSmall);
        }

        let types_len = data[0] as usize;
        if data.len() < 1 + types_len {
            return Err(Error::BufferTooSmall);
        }
        let certificate_types = data[1..1 + types_len]
            .iter()
            .map(|&v| ClientCertificateType(v))
            .collect();
        let mut offset = 1 + types_len;

        if data.len() < offset + 2 {
            return Err(Error::BufferTooSmall);
        }
        let algorithms_len = BigEndian::read_u16(&data[offset..offset + 2]) as usize;
        offset += 2;
        if data.len() < offset + algorithms_len {
            return Err(Error::BufferTooSmall);
        }

        let mut signature_hash_algorithms = Vec::with_capacity(algorithms_len / 2);
        for chunk in data[offset..offset + algorithms_len].chunks(2) {
            if chunk.len() == 2 {
                signature_hash_algorithms.push(SignatureHashAlgorithm {
                    hash: HashAlgorithm::from_u8(chunk[0])?,
                    signature: SignatureAlgorithm::from_u8(chunk[1])?,
                });
            }
        }

        Ok(CertificateRequest {
            certificate_types,
            signature_hash_algorithms,
        })
    }
}
