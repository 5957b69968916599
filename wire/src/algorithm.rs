use std::fmt;

use sha2::{Digest, Sha256, Sha384};

use error::Error;

/// HashAlgorithm is one half of a signature and hash algorithm pair.
/// https://tools.ietf.org/html/rfc5246#section-7.4.1.4.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn from_u8(v: u8) -> Result<Self, Error> {
        match v {
            1 => Ok(HashAlgorithm::Md5),
            2 => Ok(HashAlgorithm::Sha1),
            3 => Ok(HashAlgorithm::Sha224),
            4 => Ok(HashAlgorithm::Sha256),
            5 => Ok(HashAlgorithm::Sha384),
            6 => Ok(HashAlgorithm::Sha512),
            _ => Err(Error::InvalidHashAlgorithm(v)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match *self {
            HashAlgorithm::Md5 => 1,
            HashAlgorithm::Sha1 => 2,
            HashAlgorithm::Sha224 => 3,
            HashAlgorithm::Sha256 => 4,
            HashAlgorithm::Sha384 => 5,
            HashAlgorithm::Sha512 => 6,
        }
    }

    // digest computes the message digest for the transcript operations.
    // Only the hashes backing an implemented cipher suite are supported.
    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match *self {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::default();
                hasher.input(data);
                Ok(hasher.result().to_vec())
            }
            HashAlgorithm::Sha384 => {
                let mut hasher = Sha384::default();
                hasher.input(data);
                Ok(hasher.result().to_vec())
            }
            _ => Err(Error::InvalidHashAlgorithm(self.as_u8())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Anonymous,
    Rsa,
    Dsa,
    Ecdsa,
}

impl SignatureAlgorithm {
    pub fn from_u8(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(SignatureAlgorithm::Anonymous),
            1 => Ok(SignatureAlgorithm::Rsa),
            2 => Ok(SignatureAlgorithm::Dsa),
            3 => Ok(SignatureAlgorithm::Ecdsa),
            _ => Err(Error::InvalidSignatureAlgorithm(v)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match *self {
            SignatureAlgorithm::Anonymous => 0,
            SignatureAlgorithm::Rsa => 1,
            SignatureAlgorithm::Dsa => 2,
            SignatureAlgorithm::Ecdsa => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureHashAlgorithm {
    pub hash: HashAlgorithm,
    pub signature: SignatureAlgorithm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSuiteId(pub u16);

impl CipherSuiteId {
    pub const TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256: CipherSuiteId = CipherSuiteId(0xc02b);
    pub const TLS_PSK_WITH_AES_128_GCM_SHA256: CipherSuiteId = CipherSuiteId(0x00a8);
}

impl fmt::Display for CipherSuiteId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 => {
                write!(f, "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256")
            }
            CipherSuiteId::TLS_PSK_WITH_AES_128_GCM_SHA256 => {
                write!(f, "TLS_PSK_WITH_AES_128_GCM_SHA256")
            }
            CipherSuiteId(id) => write!(f, "unknown(0x{:04x})", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionMethodId(pub u8);

impl CompressionMethodId {
    pub const NULL: CompressionMethodId = CompressionMethodId(0);
}

pub fn default_compression_methods() -> Vec<CompressionMethodId> {
    vec![CompressionMethodId::NULL]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_digest() {
        let digest = HashAlgorithm::Sha256.digest(b"abc").unwrap();
        assert_eq!(
            digest,
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad").to_vec()
        );
    }

    #[test]
    fn unsupported_digest() {
        assert!(HashAlgorithm::Sha1.digest(b"abc").is_err());
    }
}
