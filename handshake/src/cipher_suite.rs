use std::fmt;

use wire::handshake::ClientCertificateType;
use wire::{CipherSuiteId, HashAlgorithm};

use error::Error;
use prf::{prf_encryption_keys, EncryptionKeys};

/// The capability surface the handshake needs from a negotiated cipher
/// suite. `init` runs the key schedule once the master secret is known;
/// the derived keys are then owned by the record layer.
pub trait CipherSuite {
    fn id(&self) -> CipherSuiteId;

    // certificate_type the suite authenticates with, None for PSK suites.
    fn certificate_type(&self) -> Option<ClientCertificateType>;

    fn is_psk(&self) -> bool;

    fn is_initialized(&self) -> bool;

    fn hash_func(&self) -> HashAlgorithm;

    fn init(
        &mut self,
        master_secret: &[u8],
        client_random: &[u8],
        server_random: &[u8],
        is_client: bool,
    ) -> Result<(), Error>;

    // encryption_keys is populated after a successful init.
    fn encryption_keys(&self) -> Option<&EncryptionKeys>;
}

impl fmt::Debug for dyn CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

const AES128_GCM_KEY_LENGTH: usize = 16;
const AES128_GCM_IV_LENGTH: usize = 4;

#[derive(Default)]
pub struct EcdheEcdsaAes128GcmSha256 {
    keys: Option<EncryptionKeys>,
}

impl CipherSuite for EcdheEcdsaAes128GcmSha256 {
    fn id(&self) -> CipherSuiteId {
        CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256
    }

    fn certificate_type(&self) -> Option<ClientCertificateType> {
        Some(ClientCertificateType::ECDSA_SIGN)
    }

    fn is_psk(&self) -> bool {
        false
    }

    fn is_initialized(&self) -> bool {
        self.keys.is_some()
    }

    fn hash_func(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }

    fn init(
        &mut self,
        master_secret: &[u8],
        client_random: &[u8],
        server_random: &[u8],
        _is_client: bool,
    ) -> Result<(), Error> {
        self.keys = Some(prf_encryption_keys(
            master_secret,
            client_random,
            server_random,
            0,
            AES128_GCM_KEY_LENGTH,
            AES128_GCM_IV_LENGTH,
            self.hash_func(),
        )?);
        Ok(())
    }

    fn encryption_keys(&self) -> Option<&EncryptionKeys> {
        self.keys.as_ref()
    }
}

#[derive(Default)]
pub struct PskAes128GcmSha256 {
    keys: Option<EncryptionKeys>,
}

impl CipherSuite for PskAes128GcmSha256 {
    fn id(&self) -> CipherSuiteId {
        CipherSuiteId::TLS_PSK_WITH_AES_128_GCM_SHA256
    }

    fn certificate_type(&self) -> Option<ClientCertificateType> {
        None
    }

    fn is_psk(&self) -> bool {
        true
    }

    fn is_initialized(&self) -> bool {
        self.keys.is_some()
    }

    fn hash_func(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }

    fn init(
        &mut self,
        master_secret: &[u8],
        client_random: &[u8],
        server_random: &[u8],
        _is_client: bool,
    ) -> Result<(), Error> {
        self.keys = Some(prf_encryption_keys(
            master_secret,
            client_random,
            server_random,
            0,
            AES128_GCM_KEY_LENGTH,
            AES128_GCM_IV_LENGTH,
            self.hash_func(),
        )?);
        Ok(())
    }

    fn encryption_keys(&self) -> Option<&EncryptionKeys> {
        self.keys.as_ref()
    }
}

// cipher_suite_for_id creates the pending suite for a negotiated id.
pub fn cipher_suite_for_id(id: CipherSuiteId) -> Result<Box<dyn CipherSuite>, Error> {
    match id {
        CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 => {
            Ok(Box::new(EcdheEcdsaAes128GcmSha256::default()))
        }
        CipherSuiteId::TLS_PSK_WITH_AES_128_GCM_SHA256 => {
            Ok(Box::new(PskAes128GcmSha256::default()))
        }
        CipherSuiteId(other) => Err(Error::InvalidCipherSuite(other)),
    }
}

pub fn default_cipher_suite_ids() -> Vec<CipherSuiteId> {
    vec![CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_marks_suite_initialized() {
        let mut suite = EcdheEcdsaAes128GcmSha256::default();
        assert!(!suite.is_initialized());

        suite
            .init(&[0x42u8; 48], &[0x11u8; 32], &[0x22u8; 32], true)
            .unwrap();

        assert!(suite.is_initialized());
        let keys = suite.encryption_keys().unwrap();
        assert_eq!(keys.client_write_key.len(), AES128_GCM_KEY_LENGTH);
        assert_eq!(keys.client_write_iv.len(), AES128_GCM_IV_LENGTH);
    }

    #[test]
    fn unknown_suite_is_rejected() {
        assert!(cipher_suite_for_id(CipherSuiteId(0x1234)).is_err());
    }
}
