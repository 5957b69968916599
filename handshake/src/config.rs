use std::collections::HashMap;
use std::sync::Arc;

use wire::{
    CipherSuiteId, HashAlgorithm, SignatureAlgorithm, SignatureHashAlgorithm,
    SrtpProtectionProfile,
};

use cipher_suite::default_cipher_suite_ids;
use crypto::{CryptoEngine, PrivateKey};
use error::Error;

pub fn default_signature_schemes() -> Vec<SignatureHashAlgorithm> {
    vec![
        SignatureHashAlgorithm {
            hash: HashAlgorithm::Sha256,
            signature: SignatureAlgorithm::Ecdsa,
        },
        SignatureHashAlgorithm {
            hash: HashAlgorithm::Sha384,
            signature: SignatureAlgorithm::Ecdsa,
        },
        SignatureHashAlgorithm {
            hash: HashAlgorithm::Sha256,
            signature: SignatureAlgorithm::Rsa,
        },
        SignatureHashAlgorithm {
            hash: HashAlgorithm::Sha384,
            signature: SignatureAlgorithm::Rsa,
        },
    ]
}

/// A leaf certificate chain plus the private key it authenticates with.
/// Certificates are DER encoded; parsing is the crypto engine's problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    pub certificate: Vec<Vec<u8>>,
    pub private_key: PrivateKey,
}

/// ClientAuthType declares the policy the server will follow for TLS
/// client authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClientAuthType {
    NoClientCert,
    RequestClientCert,
    RequireAnyClientCert,
    VerifyClientCertIfGiven,
    RequireAndVerifyClientCert,
}

/// Whether the Extended Master Secret extension is disabled, requested or
/// mandatory for a connection.
/// https://tools.ietf.org/html/rfc7627
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedMasterSecretType {
    Disable,
    Request,
    Require,
}

pub type PskCallback = fn(identity_hint: &[u8]) -> Result<Vec<u8>, Error>;

pub type VerifyPeerCertificateFn =
    fn(certificates: &[Vec<u8>], chain_verified: bool) -> Result<(), Error>;

/// Everything a flight needs to know about the local configuration. Read
/// only for the lifetime of a handshake.
pub struct HandshakeConfig {
    pub initial_epoch: u16,
    pub local_certificates: Vec<Certificate>,
    pub name_to_certificate: HashMap<String, Certificate>,
    pub local_signature_schemes: Vec<SignatureHashAlgorithm>,
    pub local_cipher_suite_ids: Vec<CipherSuiteId>,
    pub local_psk_callback: Option<PskCallback>,
    pub local_psk_identity_hint: Option<Vec<u8>>,
    pub client_auth: ClientAuthType,
    pub extended_master_secret: ExtendedMasterSecretType,
    pub local_srtp_protection_profiles: Vec<SrtpProtectionProfile>,
    pub server_name: String,
    pub client_cas: Vec<Vec<u8>>,
    pub root_cas: Vec<Vec<u8>>,
    pub insecure_skip_verify: bool,
    pub verify_peer_certificate: Option<VerifyPeerCertificateFn>,
    pub crypto: Arc<dyn CryptoEngine>,
}

impl HandshakeConfig {
    pub fn new(crypto: Arc<dyn CryptoEngine>) -> Self {
        HandshakeConfig {
            initial_epoch: 0,
            local_certificates: Vec::new(),
            name_to_certificate: HashMap::new(),
            local_signature_schemes: default_signature_schemes(),
            local_cipher_suite_ids: default_cipher_suite_ids(),
            local_psk_callback: None,
            local_psk_identity_hint: None,
            client_auth: ClientAuthType::NoClientCert,
            extended_master_secret: ExtendedMasterSecretType::Request,
            local_srtp_protection_profiles: Vec::new(),
            server_name: String::new(),
            client_cas: Vec::new(),
            root_cas: Vec::new(),
            insecure_skip_verify: false,
            verify_peer_certificate: None,
            crypto,
        }
    }

    // get_certificate picks the certificate to offer for a server name,
    // falling back to the first configured one.
    pub fn get_certificate(&self, server_name: &str) -> Result<Certificate, Error> {
        if self.local_certificates.is_empty() {
            return Err(Error::NoCertificates);
        }

        if self.local_certificates.len() == 1 || server_name.is_empty() {
            return Ok(self.local_certificates[0].clone());
        }

        let lower = server_name.to_lowercase();
        let name = lower.trim_end_matches('.');

        if let Some(certificate) = self.name_to_certificate.get(name) {
            return Ok(certificate.clone());
        }

        // Try replacing labels in the name with wildcards until we get a
        // match.
        let mut labels: Vec<&str> = name.split_terminator('.').collect();
        for i in 0..labels.len() {
            labels[i] = "*";
            let candidate = labels.join(".");
            if let Some(certificate) = self.name_to_certificate.get(&candidate) {
                return Ok(certificate.clone());
            }
        }

        Ok(self.local_certificates[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto::PrivateKeyKind;
    use std::sync::Arc;

    struct NullEngine;

    impl CryptoEngine for NullEngine {
        fn generate_key_pair(
            &self,
            _curve: ::wire::NamedCurve,
        ) -> Result<::crypto::NamedCurveKeypair, Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
        fn pre_master_secret(
            &self,
            _public_key: &[u8],
            _private_key: &[u8],
            _curve: ::wire::NamedCurve,
        ) -> Result<Vec<u8>, Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
        fn generate_key_signature(
            &self,
            _plaintext: &[u8],
            _private_key: &PrivateKey,
            _hash: ::wire::HashAlgorithm,
        ) -> Result<Vec<u8>, Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
        fn verify_key_signature(
            &self,
            _plaintext: &[u8],
            _signature: &[u8],
            _hash: ::wire::HashAlgorithm,
            _certificates: &[Vec<u8>],
        ) -> Result<(), Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
        fn generate_certificate_verify(
            &self,
            _plaintext: &[u8],
            _private_key: &PrivateKey,
            _hash: ::wire::HashAlgorithm,
        ) -> Result<Vec<u8>, Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
        fn verify_certificate_verify(
            &self,
            _plaintext: &[u8],
            _hash: ::wire::HashAlgorithm,
            _signature: &[u8],
            _certificates: &[Vec<u8>],
        ) -> Result<(), Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
        fn verify_server_chain(
            &self,
            _certificates: &[Vec<u8>],
            _roots: &[Vec<u8>],
            _server_name: &str,
        ) -> Result<(), Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
        fn verify_client_chain(
            &self,
            _certificates: &[Vec<u8>],
            _cas: &[Vec<u8>],
        ) -> Result<(), Error> {
            Err(Error::Crypto("unimplemented".to_owned()))
        }
    }

    fn certificate(tag: u8) -> Certificate {
        Certificate {
            certificate: vec![vec![tag; 8]],
            private_key: PrivateKey {
                raw: vec![tag; 4],
                kind: PrivateKeyKind::Ecdsa,
            },
        }
    }

    #[test]
    fn get_certificate_falls_back_to_first() {
        let mut cfg = HandshakeConfig::new(Arc::new(NullEngine));
        assert_eq!(cfg.get_certificate("example.org"), Err(Error::NoCertificates));

        cfg.local_certificates = vec![certificate(1), certificate(2)];
        assert_eq!(cfg.get_certificate("unknown.example.org"), Ok(certificate(1)));
    }

    #[test]
    fn get_certificate_matches_wildcards() {
        let mut cfg = HandshakeConfig::new(Arc::new(NullEngine));
        cfg.local_certificates = vec![certificate(1), certificate(2)];
        cfg.name_to_certificate
            .insert("*.example.org".to_owned(), certificate(2));

        assert_eq!(cfg.get_certificate("Media.Example.Org."), Ok(certificate(2)));
    }
}
