use wire::{HashAlgorithm, NamedCurve, SignatureAlgorithm, SignatureHashAlgorithm};

use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKeyKind {
    Ecdsa,
    Rsa,
}

/// An opaque private key handle. The raw bytes are only ever interpreted
/// by the crypto engine the key was created for.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateKey {
    pub raw: Vec<u8>,
    pub kind: PrivateKeyKind,
}

/// An ephemeral keypair on one of the negotiated curves. The private half
/// is opaque engine material, the public half is the wire encoding sent in
/// the key exchange messages.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedCurveKeypair {
    pub curve: NamedCurve,
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
}

/// The narrow interface to the raw cryptographic primitives. Point
/// arithmetic, signing and chain validation are external collaborators;
/// the state machine only sequences them.
pub trait CryptoEngine {
    // generate_key_pair creates a fresh ephemeral keypair on the curve.
    fn generate_key_pair(&self, curve: NamedCurve) -> Result<NamedCurveKeypair, Error>;

    // pre_master_secret combines the peer public key with the local
    // private key on the curve.
    fn pre_master_secret(
        &self,
        public_key: &[u8],
        private_key: &[u8],
        curve: NamedCurve,
    ) -> Result<Vec<u8>, Error>;

    // generate_key_signature signs the ServerKeyExchange parameters.
    fn generate_key_signature(
        &self,
        plaintext: &[u8],
        private_key: &PrivateKey,
        hash: HashAlgorithm,
    ) -> Result<Vec<u8>, Error>;

    // verify_key_signature checks the ServerKeyExchange signature against
    // the leaf certificate's public key.
    fn verify_key_signature(
        &self,
        plaintext: &[u8],
        signature: &[u8],
        hash: HashAlgorithm,
        certificates: &[Vec<u8>],
    ) -> Result<(), Error>;

    // generate_certificate_verify signs the handshake transcript.
    fn generate_certificate_verify(
        &self,
        plaintext: &[u8],
        private_key: &PrivateKey,
        hash: HashAlgorithm,
    ) -> Result<Vec<u8>, Error>;

    // verify_certificate_verify checks the transcript signature against
    // the peer's leaf certificate.
    fn verify_certificate_verify(
        &self,
        plaintext: &[u8],
        hash: HashAlgorithm,
        signature: &[u8],
        certificates: &[Vec<u8>],
    ) -> Result<(), Error>;

    // verify_server_chain validates the server certificate chain against
    // the configured roots and the expected server name.
    fn verify_server_chain(
        &self,
        certificates: &[Vec<u8>],
        roots: &[Vec<u8>],
        server_name: &str,
    ) -> Result<(), Error>;

    // verify_client_chain validates the client certificate chain against
    // the configured client CAs.
    fn verify_client_chain(
        &self,
        certificates: &[Vec<u8>],
        cas: &[Vec<u8>],
    ) -> Result<(), Error>;
}

// value_key_message builds the plaintext the ServerKeyExchange signature
// covers: both hello randoms followed by the ECDH parameters.
pub fn value_key_message(
    client_random: &[u8],
    server_random: &[u8],
    public_key: &[u8],
    named_curve: NamedCurve,
) -> Vec<u8> {
    let mut server_ecdh_params = [0u8; 4];
    server_ecdh_params[0] = 0x03; // named curve
    server_ecdh_params[1] = (named_curve.0 >> 8) as u8;
    server_ecdh_params[2] = named_curve.0 as u8;
    server_ecdh_params[3] = public_key.len() as u8;

    let mut plaintext = Vec::with_capacity(
        client_random.len() + server_random.len() + 4 + public_key.len(),
    );
    plaintext.extend_from_slice(client_random);
    plaintext.extend_from_slice(server_random);
    plaintext.extend_from_slice(&server_ecdh_params);
    plaintext.extend_from_slice(public_key);
    plaintext
}

// select_signature_scheme walks the configured schemes and picks the
// first one compatible with the certificate's key type.
pub fn select_signature_scheme(
    schemes: &[SignatureHashAlgorithm],
    private_key: &PrivateKey,
) -> Result<SignatureHashAlgorithm, Error> {
    for scheme in schemes {
        let compatible = match private_key.kind {
            PrivateKeyKind::Ecdsa => scheme.signature == SignatureAlgorithm::Ecdsa,
            PrivateKeyKind::Rsa => scheme.signature == SignatureAlgorithm::Rsa,
        };
        if compatible {
            return Ok(*scheme);
        }
    }

    Err(Error::NoAvailableSignatureSchemes)
}
