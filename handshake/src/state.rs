use std::fmt;

use hex;
use wire::{HandshakeRandom, NamedCurve, SrtpProtectionProfile, DEFAULT_NAMED_CURVE};

use cipher_suite::CipherSuite;
use crypto::NamedCurveKeypair;

/// All the state one side accumulates over a handshake. Allocated when
/// the connection is created, progressively populated by the flights, and
/// consumed by the record layer once the cipher suite is initialized.
pub struct State {
    pub is_client: bool,

    pub local_random: HandshakeRandom,
    pub remote_random: HandshakeRandom,

    // if None means not generated yet
    pub local_keypair: Option<NamedCurveKeypair>,
    pub named_curve: NamedCurve,
    pub cookie: Vec<u8>,

    pub cipher_suite: Option<Box<dyn CipherSuite>>,
    pub srtp_protection_profile: Option<SrtpProtectionProfile>,
    pub extended_master_secret: bool,

    pub peer_certificates: Vec<Vec<u8>>,
    pub peer_certificates_verified: bool,
    pub remote_requested_certificate: bool,

    pub pre_master_secret: Vec<u8>,
    pub master_secret: Vec<u8>,

    pub local_verify_data: Vec<u8>,
    pub local_key_signature: Vec<u8>,
    pub local_certificates_verify: Vec<u8>,

    // Counters of flights dispatched and consumed. The record layer owns
    // its own per-epoch sequence numbers.
    pub handshake_send_sequence: u64,
    pub handshake_recv_sequence: u64,

    pub local_epoch: u16,
    pub remote_epoch: u16,
}

impl State {
    pub fn new(is_client: bool) -> Self {
        State {
            is_client,
            local_random: HandshakeRandom::default(),
            remote_random: HandshakeRandom::default(),
            local_keypair: None,
            named_curve: DEFAULT_NAMED_CURVE,
            cookie: Vec::new(),
            cipher_suite: None,
            srtp_protection_profile: None,
            extended_master_secret: false,
            peer_certificates: Vec::new(),
            peer_certificates_verified: false,
            remote_requested_certificate: false,
            pre_master_secret: Vec::new(),
            master_secret: Vec::new(),
            local_verify_data: Vec::new(),
            local_key_signature: Vec::new(),
            local_certificates_verify: Vec::new(),
            handshake_send_sequence: 0,
            handshake_recv_sequence: 0,
            local_epoch: 0,
            remote_epoch: 0,
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            r#"
        is_client:     {:?}
        cipher_suite:  {:?}
        named_curve:   {:?}
        master_secret: {:?}
        verify_data:   {:?}
        "#,
            self.is_client,
            self.cipher_suite,
            self.named_curve,
            hex::encode(&self.master_secret),
            hex::encode(&self.local_verify_data),
        )
    }
}
