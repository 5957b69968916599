#![forbid(unsafe_code)]

extern crate byteorder;
extern crate hex;
extern crate hmac;
#[macro_use]
extern crate log;
extern crate rand;
extern crate sha2;

extern crate wire;

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

mod error;
pub use self::error::Error;

mod ctx;
pub use self::ctx::Context;

mod crypto;
pub use self::crypto::{
    select_signature_scheme, value_key_message, CryptoEngine, NamedCurveKeypair, PrivateKey,
    PrivateKeyKind,
};

pub mod prf;
pub use self::prf::EncryptionKeys;

mod cipher_suite;
pub use self::cipher_suite::{cipher_suite_for_id, default_cipher_suite_ids, CipherSuite};

mod config;
pub use self::config::{
    default_signature_schemes, Certificate, ClientAuthType, ExtendedMasterSecretType,
    HandshakeConfig, PskCallback, VerifyPeerCertificateFn,
};

mod state;
pub use self::state::State;

mod fragment_buffer;
pub use self::fragment_buffer::FragmentBuffer;

mod cache;
pub use self::cache::{HandshakeCache, HandshakeCachePullRule};

pub mod flight;
pub use self::flight::{Flight, FlightConn, Packet};

mod handshaker;
pub use self::handshaker::{HandshakeFsm, HandshakeState};
