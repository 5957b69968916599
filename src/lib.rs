#![forbid(unsafe_code)]

//! The core of a DTLS 1.2 handshake implementation: the wire codec for
//! handshake records, the fragment reassembly buffer, the handshake
//! message cache, and the flight state machines for both sides of a
//! connection. Transport, record encryption and the raw cryptographic
//! primitives live with the embedding connection.

pub extern crate handshake;
pub extern crate wire;

pub use handshake::{
    Certificate, CipherSuite, ClientAuthType, Context, CryptoEngine, Error,
    ExtendedMasterSecretType, Flight, FlightConn, FragmentBuffer, HandshakeCache, HandshakeConfig,
    HandshakeFsm, HandshakeState, Packet, State,
};
pub use wire::{Alert, AlertDescription, AlertLevel, CipherSuiteId, NamedCurve};
