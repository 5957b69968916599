#![forbid(unsafe_code)]

extern crate byteorder;
extern crate rand;
extern crate sha2;

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

mod error;
pub use self::error::Error;

mod content;
pub use self::content::{ChangeCipherSpec, ContentType, ProtocolVersion};
pub use self::content::{PROTOCOL_VERSION1_0, PROTOCOL_VERSION1_2};

mod record;
pub use self::record::{Content, RecordLayer, RecordLayerHeader};
pub use self::record::{MAX_SEQUENCE_NUMBER, RECORD_LAYER_HEADER_SIZE};

mod alert;
pub use self::alert::{Alert, AlertDescription, AlertLevel};

mod random;
pub use self::random::{HandshakeRandom, HANDSHAKE_RANDOM_LENGTH};

mod algorithm;
pub use self::algorithm::{
    default_compression_methods, CipherSuiteId, CompressionMethodId, HashAlgorithm,
    SignatureAlgorithm, SignatureHashAlgorithm,
};

mod curve;
pub use self::curve::{EllipticCurveType, NamedCurve, PointFormat, DEFAULT_NAMED_CURVE};

mod extension;
pub use self::extension::{marshal_extensions, unmarshal_extensions, Extension, SrtpProtectionProfile};

pub mod handshake;
pub use self::handshake::{Handshake, HandshakeHeader, HandshakeMessage, HandshakeType};
pub use self::handshake::HANDSHAKE_HEADER_LENGTH;
pub use self::handshake::{
    Certificate, CertificateRequest, CertificateVerify, ClientHello, ClientKeyExchange, Finished,
    HelloVerifyRequest, ServerHello, ServerHelloDone, ServerKeyExchange,
};
