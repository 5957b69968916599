use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    BufferTooSmall,
    LengthMismatch,
    InvalidClientKeyExchange,
    HandshakeMessageUnset,
    UnableToMarshalFragmented,
    NotImplemented,
    InvalidContentType(u8),
    InvalidCipherSpec,
    InvalidAlert,
    InvalidHashAlgorithm(u8),
    InvalidSignatureAlgorithm(u8),
    InvalidEllipticCurveType(u8),
    CookieTooLong,
    SequenceNumberOverflow,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Error::*;

        match self {
            &BufferTooSmall => write!(f, "buffer is too small"),
            &LengthMismatch => write!(f, "data length and declared length do not match"),
            &InvalidClientKeyExchange => {
                write!(f, "ClientKeyExchange can not be PSK and ECDHE at the same time")
            }
            &HandshakeMessageUnset => write!(f, "handshake message unset, unable to marshal"),
            &UnableToMarshalFragmented => write!(f, "unable to marshal fragmented handshake"),
            &NotImplemented => write!(f, "feature has not been implemented yet"),
            &InvalidContentType(t) => write!(f, "invalid content type: {}", t),
            &InvalidCipherSpec => write!(f, "cipher spec invalid"),
            &InvalidAlert => write!(f, "alert is malformed"),
            &InvalidHashAlgorithm(h) => write!(f, "invalid hash algorithm: {}", h),
            &InvalidSignatureAlgorithm(s) => write!(f, "invalid signature algorithm: {}", s),
            &InvalidEllipticCurveType(c) => write!(f, "invalid or unknown elliptic curve type: {}", c),
            &CookieTooLong => write!(f, "cookie must not be longer then 255 bytes"),
            &SequenceNumberOverflow => write!(f, "sequence number overflow"),
        }
    }
}
