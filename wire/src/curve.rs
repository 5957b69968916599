use error::Error;

/// NamedCurve identifies an elliptic curve for the key exchange.
/// https://tools.ietf.org/html/rfc8422#section-5.1.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamedCurve(pub u16);

impl NamedCurve {
    pub const P256: NamedCurve = NamedCurve(0x0017);
    pub const P384: NamedCurve = NamedCurve(0x0018);
    pub const X25519: NamedCurve = NamedCurve(0x001d);
}

pub const DEFAULT_NAMED_CURVE: NamedCurve = NamedCurve::X25519;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EllipticCurveType {
    NamedCurve,
}

impl EllipticCurveType {
    pub fn from_u8(v: u8) -> Result<Self, Error> {
        match v {
            0x03 => Ok(EllipticCurveType::NamedCurve),
            _ => Err(Error::InvalidEllipticCurveType(v)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        0x03
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointFormat(pub u8);

impl PointFormat {
    pub const UNCOMPRESSED: PointFormat = PointFormat(0);
}
