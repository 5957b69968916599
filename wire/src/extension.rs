use byteorder::{BigEndian, ByteOrder};

use algorithm::{HashAlgorithm, SignatureAlgorithm, SignatureHashAlgorithm};
use curve::{NamedCurve, PointFormat};
use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SrtpProtectionProfile(pub u16);

impl SrtpProtectionProfile {
    pub const AES128_CM_HMAC_SHA1_80: SrtpProtectionProfile = SrtpProtectionProfile(0x0001);
    pub const AEAD_AES_128_GCM: SrtpProtectionProfile = SrtpProtectionProfile(0x0007);
}

const EXTENSION_SUPPORTED_ELLIPTIC_CURVES: u16 = 10;
const EXTENSION_SUPPORTED_POINT_FORMATS: u16 = 11;
const EXTENSION_SUPPORTED_SIGNATURE_ALGORITHMS: u16 = 13;
const EXTENSION_USE_SRTP: u16 = 14;
const EXTENSION_USE_EXTENDED_MASTER_SECRET: u16 = 23;
const EXTENSION_RENEGOTIATION_INFO: u16 = 0xff01;

/// A TLS extension carried in ClientHello and ServerHello messages. Only
/// the extensions the handshake negotiates are decoded; unknown extensions
/// are skipped.
/// https://tools.ietf.org/html/rfc4366
#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    SupportedEllipticCurves { elliptic_curves: Vec<NamedCurve> },
    SupportedPointFormats { point_formats: Vec<PointFormat> },
    SupportedSignatureAlgorithms { signature_hash_algorithms: Vec<SignatureHashAlgorithm> },
    UseSrtp { protection_profiles: Vec<SrtpProtectionProfile> },
    UseExtendedMasterSecret,
    RenegotiationInfo,
}

impl Extension {
    fn type_value(&self) -> u16 {
        match *self {
            Extension::SupportedEllipticCurves { .. } => EXTENSION_SUPPORTED_ELLIPTIC_CURVES,
            Extension::SupportedPointFormats { .. } => EXTENSION_SUPPORTED_POINT_FORMATS,
            Extension::SupportedSignatureAlgorithms { .. } => {
                EXTENSION_SUPPORTED_SIGNATURE_ALGORITHMS
            }
            Extension::UseSrtp { .. } => EXTENSION_USE_SRTP,
            Extension::UseExtendedMasterSecret => EXTENSION_USE_EXTENDED_MASTER_SECRET,
            Extension::RenegotiationInfo => EXTENSION_RENEGOTIATION_INFO,
        }
    }

    fn marshal_body(&self) -> Vec<u8> {
        match self {
            &Extension::SupportedEllipticCurves { ref elliptic_curves } => {
                let mut out = vec![0u8; 2];
                BigEndian::write_u16(&mut out, (elliptic_curves.len() * 2) as u16);
                for curve in elliptic_curves {
                    let mut v = [0u8; 2];
                    BigEndian::write_u16(&mut v, curve.0);
                    out.extend_from_slice(&v);
                }
                out
            }
            &Extension::SupportedPointFormats { ref point_formats } => {
                let mut out = vec![point_formats.len() as u8];
                for format in point_formats {
                    out.push(format.0);
                }
                out
            }
            &Extension::SupportedSignatureAlgorithms { ref signature_hash_algorithms } => {
                let mut out = vec![0u8; 2];
                BigEndian::write_u16(&mut out, (signature_hash_algorithms.len() * 2) as u16);
                for algorithm in signature_hash_algorithms {
                    out.push(algorithm.hash.as_u8());
                    out.push(algorithm.signature.as_u8());
                }
                out
            }
            &Extension::UseSrtp { ref protection_profiles } => {
                let mut out = vec![0u8; 2];
                BigEndian::write_u16(&mut out, (protection_profiles.len() * 2) as u16);
                for profile in protection_profiles {
                    let mut v = [0u8; 2];
                    BigEndian::write_u16(&mut v, profile.0);
                    out.extend_from_slice(&v);
                }
                // empty MKI
                out.push(0);
                out
            }
            &Extension::UseExtendedMasterSecret => vec![],
            &Extension::RenegotiationInfo => vec![0],
        }
    }

    fn unmarshal_body(type_value: u16, body: &[u8]) -> Result<Option<Self>, Error> {
        match type_value {
            EXTENSION_SUPPORTED_ELLIPTIC_CURVES => {
                if body.len() < 2 {
                    return Err(Error::BufferTooSmall);
                }
                let list_len = BigEndian::read_u16(&body[..2]) as usize;
                if body.len() < 2 + list_len {
                    return Err(Error::BufferTooSmall);
                }
                let mut elliptic_curves = Vec::with_capacity(list_len / 2);
                for chunk in body[2..2 + list_len].chunks(2) {
                    if chunk.len() == 2 {
                        elliptic_curves.push(NamedCurve(BigEndian::read_u16(chunk)));
                    }
                }
                Ok(Some(Extension::SupportedEllipticCurves { elliptic_curves }))
            }
            EXTENSION_SUPPORTED_POINT_FORMATS => {
                if body.is_empty() {
                    return Err(Error::BufferTooSmall);
                }
                let list_len = body[0] as usize;
                if body.len() < 1 + list_len {
                    return Err(Error::BufferTooSmall);
                }
                let point_formats = body[1..1 + list_len].iter().map(|&v| PointFormat(v)).collect();
                Ok(Some(Extension::SupportedPointFormats { point_formats }))
            }
            EXTENSION_SUPPORTED_SIGNATURE_ALGORITHMS => {
                if body.len() < 2 {
                    return Err(Error::BufferTooSmall);
                }
                let list_len = BigEndian::read_u16(&body[..2]) as usize;
                if body.len() < 2 + list_len {
                    return Err(Error::BufferTooSmall);
                }
                let mut signature_hash_algorithms = Vec::with_capacity(list_len / 2);
                for chunk in body[2..2 + list_len].chunks(2) {
                    if chunk.len() == 2 {
                        // Skip algorithm pairs we can not use anyway.
                        let hash = match HashAlgorithm::from_u8(chunk[0]) {
                            Ok(hash) => hash,
                            Err(_) => continue,
                        };
                        let signature = match SignatureAlgorithm::from_u8(chunk[1]) {
                            Ok(signature) => signature,
                            Err(_) => continue,
                        };
                        signature_hash_algorithms.push(SignatureHashAlgorithm { hash, signature });
                    }
                }
                Ok(Some(Extension::SupportedSignatureAlgorithms { signature_hash_algorithms }))
            }
            EXTENSION_USE_SRTP => {
                if body.len() < 2 {
                    return Err(Error::BufferTooSmall);
                }
                let list_len = BigEndian::read_u16(&body[..2]) as usize;
                if body.len() < 2 + list_len {
                    return Err(Error::BufferTooSmall);
                }
                let mut protection_profiles = Vec::with_capacity(list_len / 2);
                for chunk in body[2..2 + list_len].chunks(2) {
                    if chunk.len() == 2 {
                        protection_profiles.push(SrtpProtectionProfile(BigEndian::read_u16(chunk)));
                    }
                }
                Ok(Some(Extension::UseSrtp { protection_profiles }))
            }
            EXTENSION_USE_EXTENDED_MASTER_SECRET => Ok(Some(Extension::UseExtendedMasterSecret)),
            EXTENSION_RENEGOTIATION_INFO => Ok(Some(Extension::RenegotiationInfo)),
            _ => Ok(None),
        }
    }
}

// marshal_extensions writes the two byte total length followed by each
// extension as {type:u16, length:u16, body}.
pub fn marshal_extensions(extensions: &[Extension]) -> Vec<u8> {
    let mut body = Vec::new();
    for extension in extensions {
        let extension_body = extension.marshal_body();
        let mut head = [0u8; 4];
        BigEndian::write_u16(&mut head[..2], extension.type_value());
        BigEndian::write_u16(&mut head[2..], extension_body.len() as u16);
        body.extend_from_slice(&head);
        body.extend_from_slice(&extension_body);
    }

    let mut out = vec![0u8; 2];
    BigEndian::write_u16(&mut out, body.len() as u16);
    out.extend_from_slice(&body);
    out
}

// unmarshal_extensions reads a two byte prefixed extension list, skipping
// extension types it does not know. Returns the extensions and the number
// of bytes consumed.
pub fn unmarshal_extensions(data: &[u8]) -> Result<(Vec<Extension>, usize), Error> {
    // A hello without extensions is valid.
    if data.is_empty() {
        return Ok((Vec::new(), 0));
    }
    if data.len() < 2 {
        return Err(Error::BufferTooSmall);
    }

    let total_len = BigEndian::read_u16(&data[..2]) as usize;
    if data.len() < 2 + total_len {
        return Err(Error::BufferTooSmall);
    }

    let mut extensions = Vec::new();
    let mut offset = 2;
    let end = 2 + total_len;
    while offset < end {
        if end - offset < 4 {
            return Err(Error::BufferTooSmall);
        }
        let type_value = BigEndian::read_u16(&data[offset..offset + 2]);
        let body_len = BigEndian::read_u16(&data[offset + 2..offset + 4]) as usize;
        if end - offset < 4 + body_len {
            return Err(Error::BufferTooSmall);
        }

        let body = &data[offset + 4..offset + 4 + body_len];
        if let Some(extension) = Extension::unmarshal_body(type_value, body)? {
            extensions.push(extension);
        }
        offset += 4 + body_len;
    }

    Ok((extensions, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_round_trip() {
        let extensions = vec![
            Extension::SupportedSignatureAlgorithms {
                signature_hash_algorithms: vec![SignatureHashAlgorithm {
                    hash: HashAlgorithm::Sha256,
                    signature: SignatureAlgorithm::Ecdsa,
                }],
            },
            Extension::RenegotiationInfo,
            Extension::SupportedEllipticCurves {
                elliptic_curves: vec![NamedCurve::P256, NamedCurve::X25519],
            },
            Extension::SupportedPointFormats {
                point_formats: vec![PointFormat::UNCOMPRESSED],
            },
            Extension::UseSrtp {
                protection_profiles: vec![SrtpProtectionProfile::AEAD_AES_128_GCM],
            },
            Extension::UseExtendedMasterSecret,
        ];

        let raw = marshal_extensions(&extensions);
        let (parsed, consumed) = unmarshal_extensions(&raw).unwrap();
        assert_eq!(consumed, raw.len());
        assert_eq!(parsed, extensions);
    }

    #[test]
    fn unknown_extension_is_skipped() {
        // type 0xffee, 2 byte body
        let raw = hex!("0006ffee0002abcd").to_vec();
        let (parsed, consumed) = unmarshal_extensions(&raw).unwrap();
        assert_eq!(consumed, raw.len());
        assert!(parsed.is_empty());
    }

    #[test]
    fn use_srtp_wire_layout() {
        let raw = marshal_extensions(&[Extension::UseSrtp {
            protection_profiles: vec![SrtpProtectionProfile::AES128_CM_HMAC_SHA1_80],
        }]);
        assert_eq!(raw, hex!("0009000e00050002000100").to_vec());
    }
}
